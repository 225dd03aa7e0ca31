use nova_types::{
    capture_lower_bound, capture_upper_bound, format_type, ClassType, SymbolTable, TyContext, Type,
    TypeEnv, TypeFormat, WildcardBound,
};
use pretty_assertions::assert_eq;

fn captured_arg(ty: &Type) -> nova_types::CaptureType {
    let Type::Class(ClassType { args, .. }) = ty else {
        panic!("expected class type, got {ty:?}");
    };
    match &args[0] {
        Type::Capture(cap) => (**cap).clone(),
        other => panic!("expected capture, got {other:?}"),
    }
}

#[test]
fn extends_wildcard_capture_is_bounded_by_the_wildcard() {
    let env = SymbolTable::with_minimal_jdk();
    let number = Type::class(env.lookup_class("java.lang.Number").unwrap(), vec![]);
    let list = env.lookup_class("java.util.List").unwrap();
    let ty = Type::class(
        list,
        vec![Type::Wildcard(
            WildcardBound::Extends(Box::new(number.clone())),
            Vec::new(),
        )],
    );

    let mut ctx = TyContext::new(&env);
    let cap = captured_arg(&ctx.capture_conversion(&ty, 42));
    assert_eq!(capture_upper_bound(&env, &cap), number);
    assert_eq!(capture_lower_bound(&cap), None);
    assert_eq!(cap.site, 42);
}

#[test]
fn super_wildcard_capture_has_lower_bound() {
    let env = SymbolTable::with_minimal_jdk();
    let wk = *env.well_known().unwrap();
    let string = Type::class(wk.string, vec![]);
    let list = env.lookup_class("java.util.List").unwrap();
    let ty = Type::class(
        list,
        vec![Type::Wildcard(
            WildcardBound::Super(Box::new(string.clone())),
            Vec::new(),
        )],
    );

    let mut ctx = TyContext::new(&env);
    let cap = captured_arg(&ctx.capture_conversion(&ty, 7));
    assert_eq!(capture_lower_bound(&cap), Some(string));
    assert_eq!(capture_upper_bound(&env, &cap), Type::class(wk.object, vec![]));
}

#[test]
fn captures_render_with_their_wildcard() {
    let env = SymbolTable::with_minimal_jdk();
    let list = env.lookup_class("java.util.List").unwrap();
    let ty = Type::class(
        list,
        vec![Type::Wildcard(WildcardBound::Unbounded, Vec::new())],
    );
    let mut ctx = TyContext::new(&env);
    let captured = ctx.capture_conversion(&ty, 0);
    let rendered = format_type(&env, &captured, TypeFormat::SIMPLE);
    assert!(
        rendered.starts_with("List<capture#") && rendered.ends_with("-of ?>"),
        "{rendered}"
    );
}
