use nova_hir::{ExprId, ExprKind, ResolvedUnit, TypeRefKind};
use nova_types::{ClassId, ClassNesting, ConstValue, MethodId, PrimitiveType, Type, VarId, VarKind};
use pretty_assertions::assert_eq;

use super::{compile, parse};

fn exprs_where(resolved: &ResolvedUnit, pred: impl Fn(&ExprKind) -> bool) -> Vec<ExprId> {
    resolved
        .unit
        .exprs
        .iter()
        .filter(|(_, expr)| pred(&expr.kind))
        .map(|(id, _)| id)
        .collect()
}

fn calls_named(resolved: &ResolvedUnit, wanted: &str) -> Vec<ExprId> {
    exprs_where(resolved, |kind| {
        matches!(kind, ExprKind::MethodCall { name, .. } if name.as_str() == wanted)
    })
}

fn called_method(resolved: &ResolvedUnit, call: ExprId) -> MethodId {
    match &resolved.unit.exprs[call].kind {
        ExprKind::MethodCall { method, .. } => method.expect("call is resolved"),
        other => panic!("not a call: {other:?}"),
    }
}

fn var_named(resolved: &ResolvedUnit, name: &str) -> VarId {
    resolved
        .symbols
        .vars()
        .find(|(_, def)| def.name == name)
        .map(|(id, _)| id)
        .unwrap_or_else(|| panic!("no variable `{name}`"))
}

fn class(resolved: &ResolvedUnit, name: &str) -> ClassId {
    resolved
        .symbols
        .class_id(name)
        .unwrap_or_else(|| panic!("no class `{name}`"))
}

fn string(resolved: &ResolvedUnit) -> Type {
    Type::class(class(resolved, "java.lang.String"), Vec::new())
}

#[test]
fn lambda_gets_target_and_parameter_types() {
    let resolved = compile(
        "import java.util.function.Function;\n\
         class A { Function<String, Integer> f = s -> s.length(); }",
    );
    let lambda = exprs_where(&resolved, |kind| matches!(kind, ExprKind::Lambda { .. }))[0];
    let function = class(&resolved, "java.util.function.Function");
    let integer = Type::class(class(&resolved, "java.lang.Integer"), Vec::new());
    assert_eq!(
        resolved.unit.exprs[lambda].ty,
        Some(Type::class(function, vec![string(&resolved), integer]))
    );

    let param = resolved.symbols.var_def(var_named(&resolved, "s")).unwrap();
    assert_eq!(param.kind, VarKind::LambdaParameter);
    assert_eq!(param.ty, string(&resolved));
    assert_eq!(
        param.lambda_site,
        Some(resolved.unit.exprs[lambda].span.start as u32)
    );

    let length = called_method(&resolved, calls_named(&resolved, "length")[0]);
    let def = resolved.symbols.method_def(length).unwrap();
    assert_eq!(def.owner, class(&resolved, "java.lang.String"));
}

#[test]
fn overloads_prefer_strict_invocation() {
    let resolved = compile(
        "class B { void m() { System.out.println(\"hi\"); System.out.println(1); } }",
    );
    let calls = calls_named(&resolved, "println");
    let params = |call| {
        resolved
            .symbols
            .method_def(called_method(&resolved, call))
            .unwrap()
            .params
            .clone()
    };
    assert_eq!(params(calls[0]), vec![string(&resolved)]);
    assert_eq!(params(calls[1]), vec![Type::primitive(PrimitiveType::Int)]);
}

#[test]
fn declarator_and_varargs_dimensions() {
    let resolved = compile("class C { int[] a[]; void m(String... args) {} }");
    let field = resolved.symbols.var_def(var_named(&resolved, "a")).unwrap();
    assert_eq!(
        field.ty,
        Type::array(Type::array(Type::primitive(PrimitiveType::Int)))
    );
    let args = resolved.symbols.var_def(var_named(&resolved, "args")).unwrap();
    assert_eq!(args.ty, Type::array(string(&resolved)));
    let method = args.declaring_method.unwrap();
    assert!(resolved.symbols.method_def(method).unwrap().is_varargs);
}

#[test]
fn deprecation_comes_from_the_declaration_itself() {
    let resolved = compile("@Deprecated class D { @Deprecated void old() {} void fresh() {} }");
    let d = class(&resolved, "D");
    assert!(resolved.symbols.class_def(d).unwrap().deprecated);
    let deprecated: Vec<(String, bool)> = resolved
        .symbols
        .class_def(d)
        .unwrap()
        .methods
        .iter()
        .map(|m| resolved.symbols.method_def(*m).unwrap())
        .filter(|def| !def.is_constructor)
        .map(|def| (def.name.clone(), def.deprecated))
        .collect();
    assert_eq!(
        deprecated,
        vec![("old".to_string(), true), ("fresh".to_string(), false)]
    );
}

#[test]
fn each_use_site_captures_separately() {
    let resolved = compile(
        "import java.util.List;\n\
         class E { void m(List<?> l) { Object a = l.get(0); Object b = l.get(0); } }",
    );
    let gets = calls_named(&resolved, "get");
    let ty = |expr: ExprId| resolved.unit.exprs[expr].ty.clone().unwrap();
    let (first, second) = (ty(gets[0]), ty(gets[1]));
    assert!(matches!(first, Type::Capture(_)), "{first:?}");
    assert!(matches!(second, Type::Capture(_)), "{second:?}");
    assert_ne!(first, second);
}

#[test]
fn locals_record_their_lambda() {
    let resolved = compile(
        "import java.util.function.Supplier;\n\
         class F { void m() { int outer = 1; Supplier<Integer> s = () -> { int inner = 2; return inner + outer; }; } }",
    );
    let lambda = exprs_where(&resolved, |kind| matches!(kind, ExprKind::Lambda { .. }))[0];
    let site = resolved.unit.exprs[lambda].span.start as u32;
    let outer = resolved.symbols.var_def(var_named(&resolved, "outer")).unwrap();
    let inner = resolved.symbols.var_def(var_named(&resolved, "inner")).unwrap();
    assert_eq!(outer.lambda_site, None);
    assert_eq!(inner.lambda_site, Some(site));
    assert_eq!(outer.declaring_method, inner.declaring_method);
    assert!(outer.declaring_method.is_some());
}

#[test]
fn local_and_anonymous_classes_are_numbered_like_javac() {
    let resolved = compile(
        "package p;\n\
         class G { void m() { class Local {} Runnable r = new Runnable() { public void run() {} }; } }",
    );
    let local = class(&resolved, "p.G$1Local");
    let anonymous = class(&resolved, "p.G$1");
    assert_eq!(
        resolved.symbols.class_def(local).unwrap().nesting,
        ClassNesting::Local
    );
    let anonymous = resolved.symbols.class_def(anonymous).unwrap();
    assert_eq!(anonymous.nesting, ClassNesting::Anonymous);
    assert_eq!(
        anonymous.interfaces,
        vec![Type::class(class(&resolved, "java.lang.Runnable"), Vec::new())]
    );
}

#[test]
fn switch_labels_resolve_to_enum_constants() {
    let resolved = compile(
        "enum Color { RED, GREEN }\n\
         class H { int m(Color c) { switch (c) { case RED: return 1; default: return 0; } } }",
    );
    let red = resolved
        .symbols
        .vars()
        .find(|(_, def)| def.name == "RED" && def.kind == VarKind::EnumConstant)
        .map(|(id, _)| id)
        .unwrap();
    let labels = exprs_where(&resolved, |kind| match kind {
        ExprKind::Name(name) => name.to_dotted() == "RED",
        _ => false,
    });
    assert_eq!(labels.len(), 1);
    let ExprKind::Name(name) = &resolved.unit.exprs[labels[0]].kind else {
        unreachable!()
    };
    assert_eq!(*name.resolution(), nova_hir::Resolution::Var(red));
    let color = class(&resolved, "Color");
    let names: Vec<String> = resolved
        .symbols
        .class_def(color)
        .unwrap()
        .methods
        .iter()
        .map(|m| resolved.symbols.method_def(*m).unwrap().name.clone())
        .collect();
    assert!(names.contains(&"values".to_string()));
    assert!(names.contains(&"valueOf".to_string()));
}

#[test]
fn constant_fields_fold() {
    let resolved = compile(
        "class K { static final int X = 1 + 2; static final String S = \"a\" + X; static final long L = 4; int notConstant = 5; }",
    );
    let constant = |name| {
        resolved
            .symbols
            .var_def(var_named(&resolved, name))
            .unwrap()
            .constant
            .clone()
    };
    assert_eq!(constant("X"), Some(ConstValue::Int(3)));
    assert_eq!(constant("S"), Some(ConstValue::String("a3".into())));
    assert_eq!(constant("L"), Some(ConstValue::Long(4)));
    assert_eq!(constant("notConstant"), None);
}

#[test]
fn annotation_array_values_follow_the_element_type() {
    let resolved = compile("@SuppressWarnings({\"a\", \"b\"}) class I {}");
    let annotations = &resolved
        .symbols
        .class_def(class(&resolved, "I"))
        .unwrap()
        .annotations;
    assert_eq!(annotations.len(), 1);
    assert_eq!(
        annotations[0].values,
        vec![(
            "value".to_string(),
            ConstValue::Array(vec![
                ConstValue::String("a".into()),
                ConstValue::String("b".into())
            ])
        )]
    );
}

#[test]
fn diamond_takes_arguments_from_the_target() {
    let resolved = compile(
        "class J { java.util.List<String> l = new java.util.ArrayList<>(); }",
    );
    let new = exprs_where(&resolved, |kind| matches!(kind, ExprKind::New { .. }))[0];
    assert_eq!(
        resolved.unit.exprs[new].ty,
        Some(Type::class(
            class(&resolved, "java.util.ArrayList"),
            vec![string(&resolved)]
        ))
    );
}

#[test]
fn var_takes_the_initializer_type() {
    let resolved = compile("class L { void m() { var x = \"s\"; } }");
    let x = resolved.symbols.var_def(var_named(&resolved, "x")).unwrap();
    assert_eq!(x.ty, string(&resolved));
    let var_ref = resolved
        .unit
        .type_refs
        .iter()
        .find(|(_, ty)| ty.kind == TypeRefKind::Var)
        .map(|(_, ty)| ty.ty.clone());
    assert_eq!(var_ref, Some(Some(string(&resolved))));
}

#[test]
fn broken_source_still_attributes() {
    let (_, errors) = parse("class { void m( }");
    assert!(!errors.is_empty());
    let resolved = compile("class M { void m() { int x = ; } }");
    assert!(resolved.unit.recovered);
}
