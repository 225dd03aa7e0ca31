use nova_types::{is_subtype, PrimitiveType, SymbolTable, Type, TypeEnv, WildcardBound};

#[test]
fn minimal_jdk_interfaces_are_subtypes_of_object() {
    let env = SymbolTable::with_minimal_jdk();
    let wk = *env.well_known().expect("minimal JDK registers well-known types");

    let object = Type::class(wk.object, vec![]);

    let list = env
        .lookup_class("java.util.List")
        .expect("List must exist in minimal JDK");
    let list_string = Type::class(list, vec![Type::class(wk.string, vec![])]);
    assert!(is_subtype(&env, &list_string, &object));

    let cloneable = Type::class(wk.cloneable, vec![]);
    assert!(is_subtype(&env, &cloneable, &object));
}

#[test]
fn arrays_are_object_cloneable_and_serializable() {
    let env = SymbolTable::with_minimal_jdk();
    let wk = *env.well_known().unwrap();

    let int_array = Type::array(Type::primitive(PrimitiveType::Int));
    for target in [wk.object, wk.cloneable, wk.serializable] {
        assert!(is_subtype(&env, &int_array, &Type::class(target, vec![])));
    }
    assert!(!is_subtype(
        &env,
        &int_array,
        &Type::class(wk.string, vec![])
    ));
}

#[test]
fn intersection_subtyping_is_order_independent() {
    let env = SymbolTable::with_minimal_jdk();
    let wk = *env.well_known().unwrap();

    let cloneable = Type::class(wk.cloneable, vec![]);
    let serializable = Type::class(wk.serializable, vec![]);

    let ab = Type::Intersection(vec![cloneable.clone(), serializable.clone()]);
    let ba = Type::Intersection(vec![serializable, cloneable]);

    assert!(is_subtype(&env, &ab, &ba));
    assert!(is_subtype(&env, &ba, &ab));
}

#[test]
fn generic_subtyping_respects_wildcards() {
    let env = SymbolTable::with_minimal_jdk();
    let integer = Type::class(env.lookup_class("java.lang.Integer").unwrap(), vec![]);
    let number = Type::class(env.lookup_class("java.lang.Number").unwrap(), vec![]);
    let list = env.lookup_class("java.util.List").unwrap();
    let array_list = env.lookup_class("java.util.ArrayList").unwrap();

    let array_list_integer = Type::class(array_list, vec![integer.clone()]);
    let list_number = Type::class(list, vec![number.clone()]);
    let list_extends_number = Type::class(
        list,
        vec![Type::Wildcard(
            WildcardBound::Extends(Box::new(number)),
            Vec::new(),
        )],
    );

    assert!(!is_subtype(&env, &array_list_integer, &list_number));
    assert!(is_subtype(&env, &array_list_integer, &list_extends_number));
}

#[test]
fn primitive_widening_never_targets_char() {
    let env = SymbolTable::with_minimal_jdk();
    let byte = Type::primitive(PrimitiveType::Byte);
    let char_ty = Type::primitive(PrimitiveType::Char);
    let int = Type::primitive(PrimitiveType::Int);

    assert!(is_subtype(&env, &byte, &int));
    assert!(is_subtype(&env, &char_ty, &int));
    assert!(!is_subtype(&env, &byte, &char_ty));
    assert!(!is_subtype(&env, &int, &byte));
}
