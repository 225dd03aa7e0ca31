use nova_dom::{Binding, BindingKind, Node, NodeKind};
use nova_types::ConstValue;
use pretty_assertions::assert_eq;

use super::{convert, declaration_of, field_type, name, nodes_of};

#[test]
fn unannotated_occurrences_share_one_binding() {
    let source = "@interface A {}\n\
        class X { String a; String b; java.lang.@A String c; java.lang.@A String d; }";
    let dom = convert(source);
    let a = dom.resolve_type_binding(field_type(&dom, "a")).unwrap();
    let b = dom.resolve_type_binding(field_type(&dom, "b")).unwrap();
    assert!(a.is_equal_to(&b));
    assert_eq!(a, b);
    assert_eq!(a.qualified_name(), "java.lang.String");

    let c = dom.resolve_type_binding(field_type(&dom, "c")).unwrap();
    let d = dom.resolve_type_binding(field_type(&dom, "d")).unwrap();
    assert!(c.is_equal_to(&d));
    assert!(c.is_equal_to(&a));
    assert_ne!(c, d);
    assert_eq!(c.type_annotations().len(), 1);

    // Asking the same node again hands out the same instance.
    let again = dom.resolve_type_binding(field_type(&dom, "c")).unwrap();
    assert_eq!(c, again);
}

#[test]
fn bindings_of_the_same_symbol_compare_equal() {
    let source = "class X { int count; void m() { count = count + 1; } }";
    let dom = convert(source);
    let declaration = dom.resolve_binding(declaration_of(&dom, "count")).unwrap();
    let uses: Vec<Binding<'_>> = nodes_of(&dom, NodeKind::SimpleName)
        .into_iter()
        .filter(|node| dom.to_source_string(*node) == "count")
        .filter_map(|node| dom.resolve_binding(node))
        .collect();
    assert_eq!(uses.len(), 3);
    for binding in &uses {
        assert_eq!(binding.kind(), BindingKind::Variable);
        assert!(binding.is_equal_to(&declaration));
        assert_eq!(binding, &declaration);
    }
}

#[test]
fn declaring_nodes_are_found_for_local_symbols_only() {
    let source = "package p;\n\
        class X<T> { int count; T item; void m(int p) { count = p; String s = \"\"; } }";
    let dom = convert(source);

    let count_use = nodes_of(&dom, NodeKind::Assignment)[0];
    let Node::Assignment(assignment) = dom.node(count_use) else {
        unreachable!()
    };
    let count = dom.resolve_binding(assignment.lhs).unwrap();
    assert_eq!(dom.find_declaring_node(&count), Some(declaration_of(&dom, "count")));
    assert_eq!(
        dom.find_declaring_node_by_key(&count.key()),
        Some(declaration_of(&dom, "count"))
    );

    let parameter = dom.resolve_binding(assignment.rhs).unwrap();
    assert_eq!(dom.find_declaring_node(&parameter), Some(declaration_of(&dom, "p")));

    let class = dom.resolve_binding(nodes_of(&dom, NodeKind::TypeDeclaration)[0]).unwrap();
    assert_eq!(
        dom.find_declaring_node(&class),
        Some(nodes_of(&dom, NodeKind::TypeDeclaration)[0])
    );

    let type_var = dom.resolve_type_binding(field_type(&dom, "item")).unwrap();
    assert!(type_var.is_type_variable());
    assert_eq!(
        dom.find_declaring_node(&type_var.into()),
        Some(nodes_of(&dom, NodeKind::TypeParameter)[0])
    );

    let string = dom
        .resolve_variable_binding(declaration_of(&dom, "s"))
        .and_then(|s| s.ty())
        .unwrap();
    assert_eq!(dom.find_declaring_node(&string.into()), None);

    let package = dom
        .resolve_binding(nodes_of(&dom, NodeKind::PackageDeclaration)[0])
        .unwrap();
    assert_eq!(package.kind(), BindingKind::Package);
    assert_eq!(package.name(), "p");
}

#[test]
fn bindings_of_another_tree_have_no_declaring_node() {
    let source = "class X { int count; }";
    let first = convert(source);
    let second = convert(source);
    let binding = first.resolve_binding(declaration_of(&first, "count")).unwrap();
    assert_eq!(second.find_declaring_node(&binding), None);
    assert!(second
        .find_declaring_node_by_key(&binding.key())
        .is_some());
}

#[test]
fn deprecation_belongs_to_the_referenced_type() {
    let source = "class Outer { @Deprecated static class Old {} static class Fine {} }\n\
        @Deprecated class Legacy { static class Nested {} }\n\
        class Use { Outer.Old a; Outer.Fine b; Legacy.Nested c; Legacy d; }";
    let dom = convert(source);
    let deprecated = |field: &str| {
        dom.resolve_type_binding(field_type(&dom, field))
            .unwrap()
            .is_deprecated()
    };
    assert!(deprecated("a"));
    assert!(!deprecated("b"));
    assert!(!deprecated("c"));
    assert!(deprecated("d"));

    let old = dom.resolve_type_binding(field_type(&dom, "a")).unwrap();
    assert!(!old.declaring_class().unwrap().is_deprecated());
    assert!(old.is_member());
}

#[test]
fn captures_are_distinct_per_use_site() {
    let source = "import java.util.List;\n\
        class X { void m(List<? extends Number> l) { Object a = l.get(0); Object b = l.get(0); } }";
    let dom = convert(source);
    let calls = nodes_of(&dom, NodeKind::MethodInvocation);
    assert_eq!(calls.len(), 2);
    let first = dom.resolve_type_binding(calls[0]).unwrap();
    let second = dom.resolve_type_binding(calls[1]).unwrap();
    assert!(first.is_capture());
    assert!(second.is_capture());
    assert!(!first.is_equal_to(&second));

    let wildcard = first.wildcard().unwrap();
    assert!(wildcard.is_wildcard_type());
    assert!(wildcard.is_upper_bound());
    assert_eq!(wildcard.bound().unwrap().qualified_name(), "java.lang.Number");
    assert_eq!(first.capture_lower_bound(), None);

    let get = dom.resolve_method_binding(calls[0]).unwrap();
    assert_eq!(get.name(), "get");
    assert_eq!(get.declaring_class().unwrap().type_arguments().len(), 1);
}

#[test]
fn method_and_constructor_bindings() {
    let source = "import java.util.ArrayList;\n\
        class X { X(int size) { this(); } X() {} java.util.List<String> make() { return new ArrayList<>(16); } }";
    let dom = convert(source);
    let creation = nodes_of(&dom, NodeKind::ClassInstanceCreation)[0];
    let ctor = dom.resolve_constructor_binding(creation).unwrap();
    assert!(ctor.is_constructor());
    assert_eq!(ctor.parameter_types().len(), 1);
    assert!(ctor.parameter_types()[0].is_primitive());
    assert_eq!(dom.resolve_method_binding(creation), None);

    let created = dom.resolve_type_binding(creation).unwrap();
    assert!(created.is_parameterized_type());
    assert_eq!(created.type_arguments()[0].qualified_name(), "java.lang.String");

    let this_call = nodes_of(&dom, NodeKind::ConstructorInvocation)[0];
    let target = dom.resolve_constructor_binding(this_call).unwrap();
    assert!(target.parameter_types().is_empty());
    let declared = dom.find_declaring_node(&target.into()).unwrap();
    assert_eq!(dom.kind(declared), NodeKind::MethodDeclaration);

    let make = dom.resolve_binding(name(&dom, "make")).unwrap();
    let make = make.as_method().unwrap();
    assert_eq!(
        make.return_type().unwrap().qualified_name(),
        "java.util.List<java.lang.String>"
    );
}

#[test]
fn constants_and_annotation_values() {
    let source = "class X { static final int LIMIT = 4 * 4; @SuppressWarnings(\"unchecked\") void m() {} }";
    let dom = convert(source);
    let limit = dom.resolve_variable_binding(declaration_of(&dom, "LIMIT")).unwrap();
    assert_eq!(limit.constant_value(), Some(&ConstValue::Int(16)));
    assert!(limit.is_field());

    let annotation = nodes_of(&dom, NodeKind::SingleMemberAnnotation)[0];
    let binding = dom.resolve_annotation_binding(annotation).unwrap();
    assert_eq!(binding.name(), "SuppressWarnings");
    let pairs = binding.all_member_value_pairs();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].name(), "value");
    assert_eq!(
        pairs[0].value(),
        Some(&ConstValue::Array(vec![ConstValue::String("unchecked".into())]))
    );
    assert_eq!(pairs[0].method_binding().unwrap().name(), "value");
}

#[test]
fn resolution_can_be_switched_off() {
    let options = nova_dom::ConvertOptions {
        resolve_bindings: false,
        ..Default::default()
    };
    let dom = super::convert_with("class X { int count; }", options);
    assert_eq!(dom.resolve_binding(declaration_of(&dom, "count")), None);
    assert_eq!(dom.resolve_type_binding(field_type(&dom, "count")), None);
    assert_eq!(dom.find_declaring_node_by_key("LX;.count"), None);
}
