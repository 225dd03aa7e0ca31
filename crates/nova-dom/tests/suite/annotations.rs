use nova_dom::{Dom, Node, NodeId, NodeKind, TypeBinding};
use pretty_assertions::assert_eq;

use super::{convert, field_type, nodes_of};

const DECLS: &str = "@interface A {} @interface B {} @interface C {} @interface D {}\n";

/// Simple names of the annotations in the subtree of `node`, in source order.
fn annotation_names(dom: &Dom, node: NodeId) -> Vec<String> {
    let mut annotations: Vec<NodeId> = dom
        .descendants(node)
        .into_iter()
        .filter(|node| dom.kind(*node).is_annotation())
        .collect();
    annotations.sort_by_key(|node| dom.start_position(*node));
    annotations
        .into_iter()
        .map(|node| match dom.node(node) {
            Node::MarkerAnnotation(annotation) => dom.to_source_string(annotation.type_name),
            other => panic!("unexpected annotation {other:?}"),
        })
        .collect()
}

fn type_annotation_names(ty: &TypeBinding<'_>) -> Vec<String> {
    ty.type_annotations().iter().map(|a| a.name()).collect()
}

#[test]
fn name_qualified_type_takes_the_segment_annotation() {
    let source = format!("{DECLS}class X {{ java.util.@A List<@B String> field; }}");
    let dom = convert(&source);
    let ty = field_type(&dom, "field");
    let Node::ParameterizedType(parameterized) = dom.node(ty) else {
        panic!("expected a parameterized type, got {:?}", dom.kind(ty));
    };
    let Node::NameQualifiedType(base) = dom.node(parameterized.ty) else {
        panic!("expected a name qualified type, got {:?}", dom.kind(parameterized.ty));
    };
    assert_eq!(dom.kind(base.qualifier), NodeKind::QualifiedName);
    assert_eq!(dom.to_source_string(base.qualifier), "java.util");
    assert_eq!(annotation_names(&dom, parameterized.ty), vec!["A"]);
    assert_eq!(annotation_names(&dom, ty), vec!["A", "B"]);
}

#[test]
fn qualified_type_after_a_parameterized_qualifier() {
    let source = format!("{DECLS}class Outer<T> {{ class Inner {{}} Outer<String>.@A Inner field; }}");
    let dom = convert(&source);
    let ty = field_type(&dom, "field");
    let Node::QualifiedType(qualified) = dom.node(ty) else {
        panic!("expected a qualified type, got {:?}", dom.kind(ty));
    };
    assert_eq!(dom.kind(qualified.qualifier), NodeKind::ParameterizedType);
    assert_eq!(qualified.annotations.len(), 1);
    assert_eq!(dom.to_source_string(qualified.name), "Inner");
}

#[test]
fn every_annotation_lands_on_exactly_one_node() {
    let source = format!(
        "{DECLS}class X {{ java.util.@A Map<@B String, java.util.@C List<@D Object>> @A [] @B [] field; }}"
    );
    let dom = convert(&source);
    let ty = field_type(&dom, "field");
    assert_eq!(
        annotation_names(&dom, ty),
        vec!["A", "B", "C", "D", "A", "B"]
    );
    let all = nodes_of(&dom, NodeKind::MarkerAnnotation);
    for annotation in &all {
        assert!(dom.parent(*annotation).is_some());
    }
    let mut starts: Vec<usize> = all.iter().map(|a| dom.start_position(*a)).collect();
    starts.sort_unstable();
    starts.dedup();
    assert_eq!(starts.len(), all.len());
}

#[test]
fn array_dimensions_own_their_annotations() {
    let source = format!("{DECLS}class X {{ String @A [] @B [] field; }}");
    let dom = convert(&source);
    let ty = field_type(&dom, "field");
    let Node::ArrayType(array) = dom.node(ty) else {
        panic!("expected an array type");
    };
    let per_dimension: Vec<Vec<String>> = array
        .dimensions
        .iter()
        .map(|dimension| annotation_names(&dom, *dimension))
        .collect();
    assert_eq!(per_dimension, vec![vec!["A"], vec!["B"]]);
    assert!(annotation_names(&dom, array.element_type).is_empty());
}

#[test]
fn varargs_annotations_are_kept_apart_from_dimensions() {
    let source = format!("{DECLS}class X {{ void m(String @A [] @B ... args) {{}} }}");
    let dom = convert(&source);
    let declaration = nodes_of(&dom, NodeKind::SingleVariableDeclaration)[0];
    let Node::SingleVariableDeclaration(param) = dom.node(declaration) else {
        unreachable!()
    };
    assert!(param.varargs);
    assert_eq!(param.varargs_annotations.len(), 1);
    assert_eq!(annotation_names(&dom, param.varargs_annotations[0]), vec!["B"]);
    assert_eq!(annotation_names(&dom, param.ty), vec!["A"]);

    let ty = dom
        .resolve_variable_binding(declaration)
        .and_then(|var| var.ty())
        .expect("parameter type resolves");
    assert_eq!(ty.dimensions(), 2);
    assert_eq!(type_annotation_names(&ty), vec!["B"]);
    let component = ty.component_type().unwrap();
    assert_eq!(type_annotation_names(&component), vec!["A"]);
}

#[test]
fn extra_dimensions_are_outermost_in_the_variable_type() {
    let source = format!("{DECLS}class X {{ int @A [] field @B [] @C []; }}");
    let dom = convert(&source);
    let fragment = super::declaration_of(&dom, "field");
    let Node::VariableDeclarationFragment(declarator) = dom.node(fragment) else {
        unreachable!()
    };
    assert_eq!(declarator.extra_dimensions.len(), 2);
    let extra: Vec<Vec<String>> = declarator
        .extra_dimensions
        .iter()
        .map(|dimension| annotation_names(&dom, *dimension))
        .collect();
    assert_eq!(extra, vec![vec!["B"], vec!["C"]]);

    let ty = dom
        .resolve_variable_binding(fragment)
        .and_then(|var| var.ty())
        .expect("field type resolves");
    assert_eq!(ty.dimensions(), 3);
    let mut levels = Vec::new();
    let mut current = Some(ty);
    while let Some(level) = current.filter(|ty| ty.is_array()) {
        levels.push(type_annotation_names(&level));
        current = level.component_type();
    }
    assert_eq!(levels, vec![vec!["B"], vec!["C"], vec!["A"]]);
}

#[test]
fn declaration_annotations_stay_in_modifiers() {
    let source = format!("{DECLS}class X {{ @A public java.lang.@B String field; }}");
    let dom = convert(&source);
    let fragment = super::declaration_of(&dom, "field");
    let Some(Node::FieldDeclaration(field)) = dom.parent(fragment).map(|p| dom.node(p)) else {
        unreachable!()
    };
    let kinds: Vec<NodeKind> = field.modifiers.iter().map(|m| dom.kind(*m)).collect();
    assert_eq!(kinds, vec![NodeKind::MarkerAnnotation, NodeKind::Modifier]);
    assert_eq!(annotation_names(&dom, field.ty), vec!["B"]);

    let variable = dom.resolve_variable_binding(fragment).unwrap();
    let declared: Vec<String> = variable.annotations().iter().map(|a| a.name()).collect();
    assert_eq!(declared, vec!["A"]);
}
