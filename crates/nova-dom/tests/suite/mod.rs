mod annotations;
mod bindings;
mod effectively_final;
mod lambdas;
mod language_level;
mod malformed;
mod options;
mod printer;
mod round_trip;

use nova_dom::{ConvertOptions, Dom, Node, NodeId, NodeKind};

pub(crate) fn convert(source: &str) -> Dom {
    convert_with(source, ConvertOptions::default())
}

pub(crate) fn convert_with(source: &str, options: ConvertOptions) -> Dom {
    nova_test_utils::init_tracing();
    let input = nova_test_utils::compile(source);
    nova_dom::convert(input, options).expect("conversion succeeds")
}

/// Every node of `kind`, in preorder.
pub(crate) fn nodes_of(dom: &Dom, kind: NodeKind) -> Vec<NodeId> {
    dom.descendants(dom.root())
        .into_iter()
        .filter(|node| dom.kind(*node) == kind)
        .collect()
}

/// The first `SimpleName` spelling `identifier`.
pub(crate) fn name(dom: &Dom, identifier: &str) -> NodeId {
    dom.descendants(dom.root())
        .into_iter()
        .find(|node| matches!(dom.node(*node), Node::SimpleName(name) if name.identifier.as_str() == identifier))
        .unwrap_or_else(|| panic!("no name `{identifier}`"))
}

/// The fragment or single variable declaration declaring `identifier`.
pub(crate) fn declaration_of(dom: &Dom, identifier: &str) -> NodeId {
    let name = name(dom, identifier);
    let parent = dom.parent(name).expect("declared names have a parent");
    assert!(
        matches!(
            dom.kind(parent),
            NodeKind::VariableDeclarationFragment | NodeKind::SingleVariableDeclaration
        ),
        "`{identifier}` is not declared by a variable declaration: {:?}",
        dom.kind(parent)
    );
    parent
}

/// The declared type node of the field declaring `identifier`.
pub(crate) fn field_type(dom: &Dom, identifier: &str) -> NodeId {
    let fragment = declaration_of(dom, identifier);
    match dom.node(dom.parent(fragment).expect("fragment has a parent")) {
        Node::FieldDeclaration(field) => field.ty,
        other => panic!("`{identifier}` is not a field: {other:?}"),
    }
}

pub(crate) fn source_text<'a>(source: &'a str, dom: &Dom, node: NodeId) -> &'a str {
    let start = dom.start_position(node);
    &source[start..start + dom.length(node)]
}
