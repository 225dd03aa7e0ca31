use nova_dom::{ConvertOptions, Node, NodeKind};
use pretty_assertions::assert_eq;

use super::{convert, convert_with, name, nodes_of};

fn method_named<'a>(dom: &'a nova_dom::Dom, identifier: &str) -> (nova_dom::NodeId, &'a nova_dom::ast::MethodDeclaration) {
    let node = dom.parent(name(dom, identifier)).expect("method name has a parent");
    match dom.node(node) {
        Node::MethodDeclaration(method) => (node, method),
        other => panic!("`{identifier}` is not a method: {other:?}"),
    }
}

#[test]
fn native_method_with_a_body_is_kept_and_flagged() {
    let source = r#"
class Natives {
    native void n(int a, String b) { int x = 1; }
    void ok() {}
}
"#;
    let dom = convert(source);
    let (node, method) = method_named(&dom, "n");
    assert!(dom.is_malformed(node));
    assert_eq!(dom.to_source_string(method.name), "n");
    assert_eq!(method.parameters.len(), 2);
    let body = method.body.expect("the body is converted");
    assert_eq!(dom.children(body).len(), 1);

    let (ok, _) = method_named(&dom, "ok");
    assert!(!dom.is_malformed(ok));
    assert_eq!(dom.problems().len(), 1);
    assert_eq!(dom.problems()[0].node, node);
}

#[test]
fn illegal_method_shapes() {
    let source = r#"
abstract class Shapes {
    public private void visibility() {}
    final abstract void both();
    abstract void withBody() {}
    void withoutBody();
    static void receiver(Shapes this) {}
    void fine(Shapes this) {}
}
"#;
    let dom = convert(source);
    for identifier in ["visibility", "both", "withBody", "withoutBody", "receiver"] {
        let (node, _) = method_named(&dom, identifier);
        assert!(dom.is_malformed(node), "{identifier}");
    }
    let (fine, method) = method_named(&dom, "fine");
    assert!(!dom.is_malformed(fine));
    assert!(method.receiver_type.is_some());
}

#[test]
fn syntax_errors_do_not_stop_conversion() {
    let source = r#"
class Broken {
    void m() { int x = ; }
    int after = 2;
}
"#;
    let dom = convert(source);
    assert!(dom.descendants(dom.root()).iter().any(|node| dom.is_malformed(*node)));
    let after = super::declaration_of(&dom, "after");
    assert!(!dom.is_malformed(after));
    assert!(dom.resolve_variable_binding(after).is_some());
    assert_eq!(dom.check_invariants(), Ok(()));
}

#[test]
fn truncated_sources_convert() {
    let source = "package p;\nimport java.util.List;\n\
        class T<E> { List<E> items; int size() { return items.size(); } }\n";
    for end in (0..=source.len()).step_by(7) {
        let dom = convert_with(&source[..end], ConvertOptions::default());
        assert_eq!(dom.check_invariants(), Ok(()), "truncated at {end}");
        assert_eq!(dom.kind(dom.root()), NodeKind::CompilationUnit);
    }
}

#[test]
fn signatures_only_mode_drops_statements() {
    let source = "class Fast { int m(int p) { int x = p; return x; } static { System.out.println(); } }";
    let options = ConvertOptions {
        ignore_method_bodies: true,
        ..Default::default()
    };
    let dom = convert_with(source, options);
    let blocks = nodes_of(&dom, NodeKind::Block);
    assert_eq!(blocks.len(), 2);
    for block in blocks {
        assert!(dom.children(block).is_empty());
        assert!(!dom.is_malformed(block));
    }
    let (method_node, method) = method_named(&dom, "m");
    let body = method.body.unwrap();
    assert_eq!(dom.start_position(body), source.find("{ int x").unwrap());
    assert_eq!(&source[dom.start_position(body)..][..dom.length(body)], "{ int x = p; return x; }");
    assert!(dom.resolve_method_binding(method_node).is_some());
    assert!(nodes_of(&dom, NodeKind::ReturnStatement).is_empty());
}

#[test]
#[should_panic(expected = "does not belong to tree")]
fn nodes_of_another_tree_are_rejected() {
    let first = convert("class A {}");
    let second = convert("class B { int x; int y; int z; }");
    let foreign = *second.descendants(second.root()).last().unwrap();
    first.node(foreign);
}

#[test]
fn constructor_receivers_need_an_inner_class() {
    let source = r#"
class Outer {
    class Inner {
        Inner(Outer Outer.this) {}
    }
    static class Nested {
        Nested(Outer Outer.this) {}
    }
    enum Kind {
        ONE;
        Kind(Outer Outer.this) {}
    }
}
"#;
    let dom = convert(source);
    let constructor = |identifier: &str| {
        nodes_of(&dom, NodeKind::MethodDeclaration)
            .into_iter()
            .find(|node| match dom.node(*node) {
                Node::MethodDeclaration(method) => {
                    method.constructor && dom.to_source_string(method.name) == identifier
                }
                _ => false,
            })
            .unwrap_or_else(|| panic!("no constructor `{identifier}`"))
    };
    assert!(!dom.is_malformed(constructor("Inner")));
    for identifier in ["Nested", "Kind"] {
        assert!(dom.is_malformed(constructor(identifier)), "{identifier}");
    }
}
