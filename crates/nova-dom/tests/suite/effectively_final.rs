use nova_dom::{Dom, Node, NodeKind};
use pretty_assertions::assert_eq;

use super::{convert, declaration_of, nodes_of};

const SOURCE: &str = r#"
import java.io.Closeable;

class Resources {
    Closeable field;

    void m(Closeable c, int unused, int bumped) throws java.io.IOException {
        try (Closeable r = c) {
            r.close();
        }
        try {
            c.close();
        } catch (IllegalArgumentException | IllegalStateException e) {
            Object o = e;
        }
        for (int i = 0; i < 3; i++) {
        }
        for (String s : new String[0]) {
            Object o = s;
        }
        int once = 1;
        int later;
        later = 2;
        int reassigned = 1;
        reassigned = 2;
        int compound = 1;
        compound += 1;
        int decremented = 1;
        --decremented;
        bumped++;
    }
}
"#;

fn effectively_final(dom: &Dom, name: &str) -> bool {
    dom.resolve_variable_binding(declaration_of(dom, name))
        .unwrap_or_else(|| panic!("`{name}` resolves"))
        .is_effectively_final()
}

#[test]
fn read_only_variables_are_effectively_final() {
    let dom = convert(SOURCE);
    for name in ["r", "e", "s", "once", "later", "c", "unused"] {
        assert!(effectively_final(&dom, name), "{name}");
    }
}

#[test]
fn any_later_write_disqualifies() {
    let dom = convert(SOURCE);
    for name in ["i", "reassigned", "compound", "decremented", "bumped"] {
        assert!(!effectively_final(&dom, name), "{name}");
    }
}

#[test]
fn fields_are_never_effectively_final() {
    let dom = convert(SOURCE);
    assert!(!effectively_final(&dom, "field"));
}

const BRANCHES: &str = r#"
class Paths {
    void use(int v) {}

    void m(boolean c) {
        int x;
        if (c) x = 1; else x = 2;
        Runnable r = () -> use(x);
        int y;
        while (c) {
            y = 1;
        }
        int z;
        z = 1;
        z = 2;
        int k;
        switch (x) {
            case 1: k = 1; break;
            default: k = 2;
        }
        int fall;
        switch (x) {
            case 1: fall = 1;
            default: fall = 2;
        }
        while (c) {
            int inner;
            inner = 3;
        }
    }
}
"#;

#[test]
fn blank_locals_may_be_assigned_once_per_path() {
    let dom = convert(BRANCHES);
    for name in ["x", "k", "inner"] {
        assert!(effectively_final(&dom, name), "{name}");
    }
    for name in ["y", "z", "fall"] {
        assert!(!effectively_final(&dom, name), "{name}");
    }
}

const IMPLICIT_RESOURCES: &str = r#"
import java.io.Closeable;

class Implicit {
    void m(Closeable c, Closeable d) throws java.io.IOException {
        Closeable held = c;
        try (held) {
        }
        Closeable moved = c;
        moved = d;
        try (moved) {
        }
    }
}
"#;

#[test]
fn implicit_resources_name_existing_variables() {
    let dom = convert(IMPLICIT_RESOURCES);
    assert!(effectively_final(&dom, "held"));
    assert!(!effectively_final(&dom, "moved"));

    let statements = nodes_of(&dom, NodeKind::TryStatement);
    assert_eq!(statements.len(), 2);
    let held = dom.resolve_variable_binding(declaration_of(&dom, "held")).unwrap();
    let Node::TryStatement(first) = dom.node(statements[0]) else {
        unreachable!()
    };
    assert_eq!(first.resources.len(), 1);
    let resource = first.resources[0];
    assert_eq!(dom.kind(resource), NodeKind::SimpleName);
    assert_eq!(dom.resolve_variable_binding(resource), Some(held));
    assert!(!dom.is_malformed(statements[0]));
}
