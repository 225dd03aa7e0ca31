use nova_dom::NodeKind;
use pretty_assertions::assert_eq;

use super::{convert, name, nodes_of};

#[test]
fn declarations_print_with_two_space_indentation() {
    let dom = convert("class P { int add(int a,int b){return a+b;} }");
    let class = nodes_of(&dom, NodeKind::TypeDeclaration)[0];
    assert_eq!(
        dom.to_source_string(class),
        "class P {\n  int add(int a, int b) {\n    return a + b;\n  }\n}\n"
    );
    let method = dom.parent(name(&dom, "add")).unwrap();
    assert_eq!(
        dom.to_source_string(method),
        "int add(int a, int b) {\n  return a + b;\n}\n"
    );
}

#[test]
fn comments_and_layout_are_not_reproduced() {
    let source = r#"
class Layout {
    /* counter */ private   static
        final int   MAX  =  /* inline */ 10 ;
}
"#;
    let dom = convert(source);
    let field = nodes_of(&dom, NodeKind::FieldDeclaration)[0];
    assert_eq!(dom.to_source_string(field), "private static final int MAX = 10;\n");
}

#[test]
fn control_flow_statements() {
    let source = r#"
class Flow {
    int m(int k, int[] xs) {
        if (k > 0) return 1; else { k = 2; }
        for (int i = 0; i < k; i++) k--;
        switch (k) {
            case 1: return 3;
            default: break;
        }
        return xs[0];
    }
}
"#;
    let dom = convert(source);
    let body = nodes_of(&dom, NodeKind::Block)[0];
    assert_eq!(
        dom.to_source_string(body),
        "{\n\
        \x20 if (k > 0)\n\
        \x20   return 1;\n\
        \x20 else {\n\
        \x20   k = 2;\n\
        \x20 }\n\
        \x20 for (int i = 0; i < k; i++)\n\
        \x20   k--;\n\
        \x20 switch (k) {\n\
        \x20   case 1:\n\
        \x20     return 3;\n\
        \x20   default:\n\
        \x20     break;\n\
        \x20 }\n\
        \x20 return xs[0];\n\
        }\n"
    );
}

#[test]
fn expressions_are_spaced_canonically() {
    let source = r#"
import java.util.function.IntUnaryOperator;

class Exprs {
    IntUnaryOperator inc = x->x+1;
    int total = (1+2)*3+4+5;
    long widened = (long)total;
    String pick = total>3?"big":"small";
}
"#;
    let dom = convert(source);
    let fragments = nodes_of(&dom, NodeKind::VariableDeclarationFragment);
    let printed: Vec<String> = fragments
        .into_iter()
        .filter(|fragment| dom.kind(dom.parent(*fragment).unwrap()) == NodeKind::FieldDeclaration)
        .map(|fragment| dom.to_source_string(fragment))
        .collect();
    assert_eq!(
        printed,
        vec![
            "inc = x -> x + 1",
            "total = (1 + 2) * 3 + 4 + 5",
            "widened = (long) total",
            "pick = total > 3 ? \"big\" : \"small\"",
        ]
    );
}

#[test]
fn annotations_and_enums() {
    let source = r#"
@SuppressWarnings(value = "unchecked")
enum Color { RED, GREEN }
"#;
    let dom = convert(source);
    let annotation = nodes_of(&dom, NodeKind::NormalAnnotation)[0];
    assert_eq!(dom.to_source_string(annotation), "@SuppressWarnings(value=\"unchecked\")");
    let color = nodes_of(&dom, NodeKind::EnumDeclaration)[0];
    assert_eq!(
        dom.to_source_string(color),
        "@SuppressWarnings(value=\"unchecked\") enum Color {\n  RED,\n  GREEN\n}\n"
    );
}
