use nova_dom::{ConvertOptions, Dom, NodeKind};
use nova_syntax::JavaLanguageLevel;

use super::{convert_with, nodes_of};

const MODERN: &str = r#"
import java.util.ArrayList;
import java.util.List;
import java.util.function.Supplier;

class Modern {
    Supplier<String> supplier = () -> "x";
    List<String> list = new ArrayList<>();

    void m() {
        var v = 1;
        for (String s : list) {
        }
    }
}
"#;

fn at(level: JavaLanguageLevel) -> Dom {
    convert_with(MODERN, ConvertOptions::default().with_language_level(level))
}

fn malformed_kinds(dom: &Dom) -> Vec<NodeKind> {
    let mut kinds: Vec<NodeKind> = dom
        .descendants(dom.root())
        .into_iter()
        .filter(|node| dom.is_malformed(*node))
        .map(|node| dom.kind(node))
        .collect();
    kinds.dedup();
    kinds
}

#[test]
fn newer_constructs_are_kept_but_flagged() {
    let dom = at(JavaLanguageLevel::JAVA_7);
    let lambda = nodes_of(&dom, NodeKind::LambdaExpression)[0];
    assert!(dom.is_malformed(lambda));
    let var = nodes_of(&dom, NodeKind::VariableDeclarationStatement)[0];
    assert!(dom.descendants(var).iter().any(|node| dom.is_malformed(*node)));
    assert!(dom
        .problems()
        .iter()
        .any(|problem| problem.diagnostic.code == "feature-unavailable"));

    // Diamond and enhanced for are fine at 7.
    let creation = nodes_of(&dom, NodeKind::ClassInstanceCreation)[0];
    assert!(dom.descendants(creation).iter().all(|node| !dom.is_malformed(*node)));
    let each = nodes_of(&dom, NodeKind::EnhancedForStatement)[0];
    assert!(!dom.is_malformed(each));
}

#[test]
fn only_var_needs_more_than_java_8() {
    let dom = at(JavaLanguageLevel::JAVA_8);
    assert!(!dom.is_malformed(nodes_of(&dom, NodeKind::LambdaExpression)[0]));
    assert_eq!(malformed_kinds(&dom), vec![NodeKind::SimpleType]);
}

#[test]
fn current_level_accepts_everything() {
    let dom = at(JavaLanguageLevel::JAVA_21);
    assert!(malformed_kinds(&dom).is_empty());
    assert!(dom.problems().is_empty());
}

#[test]
fn generics_are_flagged_before_java_5() {
    let dom = at(JavaLanguageLevel::JAVA_1_4);
    let parameterized = nodes_of(&dom, NodeKind::ParameterizedType);
    assert!(!parameterized.is_empty());
    assert!(parameterized.iter().all(|node| dom.is_malformed(*node)));
    assert!(dom.is_malformed(nodes_of(&dom, NodeKind::EnhancedForStatement)[0]));
}
