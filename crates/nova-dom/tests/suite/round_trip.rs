use nova_dom::Dom;
use nova_test_utils::normalize_whitespace;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::{convert, source_text};

const TYPES: &str = r#"
package p;

import java.util.List;
import java.util.Map;

@interface A {}
@interface B {}

class Outer<T> {
    class Inner {}

    java.util.List<String> a;
    Map<String, List<? extends Number>> b;
    int [] [] c;
    java . util . @A List<@B String> d;
    Outer<String>.@A Inner e;
    int @A [] f @B [];
    List<?>[] g;

    <U extends Comparable<U> & java.io.Serializable> void m(String... args) throws java.io.IOException {
        try {
        } catch (IllegalArgumentException | IllegalStateException x) {
        }
        Object o = (List<? super Integer>) null;
        Class<?> k = int[].class;
    }
}
"#;

/// Every type node prints as the source it was built from.
fn assert_types_round_trip(source: &str, dom: &Dom) {
    let mut checked = 0;
    for node in dom.descendants(dom.root()) {
        if !dom.kind(node).is_type() || dom.is_malformed(node) {
            continue;
        }
        assert_eq!(
            normalize_whitespace(&dom.to_source_string(node)),
            normalize_whitespace(source_text(source, dom, node)),
            "{:?} at {}",
            dom.kind(node),
            dom.start_position(node)
        );
        checked += 1;
    }
    assert!(checked > 0, "no type nodes in {source:?}");
}

#[test]
fn type_nodes_print_as_written() {
    let dom = convert(TYPES);
    assert_types_round_trip(TYPES, &dom);
}

#[test]
fn qualified_names_normalize_whitespace() {
    let source = "class Outer { static class Inner {} Outer. Inner field; }";
    let dom = convert(source);
    let ty = super::field_type(&dom, "field");
    assert_eq!(dom.to_source_string(ty), "Outer.Inner");
    assert_eq!(source_text(source, &dom, ty), "Outer. Inner");
}

fn reference_type() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        Just("String".to_string()),
        Just("Integer".to_string()),
        Just("java.lang.Object".to_string()),
        Just("java . util . List<String>".to_string()),
    ];
    leaf.prop_recursive(3, 16, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|ty| format!("List<{ty}>")),
            (inner.clone(), inner.clone()).prop_map(|(k, v)| format!("Map<{k}, ? extends {v}>")),
            inner.prop_map(|ty| format!("{ty} []")),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn generated_types_round_trip(ty in reference_type()) {
        let source = format!(
            "import java.util.List;\nimport java.util.Map;\nclass T {{ {ty} field; }}\n"
        );
        let dom = convert(&source);
        assert_types_round_trip(&source, &dom);
        let field = super::field_type(&dom, "field");
        prop_assert_eq!(
            normalize_whitespace(&dom.to_source_string(field)),
            normalize_whitespace(&ty)
        );
    }
}
