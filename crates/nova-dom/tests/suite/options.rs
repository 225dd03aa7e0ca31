use nova_dom::{ConvertOptions, NodeKind};
use nova_syntax::JavaLanguageLevel;

use super::{convert_with, nodes_of};

const SOURCE: &str = r#"
import java.util.function.IntSupplier;

class Configured {
    IntSupplier one = () -> 1;

    int twice(int x) {
        return x * 2;
    }
}
"#;

#[test]
fn toml_levels_accept_both_spellings() {
    let modern = ConvertOptions::from_toml_str("[dom]\nlanguage_level = \"21\"\n").unwrap();
    assert_eq!(modern.language_level, JavaLanguageLevel::JAVA_21);
    let legacy = ConvertOptions::from_toml_str("[dom]\nlanguage_level = \"1.8\"\n").unwrap();
    assert_eq!(legacy.language_level, JavaLanguageLevel::JAVA_8);
}

#[test]
fn empty_document_yields_defaults() {
    let options = ConvertOptions::from_toml_str("").unwrap();
    assert_eq!(options, ConvertOptions::default());
    assert!(options.resolve_bindings);
    assert!(!options.ignore_method_bodies);
    assert_eq!(options.language_level, JavaLanguageLevel::default());
}

#[test]
fn typos_are_rejected() {
    assert!(ConvertOptions::from_toml_str("[dom]\nignore_bodies = true\n").is_err());
    assert!(ConvertOptions::from_toml_str("[dom]\nresolve_bindings = \"yes\"\n").is_err());
}

#[test]
fn loaded_options_drive_conversion() {
    let options = ConvertOptions::from_toml_str(
        r#"
        [dom]
        language_level = "1.7"
        resolve_bindings = false
        ignore_method_bodies = true
        "#,
    )
    .unwrap();
    let dom = convert_with(SOURCE, options);
    assert_eq!(dom.options(), &options);

    let lambda = nodes_of(&dom, NodeKind::LambdaExpression)[0];
    assert!(dom.is_malformed(lambda));
    assert_eq!(dom.resolve_type_binding(lambda), None);
    assert!(nodes_of(&dom, NodeKind::ReturnStatement).is_empty());
}
