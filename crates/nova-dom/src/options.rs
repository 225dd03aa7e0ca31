use nova_syntax::JavaLanguageLevel;
use serde::Deserialize;

use crate::ConfigError;

/// Knobs for one conversion pass.
///
/// Loadable from the `[dom]` table of a TOML document:
///
/// ```toml
/// [dom]
/// language_level = "1.8"
/// resolve_bindings = true
/// ignore_method_bodies = false
/// check_ranges = true
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertOptions {
    /// Constructs needing a newer level are kept but flagged malformed.
    pub language_level: JavaLanguageLevel,
    /// When `false`, every `resolve_*` query returns `None`.
    pub resolve_bindings: bool,
    /// Signatures-only mode: method and initializer bodies become empty blocks.
    pub ignore_method_bodies: bool,
    /// Verify tree invariants after assembly and panic on violation.
    pub check_ranges: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            language_level: JavaLanguageLevel::default(),
            resolve_bindings: true,
            ignore_method_bodies: false,
            check_ranges: cfg!(debug_assertions),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct OptionsFile {
    #[serde(default)]
    dom: Option<ConvertOptions>,
}

impl ConvertOptions {
    pub fn with_language_level(mut self, level: JavaLanguageLevel) -> Self {
        self.language_level = level;
        self
    }

    /// Parse the `[dom]` table of a TOML document. A document without one
    /// yields the defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: OptionsFile = toml::from_str(text)?;
        Ok(file.dom.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dom_table() {
        let options = ConvertOptions::from_toml_str(
            r#"
            [dom]
            language_level = "1.8"
            resolve_bindings = false
            ignore_method_bodies = true
            "#,
        )
        .unwrap();
        assert_eq!(options.language_level, JavaLanguageLevel::JAVA_8);
        assert!(!options.resolve_bindings);
        assert!(options.ignore_method_bodies);
        assert_eq!(options.check_ranges, ConvertOptions::default().check_ranges);
    }

    #[test]
    fn missing_table_yields_defaults() {
        let options = ConvertOptions::from_toml_str("[other]\nx = 1\n").unwrap();
        assert_eq!(options, ConvertOptions::default());
    }

    #[test]
    fn rejects_unknown_keys_and_bad_levels() {
        assert!(ConvertOptions::from_toml_str("[dom]\nresolve = true\n").is_err());
        let err = ConvertOptions::from_toml_str("[dom]\nlanguage_level = \"0\"\n").unwrap_err();
        assert!(err.to_string().starts_with("failed to parse toml config"));
    }
}
