//! Java language level + feature availability model.
//!
//! Nova's DOM converter accepts a *superset* of Java (whatever the front-end
//! managed to attribute) and then checks each construct against the requested
//! language level. A construct that needs a newer level is kept in the tree but
//! flagged as malformed.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// The effective Java language mode for a compilation unit.
///
/// - `major`: the Java feature release number (5, 8, 11, 17, 21, …). Legacy
///   `1.x` spellings are normalized (`1.8` is `8`).
/// - `preview`: whether `--enable-preview` is in effect for this major version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct JavaLanguageLevel {
    pub major: u16,
    pub preview: bool,
}

impl JavaLanguageLevel {
    pub const JAVA_1_4: Self = Self::new(4);
    pub const JAVA_5: Self = Self::new(5);
    pub const JAVA_7: Self = Self::new(7);
    pub const JAVA_8: Self = Self::new(8);
    pub const JAVA_9: Self = Self::new(9);
    pub const JAVA_10: Self = Self::new(10);
    pub const JAVA_11: Self = Self::new(11);
    pub const JAVA_17: Self = Self::new(17);
    pub const JAVA_21: Self = Self::new(21);

    #[inline]
    pub const fn new(major: u16) -> Self {
        Self {
            major,
            preview: false,
        }
    }

    #[inline]
    pub const fn with_preview(self, preview: bool) -> Self {
        Self { preview, ..self }
    }

    pub fn availability(self, feature: JavaFeature) -> FeatureAvailability {
        use FeatureAvailability::*;
        use JavaFeature::*;

        let stable_since = |major: u16| if self.major >= major { Stable } else { Unavailable };

        match feature {
            Generics | Annotations | Varargs | EnhancedFor | StaticImports => stable_since(5),
            Diamond | TryWithResources | MultiCatch => stable_since(7),
            Lambdas | MethodReferences | TypeAnnotations | DefaultMethods
            | StaticInterfaceMethods | ReceiverParameters => stable_since(8),
            Modules | PrivateInterfaceMethods | ResourceReferences => stable_since(9),
            VarLocalInference => stable_since(10),
            VarLambdaParameters => stable_since(11),

            SwitchExpressions => {
                if self.major >= 14 {
                    Stable
                } else if self.major == 12 || self.major == 13 {
                    Preview
                } else {
                    Unavailable
                }
            }

            Records => {
                if self.major >= 16 {
                    Stable
                } else if self.major == 14 || self.major == 15 {
                    Preview
                } else {
                    Unavailable
                }
            }

            SealedClasses => {
                if self.major >= 17 {
                    Stable
                } else if self.major == 15 || self.major == 16 {
                    Preview
                } else {
                    Unavailable
                }
            }
        }
    }

    /// Is the feature usable in this configuration? (applies `preview` flag)
    pub fn is_enabled(self, feature: JavaFeature) -> bool {
        match self.availability(feature) {
            FeatureAvailability::Stable => true,
            FeatureAvailability::Preview => self.preview,
            FeatureAvailability::Unavailable => false,
        }
    }

    #[inline]
    pub fn supports_type_annotations(self) -> bool {
        self.is_enabled(JavaFeature::TypeAnnotations)
    }

    #[inline]
    pub fn supports_lambdas(self) -> bool {
        self.is_enabled(JavaFeature::Lambdas)
    }

    #[inline]
    pub fn supports_modules(self) -> bool {
        self.is_enabled(JavaFeature::Modules)
    }

    #[inline]
    pub fn supports_var_local_inference(self) -> bool {
        self.is_enabled(JavaFeature::VarLocalInference)
    }

    #[inline]
    pub fn supports_records(self) -> bool {
        self.is_enabled(JavaFeature::Records)
    }
}

impl Default for JavaLanguageLevel {
    fn default() -> Self {
        JavaLanguageLevel::JAVA_21
    }
}

impl fmt::Display for JavaLanguageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.major)?;
        if self.preview {
            f.write_str("-preview")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid Java language level `{0}` (expected e.g. `8`, `1.8`, `21-preview`)")]
pub struct LanguageLevelParseError(pub String);

impl FromStr for JavaLanguageLevel {
    type Err = LanguageLevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (version, preview) = match trimmed.strip_suffix("-preview") {
            Some(version) => (version, true),
            None => (trimmed, false),
        };
        let version = version.strip_prefix("1.").unwrap_or(version);
        let major: u16 = version
            .parse()
            .map_err(|_| LanguageLevelParseError(s.to_string()))?;
        if major == 0 {
            return Err(LanguageLevelParseError(s.to_string()));
        }
        Ok(JavaLanguageLevel { major, preview })
    }
}

impl TryFrom<String> for JavaLanguageLevel {
    type Error = LanguageLevelParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JavaFeature {
    Generics,                // Java 5
    Annotations,             // Java 5
    Varargs,                 // Java 5
    EnhancedFor,             // Java 5
    StaticImports,           // Java 5
    Diamond,                 // Java 7
    TryWithResources,        // Java 7
    MultiCatch,              // Java 7
    Lambdas,                 // Java 8
    MethodReferences,        // Java 8
    TypeAnnotations,         // Java 8
    DefaultMethods,          // Java 8
    StaticInterfaceMethods,  // Java 8
    ReceiverParameters,      // Java 8
    Modules,                 // Java 9
    PrivateInterfaceMethods, // Java 9
    ResourceReferences,      // Java 9 (`try (r) { ... }`)
    VarLocalInference,       // Java 10
    VarLambdaParameters,     // Java 11
    SwitchExpressions,       // final Java 14
    Records,                 // final Java 16 (preview 14/15)
    SealedClasses,           // final Java 17 (preview 15/16)
}

impl JavaFeature {
    pub const fn display_name(self) -> &'static str {
        match self {
            JavaFeature::Generics => "generics",
            JavaFeature::Annotations => "annotations",
            JavaFeature::Varargs => "variable arity parameters",
            JavaFeature::EnhancedFor => "enhanced `for` statements",
            JavaFeature::StaticImports => "static imports",
            JavaFeature::Diamond => "diamond `<>`",
            JavaFeature::TryWithResources => "try-with-resources",
            JavaFeature::MultiCatch => "multi-catch",
            JavaFeature::Lambdas => "lambda expressions",
            JavaFeature::MethodReferences => "method references",
            JavaFeature::TypeAnnotations => "type annotations",
            JavaFeature::DefaultMethods => "default methods",
            JavaFeature::StaticInterfaceMethods => "static interface methods",
            JavaFeature::ReceiverParameters => "receiver parameters",
            JavaFeature::Modules => "modules",
            JavaFeature::PrivateInterfaceMethods => "private interface methods",
            JavaFeature::ResourceReferences => "resource references in try-with-resources",
            JavaFeature::VarLocalInference => "local variable type inference (`var`)",
            JavaFeature::VarLambdaParameters => "`var` lambda parameters",
            JavaFeature::SwitchExpressions => "switch expressions",
            JavaFeature::Records => "records",
            JavaFeature::SealedClasses => "sealed classes",
        }
    }

    pub const fn stable_since(self) -> u16 {
        match self {
            JavaFeature::Generics
            | JavaFeature::Annotations
            | JavaFeature::Varargs
            | JavaFeature::EnhancedFor
            | JavaFeature::StaticImports => 5,
            JavaFeature::Diamond | JavaFeature::TryWithResources | JavaFeature::MultiCatch => 7,
            JavaFeature::Lambdas
            | JavaFeature::MethodReferences
            | JavaFeature::TypeAnnotations
            | JavaFeature::DefaultMethods
            | JavaFeature::StaticInterfaceMethods
            | JavaFeature::ReceiverParameters => 8,
            JavaFeature::Modules
            | JavaFeature::PrivateInterfaceMethods
            | JavaFeature::ResourceReferences => 9,
            JavaFeature::VarLocalInference => 10,
            JavaFeature::VarLambdaParameters => 11,
            JavaFeature::SwitchExpressions => 14,
            JavaFeature::Records => 16,
            JavaFeature::SealedClasses => 17,
        }
    }
}

/// Whether the *language* supports a feature in this major version,
/// independent of whether preview is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureAvailability {
    Unavailable,
    Preview,
    Stable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_legacy_and_preview_spellings() {
        assert_eq!("1.8".parse::<JavaLanguageLevel>(), Ok(JavaLanguageLevel::JAVA_8));
        assert_eq!(" 17 ".parse::<JavaLanguageLevel>(), Ok(JavaLanguageLevel::JAVA_17));
        assert_eq!(
            "15-preview".parse::<JavaLanguageLevel>(),
            Ok(JavaLanguageLevel::new(15).with_preview(true))
        );
        assert!("eight".parse::<JavaLanguageLevel>().is_err());
        assert!("0".parse::<JavaLanguageLevel>().is_err());
    }

    #[test]
    fn preview_features_need_the_preview_flag() {
        let level = JavaLanguageLevel::new(15);
        assert_eq!(level.availability(JavaFeature::Records), FeatureAvailability::Preview);
        assert!(!level.is_enabled(JavaFeature::Records));
        assert!(level.with_preview(true).is_enabled(JavaFeature::Records));
    }

    #[test]
    fn java_7_rejects_lambdas_and_type_annotations() {
        let level = JavaLanguageLevel::JAVA_7;
        assert!(!level.supports_lambdas());
        assert!(!level.supports_type_annotations());
        assert!(level.is_enabled(JavaFeature::Diamond));
        assert!(JavaLanguageLevel::JAVA_8.supports_lambdas());
    }
}
