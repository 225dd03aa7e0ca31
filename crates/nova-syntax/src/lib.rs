//! Java lexical layer shared by the DOM converter and its front-ends.
//!
//! - [`lex`]/[`Lexer`]: a trivia-skipping tokenizer producing byte ranges.
//! - [`JavaLanguageLevel`]: language levels and per-feature availability.

mod language_level;
mod lexer;

pub use language_level::{
    FeatureAvailability, JavaFeature, JavaLanguageLevel, LanguageLevelParseError,
};
pub use lexer::{
    is_keyword, is_modifier_keyword, is_primitive_keyword, lex, skip_trivia, Lexer, Token,
    TokenKind,
};
