//! Core shared types for Nova.
//!
//! This crate is intentionally small: text offsets and ranges, a line index for
//! offset <-> line/column conversion, and interned-ish identifier names.

mod name;
mod text;

pub use name::{Name, QualifiedName};
pub use text::{LineCol, LineIndex, TextRange, TextSize};
