//! Java-specific helpers for Nova's semantic/type system.
//!
//! The formatters here are "Java-like" and stable, intended for binding names
//! and diagnostics.

pub mod env;
pub mod format;
pub mod helpers;
