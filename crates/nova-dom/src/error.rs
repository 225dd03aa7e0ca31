use thiserror::Error;

use crate::NodeId;

/// A provider-side inconsistency that makes the unit unconvertible.
///
/// Malformed *source* never produces one of these; it is flagged on the
/// affected nodes instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("dangling {arena} id {index} in the input tree")]
    DanglingId { arena: &'static str, index: usize },
    #[error("unsupported construct: {0}")]
    Unsupported(String),
    #[error("compilation unit range {start}..{end} does not fit a source of {len} bytes")]
    UnitRange { start: usize, end: usize, len: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        ConfigError::Toml(value.message().to_string())
    }
}

/// A broken tree invariant, reported by [`crate::Dom::check_invariants`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invariant violated at {node:?}: {message}")]
pub struct InvariantViolation {
    pub node: NodeId,
    pub message: String,
}
