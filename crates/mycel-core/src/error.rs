//! Error types for Mycel operations.
//!
//! Only contract violations are errors. Admission outcomes (blocked,
//! throttled, waiting, no route) are data, carried by `TransferResult`.

use crate::types::NodeId;
use thiserror::Error;

/// Result type for Mycel operations.
pub type Result<T> = std::result::Result<T, MyceliumError>;

/// Contract violations. The failing operation leaves no state behind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MyceliumError {
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("duplicate node: {0}")]
    DuplicateNode(NodeId),

    #[error("cannot connect {0} to itself")]
    SelfConnection(NodeId),

    #[error("invalid strength: {0} (must be 0.0-1.0)")]
    InvalidStrength(f64),

    #[error("invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{field} out of range: {value} (must be {min}-{max})")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },
}

impl MyceliumError {
    /// Whether the error names a node that does not exist.
    pub fn is_unknown_node(&self) -> bool {
        matches!(self, MyceliumError::UnknownNode(_))
    }
}
