//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the structure's own rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("cycle detected: adding '{child}' to '{parent}' would make it its own descendant")]
    CycleDetected { parent: String, child: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
