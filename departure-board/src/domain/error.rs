//! Domain error types.
//!
//! These errors represent validation failures in the domain layer.
//! They are distinct from API/IO errors.

/// Domain-level validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Station identifier is empty or whitespace
    #[error("station identifier must not be empty")]
    EmptyStation,

    /// Result limit must be at least one
    #[error("departure limit must be a positive integer")]
    ZeroLimit,
}
