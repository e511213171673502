//! Domain error types
//!
//! Validation failures raised while constructing domain values.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid external (remote) identifier
    #[error("Invalid external ID: {0}")]
    InvalidExternalId(String),

    /// Invalid drive identifier
    #[error("Invalid drive ID: {0}")]
    InvalidDriveId(String),

    /// Invalid owner identity
    #[error("Invalid owner: {0}")]
    InvalidOwner(String),

    /// Invalid item path
    #[error("Invalid item path: {0}")]
    InvalidPath(String),

    /// Phone number contains no digits
    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    /// Unknown call status or call event name
    #[error("Invalid call state: {0}")]
    InvalidCallState(String),

    /// ID parsing error
    #[error("Invalid ID format: {0}")]
    InvalidId(String),
}
