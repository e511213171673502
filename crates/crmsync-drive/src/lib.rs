//! crmsync Drive - Google Drive API client
//!
//! Provides an async client for listing Google Drive folder contents and an
//! adapter implementing the `IRemoteTreeSource` port.
//!
//! ## Modules
//!
//! - [`client`] - Authenticated Drive v3 HTTP client
//! - [`listing`] - Paginated child listing of a folder
//! - [`provider`] - `IRemoteTreeSource` adapter

pub mod client;
pub mod listing;
pub mod provider;

pub use client::DriveClient;
pub use listing::{ChildKind, DriveFile};
pub use provider::GoogleDriveTreeSource;

use std::time::Duration;
use thiserror::Error;

/// Media type Google Drive assigns to folders
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Errors that can occur when communicating with the Google Drive API
#[derive(Debug, Error)]
pub enum DriveError {
    /// Authentication credentials are invalid or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Insufficient permissions for the requested folder or drive
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested folder or drive does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded
    #[error("Too many requests, retry after {retry_after:?}")]
    TooManyRequests {
        /// Value of the `Retry-After` header, if present
        retry_after: Option<Duration>,
    },

    /// A server-side error occurred (5xx)
    #[error("Server error: {0}")]
    ServerError(String),

    /// Any other non-success status
    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
