//! Google Drive v3 API client
//!
//! Wraps `reqwest::Client` with the bearer token, base URL construction and
//! HTTP status classification.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use crmsync_core::domain::newtypes::{DriveId, ExternalId};
//! use crmsync_drive::{listing, ChildKind, DriveClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = DriveClient::new("access-token-here");
//! let folder = ExternalId::new("1AbCdEf")?;
//! let files = listing::list_children(&client, &folder, &DriveId::my_drive(), ChildKind::Leaves)
//!     .await?;
//! println!("{} files", files.len());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use reqwest::{header::RETRY_AFTER, Client, Method, RequestBuilder, Response, StatusCode};
use tracing::debug;

use crmsync_core::config::DriveConfig;

use crate::DriveError;

/// Base URL for the Google Drive API v3
const DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Default number of entries requested per listing page
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// HTTP client for Google Drive API calls
#[derive(Debug, Clone)]
pub struct DriveClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for API requests, without trailing slash
    base_url: String,
    /// OAuth2 access token
    access_token: String,
    /// Entries requested per listing page
    page_size: u32,
}

impl DriveClient {
    /// Creates a new DriveClient with the given access token
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_base_url(access_token, DRIVE_BASE_URL)
    }

    /// Creates a new DriveClient with a custom base URL (useful for testing)
    pub fn with_base_url(access_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Builds a client from the `drive` config section
    ///
    /// # Errors
    ///
    /// Returns an error if no access token is configured or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &DriveConfig, page_size: u32) -> anyhow::Result<Self> {
        let token = config.access_token.clone().ok_or_else(|| {
            anyhow::anyhow!(
                "No Drive access token configured (set drive.access_token or {})",
                crmsync_core::config::ENV_DRIVE_TOKEN
            )
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: token,
            page_size: page_size.clamp(1, 1000),
        })
    }

    /// Sets the listing page size (clamped to the API's 1..=1000)
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, 1000);
        self
    }

    /// Returns the listing page size
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Returns the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Creates an authenticated request builder for the given method and path
    ///
    /// `path` is relative to the base URL, e.g. `"/files"`.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "Drive request");
        self.client
            .request(method, &url)
            .bearer_auth(&self.access_token)
    }

    /// Maps a non-success response to a [`DriveError`]
    pub async fn check_status(response: Response) -> Result<Response, DriveError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        let body = response.text().await.unwrap_or_default();

        Err(classify_status(status, body, retry_after))
    }
}

/// Classifies an error status into a [`DriveError`]
fn classify_status(status: StatusCode, body: String, retry_after: Option<Duration>) -> DriveError {
    match status {
        StatusCode::UNAUTHORIZED => DriveError::Unauthorized(body),
        StatusCode::FORBIDDEN => DriveError::Forbidden(body),
        StatusCode::NOT_FOUND => DriveError::NotFound(body),
        StatusCode::TOO_MANY_REQUESTS => DriveError::TooManyRequests { retry_after },
        s if s.is_server_error() => DriveError::ServerError(format!("{}: {}", s.as_u16(), body)),
        s => DriveError::UnexpectedStatus {
            status: s.as_u16(),
            body,
        },
    }
}
