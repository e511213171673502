//! Paginated folder listing
//!
//! Lists the immediate children of a folder via `GET /files` with a
//! `q` filter, following `nextPageToken` until the listing is exhausted.
//!
//! Folders and files are requested separately:
//!
//! ```text
//! '<parent>' in parents and trashed = false and mimeType  = 'application/vnd.google-apps.folder'
//! '<parent>' in parents and trashed = false and mimeType != 'application/vnd.google-apps.folder'
//! ```
//!
//! For a shared drive the request also carries `corpora=drive`, `driveId`,
//! `supportsAllDrives` and `includeItemsFromAllDrives`.

use std::collections::HashSet;

use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, warn};

use crmsync_core::domain::newtypes::{DriveId, ExternalId};

use crate::client::DriveClient;
use crate::{DriveError, FOLDER_MIME_TYPE};

/// Path of the file listing endpoint relative to the base URL
const FILES_PATH: &str = "/files";

/// Fields requested per page
const LIST_FIELDS: &str = "nextPageToken, files(id, name, mimeType)";

/// Which children of a folder to list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind {
    /// Sub-folders only
    Containers,
    /// Everything except folders
    Leaves,
}

/// One page of `GET /files`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListResponse {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

/// A file or folder as returned by the Drive API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
}

/// Builds the `q` filter for the children of `parent`
pub fn children_query(parent: &ExternalId, kind: ChildKind) -> String {
    let op = match kind {
        ChildKind::Containers => "=",
        ChildKind::Leaves => "!=",
    };
    format!(
        "'{}' in parents and trashed = false and mimeType {} '{}'",
        escape_query_value(parent.as_str()),
        op,
        FOLDER_MIME_TYPE
    )
}

/// Escapes `\` and `'` inside a single-quoted query string
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Lists every child of `parent` of the given kind across all pages
///
/// # Errors
///
/// Returns the first HTTP or decoding error. Pages fetched before the
/// error are discarded.
pub async fn list_children(
    client: &DriveClient,
    parent: &ExternalId,
    drive_id: &DriveId,
    kind: ChildKind,
) -> Result<Vec<DriveFile>, DriveError> {
    let q = children_query(parent, kind);
    let page_size = client.page_size().to_string();

    let mut files = Vec::new();
    let mut seen_tokens: HashSet<String> = HashSet::new();
    let mut page_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let mut params: Vec<(&str, &str)> = vec![
            ("q", q.as_str()),
            ("fields", LIST_FIELDS),
            ("pageSize", page_size.as_str()),
        ];
        if drive_id.is_shared() {
            params.extend([
                ("corpora", "drive"),
                ("driveId", drive_id.as_str()),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ]);
        }
        if let Some(ref token) = page_token {
            params.push(("pageToken", token.as_str()));
        }

        let response = client
            .request(Method::GET, FILES_PATH)
            .query(&params)
            .send()
            .await?;
        let response = DriveClient::check_status(response).await?;
        let page: FileListResponse = response
            .json()
            .await
            .map_err(|e| DriveError::InvalidResponse(format!("Failed to parse file list: {e}")))?;

        pages += 1;
        files.extend(page.files);

        match page.next_page_token.filter(|t| !t.is_empty()) {
            Some(token) => {
                if !seen_tokens.insert(token.clone()) {
                    warn!(
                        parent = %parent,
                        "Drive returned a repeated page token, stopping pagination"
                    );
                    break;
                }
                page_token = Some(token);
            }
            None => break,
        }
    }

    debug!(
        parent = %parent,
        kind = ?kind,
        pages,
        count = files.len(),
        "Listed folder children"
    );

    Ok(files)
}
