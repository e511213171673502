//! Shared fixtures for webhook integration tests

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crmsync_core::usecases::{HandleCallEventUseCase, ReconcileFolderUseCase};
use crmsync_drive::{DriveClient, GoogleDriveTreeSource, FOLDER_MIME_TYPE};
use crmsync_store::{DatabasePool, SqliteLeadRepository, SqliteRecordStore};
use crmsync_webhook::{AppState, WebhookServer};

/// A running server plus handles on its backing stores
pub struct TestApp {
    pub base_url: String,
    pub drive: MockServer,
    pub records: Arc<SqliteRecordStore>,
    pub leads: Arc<SqliteLeadRepository>,
    pub pool: DatabasePool,
    pub http: reqwest::Client,
    shutdown: CancellationToken,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Drops `table` so every later query against it fails
    pub async fn drop_table(&self, table: &str) {
        sqlx::query(&format!("DROP TABLE {table}"))
            .execute(self.pool.pool())
            .await
            .expect("drop table");
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_batch_size(50).await
}

pub async fn spawn_app_with_batch_size(batch_size: usize) -> TestApp {
    let drive = MockServer::start().await;
    let client = DriveClient::with_base_url("test-token", drive.uri());

    let pool = DatabasePool::in_memory().await.expect("in-memory pool");
    let records = Arc::new(SqliteRecordStore::new(pool.pool().clone()));
    let leads = Arc::new(SqliteLeadRepository::new(pool.pool().clone()));

    let reconcile =
        ReconcileFolderUseCase::new(Arc::new(GoogleDriveTreeSource::new(client)), records.clone())
            .with_batch_size(batch_size);
    let call_events = HandleCallEventUseCase::new(leads.clone());

    let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
    let server = WebhookServer::bind(AppState::new(reconcile, call_events), addr)
        .await
        .expect("bind");
    let local = server.local_addr().unwrap();

    let shutdown = CancellationToken::new();
    let token = shutdown.clone();
    tokio::spawn(async move {
        let _ = server.run(token).await;
    });

    TestApp {
        base_url: format!("http://{local}"),
        drive,
        records,
        leads,
        pool,
        http: reqwest::Client::new(),
        shutdown,
    }
}

/// Mounts one listing page for a parent's folders or files
pub async fn mount_children(
    server: &MockServer,
    parent: &str,
    folders: bool,
    files: serde_json::Value,
) {
    let op = if folders { "=" } else { "!=" };
    let q = format!("'{parent}' in parents and trashed = false and mimeType {op} '{FOLDER_MIME_TYPE}'");
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("q", q.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": files
        })))
        .mount(server)
        .await;
}

pub fn drive_file(id: &str, name: &str, mime_type: &str) -> serde_json::Value {
    serde_json::json!({ "id": id, "name": name, "mimeType": mime_type })
}
