//! Sync command - Reconcile a Drive folder
//!
//! Runs the same reconciliation the `/sync/drive` endpoint runs, without
//! the HTTP server in between.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Args;
use tracing::info;

use crmsync_core::domain::newtypes::{DriveId, ExternalId, OwnerId};
use crmsync_core::usecases::{ReconcileFolderUseCase, ReconcileRequest};
use crmsync_drive::{DriveClient, GoogleDriveTreeSource};
use crmsync_store::SqliteRecordStore;

use super::Context;

#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Remote id of the folder to reconcile
    #[arg(long)]
    pub root: String,

    /// Drive id ("root" for My Drive)
    #[arg(long, default_value = DriveId::MY_DRIVE)]
    pub drive: String,

    /// Label used as the first path segment
    #[arg(long)]
    pub label: String,

    /// Owner the records belong to
    #[arg(long)]
    pub owner: String,
}

impl SyncCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let out = ctx.output();

        let request = ReconcileRequest::new(
            ExternalId::new(&self.root)?,
            DriveId::new(&self.drive)?,
            &self.label,
        );
        let owner = OwnerId::new(&self.owner)?;

        let config = ctx.load_valid_config()?;
        let pool = ctx.open_pool(&config).await?;
        let client = DriveClient::from_config(&config.drive, config.sync.page_size)?;

        info!(root = %request.root_container_id, drive = %request.drive_id, "Starting reconciliation");
        out.line(&format!("Walking folder {} ...", request.root_container_id));

        let usecase = ReconcileFolderUseCase::new(
            Arc::new(GoogleDriveTreeSource::new(client)),
            Arc::new(SqliteRecordStore::new(pool.pool().clone())),
        )
        .with_batch_size(config.sync.batch_size);

        let result = usecase
            .execute(&request, &owner)
            .await
            .context("Reconciliation failed")?;

        out.json(&serde_json::json!({
            "success": true,
            "synced": result.synced_count,
            "inserted": result.inserted,
            "updated": result.updated,
        }));
        out.success(&format!(
            "Synced {} item(s): {} new, {} updated",
            result.synced_count, result.inserted, result.updated
        ));
        Ok(())
    }
}
