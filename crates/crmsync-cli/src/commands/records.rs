//! Records command - Inspect synced records

use anyhow::Result;
use clap::Subcommand;

use crmsync_core::domain::newtypes::{ExternalId, OwnerId};
use crmsync_core::domain::PersistedRecord;
use crmsync_core::ports::{IRecordStore, RecordFilter};
use crmsync_store::SqliteRecordStore;

use super::Context;

#[derive(Debug, Subcommand)]
pub enum RecordsCommand {
    /// List an owner's records ordered by path
    List {
        #[arg(long)]
        owner: String,
        /// Only records under this path, e.g. "Acme/Invoices"
        #[arg(long)]
        prefix: Option<String>,
        /// Only folders
        #[arg(long)]
        containers: bool,
    },
    /// Show one record by remote id
    Show {
        #[arg(long)]
        owner: String,
        /// Remote id of the item
        id: String,
    },
}

impl RecordsCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let config = ctx.load_valid_config()?;
        let pool = ctx.open_pool(&config).await?;
        let store = SqliteRecordStore::new(pool.pool().clone());
        let out = ctx.output();

        match self {
            RecordsCommand::List {
                owner,
                prefix,
                containers,
            } => {
                let mut filter = RecordFilter::new();
                if let Some(prefix) = prefix {
                    filter = filter.with_path_prefix(split_prefix(prefix));
                }
                if *containers {
                    filter = filter.containers_only();
                }

                let records = store.list_records(&OwnerId::new(owner)?, &filter).await?;

                out.json(&serde_json::Value::Array(
                    records.iter().map(record_json).collect(),
                ));
                if records.is_empty() {
                    out.success("No records");
                }
                for record in &records {
                    let indent = "  ".repeat(record.path.depth());
                    out.line(&format!("{indent}{}", record.display_label));
                }
            }
            RecordsCommand::Show { owner, id } => {
                let record = store
                    .get_record(&OwnerId::new(owner)?, &ExternalId::new(id)?)
                    .await?;
                match record {
                    Some(record) => {
                        out.json(&record_json(&record));
                        out.success(&record.display_label);
                        out.line(&format!("path:      {}", record.path));
                        out.line(&format!("type:      {}", record.media_type));
                        out.line(&format!("drive:     {}", record.drive_id));
                        out.line(&format!("modified:  {}", record.last_modified_at));
                    }
                    None => anyhow::bail!("No record {id} for owner {owner}"),
                }
            }
        }
        Ok(())
    }
}

/// Splits "a/b/c" into segments, ignoring empty ones
fn split_prefix(prefix: &str) -> Vec<String> {
    prefix
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn record_json(record: &PersistedRecord) -> serde_json::Value {
    serde_json::json!({
        "record_id": record.record_id.to_string(),
        "external_id": record.external_id.as_str(),
        "drive_id": record.drive_id.as_str(),
        "display_label": record.display_label,
        "media_type": record.media_type,
        "is_container": record.is_container,
        "path": record.path.segments(),
        "created_at": record.created_at.to_rfc3339(),
        "last_modified_at": record.last_modified_at.to_rfc3339(),
    })
}
