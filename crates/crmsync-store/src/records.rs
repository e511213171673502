//! SQLite implementation of IRecordStore
//!
//! ## Type Mapping
//!
//! | Domain Type          | SQL Type | Strategy                                    |
//! |----------------------|----------|---------------------------------------------|
//! | RecordId             | TEXT     | UUID string via `.to_string()` / `FromStr`  |
//! | OwnerId, ExternalId  | TEXT     | String via `.as_str()` / `new()`            |
//! | DriveId              | TEXT     | String via `.as_str()` / `new()`            |
//! | ItemPath             | TEXT     | serde_json array, plus `path_key` column    |
//! | bool                 | INTEGER  | 0 / 1                                       |
//! | DateTime<Utc>        | TEXT     | RFC 3339, microseconds, `Z`                 |

use std::collections::HashMap;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crmsync_core::domain::{
    newtypes::{DriveId, ExternalId, ItemPath, OwnerId, RecordId},
    NewRecord, PersistedRecord, RecordUpdate,
};
use crmsync_core::ports::{IRecordStore, RecordFilter};

use crate::rows::{escape_like, format_datetime, parse_datetime};
use crate::StoreError;

/// Upper bound on `IN (...)` placeholders per statement
const MAX_IN_PARAMS: usize = 500;

/// SQLite-based implementation of the record store port
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Creates a new store with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Row mapping
// ============================================================================

fn record_from_row(row: &SqliteRow) -> Result<PersistedRecord, StoreError> {
    let id_str: String = row.get("id");
    let owner_str: String = row.get("owner");
    let external_id_str: String = row.get("external_id");
    let drive_id_str: String = row.get("drive_id");
    let path_json: String = row.get("path");
    let created_at_str: String = row.get("created_at");
    let last_modified_str: String = row.get("last_modified_at");

    let record_id = RecordId::from_str(&id_str)
        .map_err(|e| StoreError::SerializationError(format!("Invalid record id: {}", e)))?;
    let owner = OwnerId::new(owner_str)
        .map_err(|e| StoreError::SerializationError(e.to_string()))?;
    let external_id = ExternalId::new(external_id_str)
        .map_err(|e| StoreError::SerializationError(e.to_string()))?;
    let drive_id = DriveId::new(drive_id_str)
        .map_err(|e| StoreError::SerializationError(e.to_string()))?;
    let path: ItemPath = serde_json::from_str(&path_json)
        .map_err(|e| StoreError::SerializationError(format!("Invalid path JSON: {}", e)))?;

    Ok(PersistedRecord {
        record_id,
        owner,
        external_id,
        drive_id,
        display_label: row.get("display_label"),
        media_type: row.get("media_type"),
        is_container: row.get::<bool, _>("is_container"),
        path,
        created_at: parse_datetime(&created_at_str)?,
        last_modified_at: parse_datetime(&last_modified_str)?,
    })
}

fn path_to_json(path: &ItemPath) -> Result<String, StoreError> {
    serde_json::to_string(path)
        .map_err(|e| StoreError::SerializationError(format!("Failed to serialize path: {}", e)))
}

// ============================================================================
// IRecordStore implementation
// ============================================================================

#[async_trait::async_trait]
impl IRecordStore for SqliteRecordStore {
    async fn find_record_ids(
        &self,
        owner: &OwnerId,
        external_ids: &[ExternalId],
    ) -> anyhow::Result<HashMap<ExternalId, RecordId>> {
        let mut found = HashMap::with_capacity(external_ids.len());

        for group in external_ids.chunks(MAX_IN_PARAMS) {
            let placeholders = vec!["?"; group.len()].join(", ");
            let sql = format!(
                "SELECT id, external_id FROM synced_records \
                 WHERE owner = ? AND external_id IN ({placeholders})"
            );

            let mut query = sqlx::query(&sql).bind(owner.as_str());
            for id in group {
                query = query.bind(id.as_str());
            }

            for row in query.fetch_all(&self.pool).await? {
                let id_str: String = row.get("id");
                let ext_str: String = row.get("external_id");
                let record_id = RecordId::from_str(&id_str).map_err(|e| {
                    StoreError::SerializationError(format!("Invalid record id: {}", e))
                })?;
                let external_id = ExternalId::new(ext_str)
                    .map_err(|e| StoreError::SerializationError(e.to_string()))?;
                found.insert(external_id, record_id);
            }
        }

        tracing::trace!(
            owner = %owner,
            requested = external_ids.len(),
            found = found.len(),
            "Looked up existing records"
        );
        Ok(found)
    }

    async fn insert_records(&self, records: &[NewRecord]) -> anyhow::Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for record in records {
            let item = &record.item;
            let created_at = format_datetime(&record.created_at);

            sqlx::query(
                "INSERT INTO synced_records \
                 (id, owner, external_id, drive_id, display_label, media_type, \
                  is_container, path, path_key, created_at, last_modified_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
                 ON CONFLICT (owner, external_id) DO UPDATE SET \
                  drive_id = excluded.drive_id, \
                  display_label = excluded.display_label, \
                  media_type = excluded.media_type, \
                  is_container = excluded.is_container, \
                  path = excluded.path, \
                  path_key = excluded.path_key, \
                  last_modified_at = excluded.last_modified_at",
            )
            .bind(record.record_id.to_string())
            .bind(item.owner.as_str())
            .bind(item.external_id.as_str())
            .bind(record.drive_id.as_str())
            .bind(&item.display_label)
            .bind(&item.media_type)
            .bind(item.is_container)
            .bind(path_to_json(&item.path)?)
            .bind(item.path.to_key())
            .bind(&created_at)
            .bind(&created_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        tracing::trace!(count = records.len(), "Inserted records");
        Ok(())
    }

    async fn update_record(&self, update: &RecordUpdate) -> anyhow::Result<()> {
        let result = sqlx::query(
            "UPDATE synced_records \
             SET display_label = ?, media_type = ?, path = ?, path_key = ?, \
                 last_modified_at = ? \
             WHERE id = ?",
        )
        .bind(&update.display_label)
        .bind(&update.media_type)
        .bind(path_to_json(&update.path)?)
        .bind(update.path.to_key())
        .bind(format_datetime(&update.last_modified_at))
        .bind(update.record_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("record {}", update.record_id)).into());
        }

        tracing::trace!(record_id = %update.record_id, "Updated record");
        Ok(())
    }

    async fn get_record(
        &self,
        owner: &OwnerId,
        external_id: &ExternalId,
    ) -> anyhow::Result<Option<PersistedRecord>> {
        let row =
            sqlx::query("SELECT * FROM synced_records WHERE owner = ? AND external_id = ?")
                .bind(owner.as_str())
                .bind(external_id.as_str())
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(ref r) => Ok(Some(record_from_row(r)?)),
            None => Ok(None),
        }
    }

    async fn list_records(
        &self,
        owner: &OwnerId,
        filter: &RecordFilter,
    ) -> anyhow::Result<Vec<PersistedRecord>> {
        let mut sql = String::from("SELECT * FROM synced_records WHERE owner = ?");
        let mut binds: Vec<String> = vec![owner.as_str().to_string()];

        if let Some(ref prefix) = filter.path_prefix {
            if !prefix.is_empty() {
                // Narrow by key; segment-exact matching happens below
                let key = prefix.join("/");
                sql.push_str(" AND (path_key = ? OR path_key LIKE ? ESCAPE '\\')");
                binds.push(key.clone());
                binds.push(format!("{}/%", escape_like(&key)));
            }
        }

        if filter.containers_only {
            sql.push_str(" AND is_container = 1");
        }

        sql.push_str(" ORDER BY path_key ASC");

        let mut query = sqlx::query(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }

        let rows = query.fetch_all(&self.pool).await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let record = record_from_row(row)?;
            let keep = match filter.path_prefix {
                Some(ref prefix) => record.path.starts_with(prefix),
                None => true,
            };
            if keep {
                records.push(record);
            }
        }
        records.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(records)
    }
}
