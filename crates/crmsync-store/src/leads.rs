//! SQLite implementation of ILeadRepository

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crmsync_core::domain::{
    newtypes::LeadId, CallStateUpdate, CallStatus, Lead, PhoneLookup,
};
use crmsync_core::ports::ILeadRepository;

use crate::rows::{escape_like, format_datetime, parse_datetime, parse_optional_datetime};
use crate::StoreError;

/// SQLite-based implementation of the lead repository port
pub struct SqliteLeadRepository {
    pool: SqlitePool,
}

impl SqliteLeadRepository {
    /// Creates a new repository with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Lists every lead, oldest first
    pub async fn list_leads(&self) -> anyhow::Result<Vec<Lead>> {
        let rows = sqlx::query("SELECT * FROM leads ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await?;

        let mut leads = Vec::with_capacity(rows.len());
        for row in &rows {
            leads.push(lead_from_row(row)?);
        }
        Ok(leads)
    }
}

fn lead_from_row(row: &SqliteRow) -> Result<Lead, StoreError> {
    let id_str: String = row.get("id");
    let status_str: String = row.get("call_status");
    let started_str: Option<String> = row.get("call_started_at");
    let last_call_str: Option<String> = row.get("last_call_at");
    let created_str: String = row.get("created_at");

    let id = LeadId::from_str(&id_str)
        .map_err(|e| StoreError::SerializationError(format!("Invalid lead id: {}", e)))?;
    let call_status = CallStatus::from_str(&status_str)
        .map_err(|e| StoreError::SerializationError(e.to_string()))?;

    Ok(Lead::from_parts(
        id,
        row.get("name"),
        row.get("phone"),
        call_status,
        parse_optional_datetime(started_str)?,
        row.get::<Option<i64>, _>("last_call_duration"),
        parse_optional_datetime(last_call_str)?,
        parse_datetime(&created_str)?,
    ))
}

#[async_trait::async_trait]
impl ILeadRepository for SqliteLeadRepository {
    async fn save_lead(&self, lead: &Lead) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO leads \
             (id, name, phone, call_status, call_started_at, last_call_duration, \
              last_call_at, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(lead.id().to_string())
        .bind(lead.name())
        .bind(lead.phone())
        .bind(lead.call_status().as_str())
        .bind(lead.call_started_at().map(|dt| format_datetime(&dt)))
        .bind(lead.last_call_duration())
        .bind(lead.last_call_at().map(|dt| format_datetime(&dt)))
        .bind(format_datetime(&lead.created_at()))
        .execute(&self.pool)
        .await?;

        tracing::trace!(lead_id = %lead.id(), "Saved lead");
        Ok(())
    }

    async fn get_lead(&self, id: &LeadId) -> anyhow::Result<Option<Lead>> {
        let row = sqlx::query("SELECT * FROM leads WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(lead_from_row(r)?)),
            None => Ok(None),
        }
    }

    async fn find_leads_by_phone(
        &self,
        lookup: &PhoneLookup,
        limit: u32,
    ) -> anyhow::Result<Vec<Lead>> {
        let rows = sqlx::query(
            "SELECT * FROM leads \
             WHERE phone = ? OR phone = ? OR phone LIKE ? ESCAPE '\\' \
             ORDER BY created_at ASC \
             LIMIT ?",
        )
        .bind(&lookup.exact)
        .bind(&lookup.normalized)
        .bind(format!("%{}", escape_like(&lookup.suffix)))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        let mut leads = Vec::with_capacity(rows.len());
        for row in &rows {
            leads.push(lead_from_row(row)?);
        }
        Ok(leads)
    }

    async fn update_call_state(
        &self,
        id: &LeadId,
        update: &CallStateUpdate,
    ) -> anyhow::Result<()> {
        let mut sql = String::from("UPDATE leads SET call_status = ?");
        if update.call_started_at.is_some() {
            sql.push_str(", call_started_at = ?");
        }
        if update.last_call_duration.is_some() {
            sql.push_str(", last_call_duration = ?");
        }
        if update.last_call_at.is_some() {
            sql.push_str(", last_call_at = ?");
        }
        sql.push_str(" WHERE id = ?");

        let mut query = sqlx::query(&sql).bind(update.call_status.as_str());
        if let Some(started) = update.call_started_at {
            query = query.bind(started.map(|dt| format_datetime(&dt)));
        }
        if let Some(duration) = update.last_call_duration {
            query = query.bind(duration);
        }
        if let Some(at) = update.last_call_at {
            query = query.bind(format_datetime(&at));
        }
        let result = query.bind(id.to_string()).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("lead {}", id)).into());
        }

        tracing::trace!(lead_id = %id, status = %update.call_status, "Updated call state");
        Ok(())
    }
}
