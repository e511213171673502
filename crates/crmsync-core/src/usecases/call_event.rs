//! Call-event use case
//!
//! Applies one PBX event to the lead whose phone number matches. Input is
//! validated before any lookup, so rejected events have no side effects.

use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    domain::{newtypes::LeadId, CallEvent, CallStateUpdate, PhoneLookup},
    ports::ILeadRepository,
};

/// Errors returned by [`HandleCallEventUseCase`]
///
/// Each variant corresponds to one HTTP status class; see
/// [`CallEventError::status_code`].
#[derive(Debug, Error)]
pub enum CallEventError {
    /// Missing field, unknown event or unusable phone number
    #[error("{0}")]
    Validation(String),

    /// No lead matches the phone number
    #[error("No lead found for phone {0}")]
    NotFound(String),

    /// Lookup or update failed
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CallEventError {
    /// HTTP status this error is reported with
    pub fn status_code(&self) -> u16 {
        match self {
            CallEventError::Validation(_) => 400,
            CallEventError::NotFound(_) => 404,
            CallEventError::Internal(_) => 500,
        }
    }
}

/// What a handled event did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallEventOutcome {
    pub lead_id: LeadId,
    pub lead_name: String,
    pub event: CallEvent,
    /// Fields written to the lead
    pub update: CallStateUpdate,
}

impl CallEventOutcome {
    /// Reply body shared by the webhook and the CLI
    pub fn summary(&self) -> CallEventSummary {
        let update = &self.update;
        CallEventSummary {
            success: true,
            lead_id: self.lead_id.to_string(),
            lead_name: self.lead_name.clone(),
            event: self.event.as_str(),
            call_status: update.call_status.as_str(),
            call_started_at: update.call_started_at.map(|t| t.map(rfc3339)),
            last_call_duration: update.last_call_duration,
            last_call_at: update.last_call_at.map(rfc3339),
        }
    }
}

/// Lead identity plus exactly the fields an event wrote
///
/// A cleared `call_started_at` serializes as `null`; untouched fields are
/// omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallEventSummary {
    pub success: bool,
    pub lead_id: String,
    pub lead_name: String,
    pub event: &'static str,
    pub call_status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_started_at: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_call_duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_call_at: Option<String>,
}

fn rfc3339(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Use case that drives a lead's call status from PBX events
pub struct HandleCallEventUseCase {
    lead_repository: Arc<dyn ILeadRepository + Send + Sync>,
}

impl HandleCallEventUseCase {
    pub fn new(lead_repository: Arc<dyn ILeadRepository + Send + Sync>) -> Self {
        Self { lead_repository }
    }

    /// Handles `event` for `phone` at the current time
    pub async fn execute(
        &self,
        event: &str,
        phone: &str,
    ) -> Result<CallEventOutcome, CallEventError> {
        self.execute_at(event, phone, Utc::now()).await
    }

    /// Handles `event` for `phone` as if it happened at `now`
    pub async fn execute_at(
        &self,
        event: &str,
        phone: &str,
        now: DateTime<Utc>,
    ) -> Result<CallEventOutcome, CallEventError> {
        let (event, lookup) = Self::validate(event, phone)?;

        // Two rows are enough to detect an ambiguous match.
        let mut leads = self
            .lead_repository
            .find_leads_by_phone(&lookup, 2)
            .await
            .context("Failed to look up lead by phone")?;

        if leads.len() > 1 {
            warn!(
                phone = %lookup.exact,
                "Phone number matches more than one lead, using the oldest"
            );
        }
        if leads.is_empty() {
            debug!(phone = %lookup.exact, "No lead matches phone");
            return Err(CallEventError::NotFound(lookup.exact));
        }
        let lead = leads.swap_remove(0);

        let update = lead.transition(event, now);
        self.lead_repository
            .update_call_state(lead.id(), &update)
            .await
            .with_context(|| format!("Failed to update call state of lead {}", lead.id()))?;

        info!(
            lead_id = %lead.id(),
            event = %event,
            from = %lead.call_status(),
            to = %update.call_status,
            "Applied call event"
        );

        Ok(CallEventOutcome {
            lead_id: *lead.id(),
            lead_name: lead.name().to_string(),
            event,
            update,
        })
    }

    fn validate(event: &str, phone: &str) -> Result<(CallEvent, PhoneLookup), CallEventError> {
        let event = event.trim();
        let phone = phone.trim();
        if event.is_empty() {
            return Err(CallEventError::Validation(
                "Missing required field: event".to_string(),
            ));
        }
        if phone.is_empty() {
            return Err(CallEventError::Validation(
                "Missing required field: phone".to_string(),
            ));
        }

        let event: CallEvent = event
            .parse()
            .map_err(|e: crate::domain::DomainError| CallEventError::Validation(e.to_string()))?;
        let lookup =
            PhoneLookup::new(phone).map_err(|e| CallEventError::Validation(e.to_string()))?;
        Ok((event, lookup))
    }
}
