//! Lead repository port (driven/secondary port)

use crate::domain::{newtypes::LeadId, CallStateUpdate, Lead, PhoneLookup};

/// Port trait for lead persistence
#[async_trait::async_trait]
pub trait ILeadRepository: Send + Sync {
    /// Saves a lead (insert or replace)
    async fn save_lead(&self, lead: &Lead) -> anyhow::Result<()>;

    /// Retrieves a lead by id
    async fn get_lead(&self, id: &LeadId) -> anyhow::Result<Option<Lead>>;

    /// Finds leads whose phone satisfies any key of `lookup`
    ///
    /// Evaluated as a single disjunctive query, ordered by creation time.
    /// At most `limit` rows are returned.
    async fn find_leads_by_phone(
        &self,
        lookup: &PhoneLookup,
        limit: u32,
    ) -> anyhow::Result<Vec<Lead>>;

    /// Writes the call-state fields of one lead
    async fn update_call_state(&self, id: &LeadId, update: &CallStateUpdate)
        -> anyhow::Result<()>;
}
