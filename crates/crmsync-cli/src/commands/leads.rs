//! Leads command - Manage leads and replay call events
//!
//! `event` applies a PBX event exactly as the webhook would, which is handy
//! for checking phone matching against real data.

use std::sync::Arc;

use anyhow::Result;
use clap::Subcommand;

use crmsync_core::domain::Lead;
use crmsync_core::ports::ILeadRepository;
use crmsync_core::usecases::HandleCallEventUseCase;
use crmsync_store::SqliteLeadRepository;

use super::Context;

#[derive(Debug, Subcommand)]
pub enum LeadsCommand {
    /// Add a lead
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
    },
    /// List leads, oldest first
    List,
    /// Apply a call event (ringing, answered, hangup)
    Event {
        event: String,
        phone: String,
    },
}

impl LeadsCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let config = ctx.load_valid_config()?;
        let pool = ctx.open_pool(&config).await?;
        let repo = Arc::new(SqliteLeadRepository::new(pool.pool().clone()));
        let out = ctx.output();

        match self {
            LeadsCommand::Add { name, phone } => {
                if name.trim().is_empty() || phone.trim().is_empty() {
                    anyhow::bail!("Lead name and phone must not be empty");
                }
                let lead = Lead::new(name.trim(), phone.trim());
                repo.save_lead(&lead).await?;
                out.json(&lead_json(&lead));
                out.success(&format!("Added lead {} ({})", lead.name(), lead.id()));
            }
            LeadsCommand::List => {
                let leads = repo.list_leads().await?;
                out.json(&serde_json::Value::Array(leads.iter().map(lead_json).collect()));
                if leads.is_empty() {
                    out.success("No leads");
                }
                for lead in &leads {
                    out.line(&format!(
                        "{:<24} {:<18} {}",
                        lead.name(),
                        lead.phone(),
                        lead.call_status()
                    ));
                }
            }
            LeadsCommand::Event { event, phone } => {
                let usecase = HandleCallEventUseCase::new(repo);
                let outcome = usecase.execute(event, phone).await?;
                out.json(&serde_json::to_value(outcome.summary())?);
                out.success(&format!(
                    "{} -> {}",
                    outcome.lead_name, outcome.update.call_status
                ));
                if let Some(seconds) = outcome.update.last_call_duration {
                    out.line(&format!("Call lasted {seconds}s"));
                }
            }
        }
        Ok(())
    }
}

fn lead_json(lead: &Lead) -> serde_json::Value {
    serde_json::json!({
        "id": lead.id().to_string(),
        "name": lead.name(),
        "phone": lead.phone(),
        "call_status": lead.call_status().as_str(),
        "call_started_at": lead.call_started_at().map(|t| t.to_rfc3339()),
        "last_call_duration": lead.last_call_duration(),
        "last_call_at": lead.last_call_at().map(|t| t.to_rfc3339()),
        "created_at": lead.created_at().to_rfc3339(),
    })
}
