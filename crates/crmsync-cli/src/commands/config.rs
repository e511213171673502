//! Config command - View and check crmsync configuration

use anyhow::{Context as _, Result};
use clap::Subcommand;
use crmsync_core::config::Config;
use tracing::info;

use super::Context;

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the effective configuration (file plus environment)
    Show,
    /// Validate the configuration and report every problem
    Validate,
    /// Print the config file path in use
    Path,
}

impl ConfigCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        match self {
            ConfigCommand::Show => show(ctx),
            ConfigCommand::Validate => validate(ctx),
            ConfigCommand::Path => {
                let out = ctx.output();
                let path = ctx.config_path().display().to_string();
                out.json(&serde_json::json!({
                    "path": path,
                    "exists": ctx.config_path().exists(),
                }));
                if !out.is_json() {
                    println!("{path}");
                }
                Ok(())
            }
        }
    }
}

fn show(ctx: &Context) -> Result<()> {
    let out = ctx.output();
    let config = ctx.load_config()?;

    info!(config_path = %ctx.config_path().display(), "Showing configuration");

    if out.is_json() {
        let json =
            serde_json::to_value(&config).context("Failed to serialize configuration to JSON")?;
        out.json(&json);
    } else {
        out.success(&format!("Configuration ({})", ctx.config_path().display()));
        let yaml =
            serde_yaml::to_string(&config).context("Failed to serialize configuration to YAML")?;
        for line in yaml.lines() {
            out.line(line);
        }
        if config.drive.access_token.is_some() {
            out.line("(drive access token is set)");
        }
    }
    Ok(())
}

fn validate(ctx: &Context) -> Result<()> {
    let out = ctx.output();
    let config: Config = ctx.load_config()?;
    let errors = config.validate();

    out.json(&serde_json::json!({
        "valid": errors.is_empty(),
        "errors": errors
            .iter()
            .map(|e| serde_json::json!({ "field": e.field, "message": e.message }))
            .collect::<Vec<_>>(),
    }));

    if errors.is_empty() {
        out.success("Configuration is valid");
        if config.drive.access_token.is_none() {
            out.warn("No Drive access token configured; sync will fail");
        }
        return Ok(());
    }

    for error in &errors {
        out.line(&error.to_string());
    }
    anyhow::bail!("{} configuration error(s)", errors.len())
}
