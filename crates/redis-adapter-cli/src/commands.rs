//! Subcommand implementations

use crate::Commands;
use anyhow::{Context, Result};
use redis_adapter::{AdapterConfig, AdapterError, Binder, DashboardGenerator, ManifestGenerator};
use redis_adapter_types::{
    CreateBindingParams, DashboardUrlParams, DeleteBindingParams, GenerateManifestParams,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Run a subcommand and return the JSON response
pub(crate) fn execute(command: Commands, config_path: &Path) -> Result<String> {
    match command {
        Commands::GenerateManifest { input } => {
            let params: GenerateManifestParams = read_request(input.as_deref())?;
            let config = load_config(config_path)?;
            let output = ManifestGenerator::new(config).generate_manifest(params)?;
            to_json(&output)
        }
        Commands::CreateBinding { input } => {
            let params: CreateBindingParams = read_request(input.as_deref())?;
            let config = load_config(config_path)?;
            let binding = Binder::new(config).create_binding(params)?;
            to_json(&binding)
        }
        Commands::DeleteBinding { input } => {
            let params: DeleteBindingParams = read_request(input.as_deref())?;
            let config = load_config(config_path)?;
            Binder::new(config).delete_binding(params)?;
            Ok(String::new())
        }
        Commands::DashboardUrl { input } => {
            let params: DashboardUrlParams = read_request(input.as_deref())?;
            to_json(&DashboardGenerator.dashboard_url(&params))
        }
    }
}

/// Message shown to the broker's caller for a failed command
///
/// Operator-diagnostic adapter errors stay opaque; their detail has already
/// been logged.
pub(crate) fn caller_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<AdapterError>() {
        Some(adapter_err) => adapter_err.to_string(),
        None => format!("{:#}", err),
    }
}

fn load_config(path: &Path) -> Result<AdapterConfig> {
    debug!(path = %path.display(), "Loading config");
    let config = AdapterConfig::load(path).map_err(AdapterError::from)?;
    Ok(config)
}

fn read_request<T: DeserializeOwned>(input: Option<&Path>) -> Result<T> {
    let raw = match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("could not read request from {}", path.display()))?,
        _ => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("could not read request from stdin")?;
            raw
        }
    };

    serde_json::from_str(&raw).context("could not parse request JSON")
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).context("could not encode response JSON")
}
