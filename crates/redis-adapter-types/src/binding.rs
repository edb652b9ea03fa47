//! Binding outputs handed back to the broker

use crate::{DnsAddresses, ManifestSecrets};
use serde::{Deserialize, Serialize};

/// Result of a create-binding call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub credentials: Credentials,
}

/// Connection credentials for a bound application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Address of the single service instance
    pub host: String,

    pub port: u16,

    /// Service password taken from the deployed manifest
    pub password: String,

    /// Value of the orchestrator-generated secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_secret: Option<String>,

    /// Value of the broker-managed secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub odb_managed_secret: Option<String>,

    /// Value of the plan-supplied secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_secret: Option<String>,

    /// Value of the ad-hoc secret requested by the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,

    #[serde(default)]
    pub dns_addresses: DnsAddresses,

    /// Secrets exactly as the broker supplied them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed_in_secrets: Option<ManifestSecrets>,

    /// Secrets the manifest references, resolved
    #[serde(default)]
    pub expected_resolved_secrets: ManifestSecrets,
}

/// Dashboard location for a service instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardUrl {
    pub dashboard_url: String,
}
