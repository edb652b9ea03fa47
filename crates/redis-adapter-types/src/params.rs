//! Parameter and result envelopes for the adapter operations

use crate::manifest::Manifest;
use crate::plan::{Plan, RequestParameters, ServiceDeployment};
use crate::{BoshConfigs, DeploymentTopology, DnsAddresses, ManagedSecrets, ManifestSecrets};
use serde::{Deserialize, Serialize};

/// Inputs of a generate-manifest call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateManifestParams {
    pub service_deployment: ServiceDeployment,

    pub plan: Plan,

    #[serde(default)]
    pub request_params: RequestParameters,

    /// Manifest of the currently deployed instance, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_manifest: Option<Manifest>,

    /// Plan the current instance was deployed with, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_plan: Option<Plan>,

    /// Secret values resolved for the previous manifest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_secrets: Option<ManifestSecrets>,
}

/// Output of a generate-manifest call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateManifestOutput {
    pub manifest: Manifest,

    /// Newly minted secrets the broker must persist
    #[serde(rename = "secrets", default)]
    pub managed_secrets: ManagedSecrets,

    #[serde(default)]
    pub configs: BoshConfigs,
}

/// Inputs of a create-binding call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateBindingParams {
    pub binding_id: String,

    pub deployment_topology: DeploymentTopology,

    pub manifest: Manifest,

    #[serde(default)]
    pub request_params: RequestParameters,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets: Option<ManifestSecrets>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_addresses: Option<DnsAddresses>,
}

/// Inputs of a delete-binding call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteBindingParams {
    pub binding_id: String,

    #[serde(default)]
    pub deployment_topology: DeploymentTopology,

    #[serde(default)]
    pub manifest: Manifest,

    #[serde(default)]
    pub request_params: RequestParameters,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets: Option<ManifestSecrets>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_addresses: Option<DnsAddresses>,
}

/// Inputs of a dashboard-url call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardUrlParams {
    pub instance_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<Manifest>,
}
