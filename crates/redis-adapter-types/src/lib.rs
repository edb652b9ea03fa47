//! Redis Adapter Types - Data model for the Redis on-demand service adapter
//!
//! The broker hands the adapter a service plan, the candidate releases and
//! the state of any previous deployment. The adapter answers with a complete
//! deployment manifest, or with binding credentials for a finished deployment.
//! This crate holds the shapes of those inputs and outputs; the logic lives in
//! `redis-adapter`.
//!
//! ## Key Concepts
//!
//! - **Plan**: Abstract description of what a service instance looks like
//! - **ServiceDeployment**: Deployment name, stemcells and candidate releases
//! - **Manifest**: The deployment descriptor applied by the orchestrator
//! - **PropertyValue**: Closed value type for free-form property blocks
//! - **Binding**: Credentials handed to an application on bind

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod binding;
pub mod manifest;
pub mod params;
pub mod plan;
pub mod property;

// Re-export main types
pub use binding::{Binding, Credentials, DashboardUrl};
pub use manifest::{
    CustomProviderDefinition, Features, InstanceGroup, Job, Lifecycle, Manifest,
    ManifestRelease, ManifestStemcell, Migration, Network, ProvidesLink, UpdatePolicy, Variable,
    VariableConsumes, VariableConsumesLink,
};
pub use params::{
    CreateBindingParams, DashboardUrlParams, DeleteBindingParams, GenerateManifestOutput,
    GenerateManifestParams,
};
pub use plan::{
    Errand, LifecycleErrands, Plan, PlanInstanceGroup, PlanUpdate, RequestParameters,
    ServiceDeployment, ServiceRelease, Stemcell,
};
pub use property::{Properties, PropertyValue};

use std::collections::BTreeMap;

/// Secrets the broker must persist after a successful generate call
pub type ManagedSecrets = BTreeMap<String, String>;

/// Resolved values keyed by the placeholder reference they replace
pub type ManifestSecrets = BTreeMap<String, String>;

/// Additional configuration blobs keyed by config type (e.g. `cloud`)
pub type BoshConfigs = BTreeMap<String, String>;

/// Instance addresses of a running deployment, keyed by instance group
pub type DeploymentTopology = BTreeMap<String, Vec<String>>;

/// DNS aliases resolved by the broker, keyed by alias name
pub type DnsAddresses = BTreeMap<String, String>;
