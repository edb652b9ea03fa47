//! Service plan and deployment inputs
//!
//! These are the broker-side descriptions the adapter turns into a manifest.

use crate::manifest::{Lifecycle, Migration};
use crate::property::{Properties, PropertyValue};
use serde::{Deserialize, Serialize};

/// Deployment-wide facts supplied by the broker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceDeployment {
    /// Name of the deployment to generate
    pub deployment_name: String,

    /// Releases that may provide jobs for this deployment
    #[serde(default)]
    pub releases: Vec<ServiceRelease>,

    /// Stemcells available to the deployment
    #[serde(default)]
    pub stemcells: Vec<Stemcell>,
}

/// A candidate release package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRelease {
    pub name: String,

    /// Raw version string, parsed only when an upgrade is checked
    pub version: String,

    /// Names of the jobs this release provides
    #[serde(default)]
    pub jobs: Vec<String>,
}

impl ServiceRelease {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            jobs: Vec::new(),
        }
    }

    pub fn with_jobs<I, S>(mut self, jobs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.jobs = jobs.into_iter().map(Into::into).collect();
        self
    }

    /// Check whether this release provides the given job
    pub fn provides(&self, job: &str) -> bool {
        self.jobs.iter().any(|j| j == job)
    }
}

/// Stemcell reference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stemcell {
    #[serde(rename = "stemcell_os")]
    pub os: String,

    #[serde(rename = "stemcell_version")]
    pub version: String,
}

/// Abstract service plan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Instance group templates, in declaration order
    #[serde(default)]
    pub instance_groups: Vec<PlanInstanceGroup>,

    /// Arbitrary plan properties
    #[serde(default)]
    pub properties: Properties,

    /// Explicit update policy; a default is synthesized when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<PlanUpdate>,

    /// Errands run around deploy and delete
    #[serde(default)]
    pub lifecycle_errands: LifecycleErrands,
}

impl Plan {
    /// Find an instance group template by name
    pub fn instance_group(&self, name: &str) -> Option<&PlanInstanceGroup> {
        self.instance_groups.iter().find(|ig| ig.name == name)
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }
}

/// Instance group template declared by a plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanInstanceGroup {
    pub name: String,

    #[serde(default)]
    pub vm_type: String,

    #[serde(default)]
    pub vm_extensions: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent_disk_type: Option<String>,

    /// Network names the group attaches to
    #[serde(default)]
    pub networks: Vec<String>,

    /// Availability zones
    #[serde(default)]
    pub azs: Vec<String>,

    /// Number of instances
    #[serde(default)]
    pub instances: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle: Option<Lifecycle>,

    /// Groups this one was renamed from
    #[serde(default)]
    pub migrated_from: Vec<Migration>,
}

/// Update policy supplied by a plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanUpdate {
    pub canaries: u32,
    pub max_in_flight: u32,
    pub canary_watch_time: String,
    pub update_watch_time: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<bool>,
}

/// Lifecycle errands attached to a plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleErrands {
    #[serde(default)]
    pub post_deploy: Vec<Errand>,

    #[serde(default)]
    pub pre_delete: Vec<Errand>,
}

/// A single errand and the instances it targets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Errand {
    pub name: String,

    /// Instance targets; empty means the errand runs on its own VM
    #[serde(default)]
    pub instances: Vec<String>,
}

impl Errand {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instances: Vec::new(),
        }
    }

    pub fn on_instances<I, S>(mut self, instances: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instances = instances.into_iter().map(Into::into).collect();
        self
    }
}

/// Caller context of a provision/update/bind request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestParameters {
    /// Arbitrary parameters supplied by the end user
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub parameters: Properties,

    /// Platform context (e.g. `{"platform": "cloudfoundry"}`)
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub context: Properties,

    /// Any other request fields
    #[serde(flatten)]
    pub extra: Properties,
}

impl RequestParameters {
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.context
            .insert("platform".to_string(), PropertyValue::String(platform.into()));
        self
    }

    pub fn arbitrary_params(&self) -> &Properties {
        &self.parameters
    }

    pub fn arbitrary_context(&self) -> &Properties {
        &self.context
    }

    /// Platform named by the request context, if any
    pub fn platform(&self) -> Option<&str> {
        self.context.get("platform").and_then(PropertyValue::as_str)
    }
}
