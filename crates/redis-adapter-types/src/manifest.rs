//! Deployment manifest model
//!
//! A Manifest is the complete deployment descriptor the orchestrator applies.
//! The same type describes both the generated manifest and the previous,
//! already-applied one.

use crate::property::{Properties, PropertyValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete deployment descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,

    /// Releases (name and version only)
    #[serde(default)]
    pub releases: Vec<ManifestRelease>,

    #[serde(default)]
    pub stemcells: Vec<ManifestStemcell>,

    /// Instance groups in placement order
    #[serde(default)]
    pub instance_groups: Vec<InstanceGroup>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<UpdatePolicy>,

    /// Deployment-level properties
    #[serde(default)]
    pub properties: Properties,

    /// Variables the orchestrator generates and interpolates
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<Variable>,

    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub tags: Properties,

    #[serde(default, skip_serializing_if = "Features::is_empty")]
    pub features: Features,
}

impl Manifest {
    /// Find an instance group by name
    pub fn instance_group(&self, name: &str) -> Option<&InstanceGroup> {
        self.instance_groups.iter().find(|ig| ig.name == name)
    }

    /// Find a release by name
    pub fn release(&self, name: &str) -> Option<&ManifestRelease> {
        self.releases.iter().find(|r| r.name == name)
    }
}

/// Release reference in a manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRelease {
    pub name: String,
    pub version: String,
}

/// Stemcell bound to an alias
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestStemcell {
    pub alias: String,
    pub os: String,
    pub version: String,
}

/// Whether an instance group runs continuously or as a one-off errand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    Service,
    Errand,
}

/// A group of identical VMs and the jobs placed on them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceGroup {
    pub name: String,

    #[serde(default)]
    pub instances: u32,

    #[serde(default)]
    pub jobs: Vec<Job>,

    #[serde(default)]
    pub vm_type: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vm_extensions: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent_disk_type: Option<String>,

    /// Stemcell alias
    #[serde(default)]
    pub stemcell: String,

    #[serde(default)]
    pub networks: Vec<Network>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub azs: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle: Option<Lifecycle>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub migrated_from: Vec<Migration>,

    /// Group-level properties (used by errand groups)
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<UpdatePolicy>,
}

impl InstanceGroup {
    /// Find a job placed on this group by name
    pub fn job(&self, name: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.name == name)
    }
}

/// A job placed on an instance group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub name: String,

    /// Release providing the job
    pub release: String,

    /// Links this job provides to other deployments
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub provides: BTreeMap<String, ProvidesLink>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_provider_definitions: Vec<CustomProviderDefinition>,

    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
}

impl Job {
    pub fn new(name: impl Into<String>, release: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            release: release.into(),
            ..Default::default()
        }
    }

    /// Provide a link that other deployments can consume
    pub fn with_shared_provides_link(mut self, name: impl Into<String>) -> Self {
        self.provides.insert(
            name.into(),
            ProvidesLink {
                alias: None,
                shared: true,
            },
        );
        self
    }

    /// Define a custom link type exposed by this job
    pub fn with_custom_provider_definition(
        mut self,
        name: impl Into<String>,
        link_type: impl Into<String>,
    ) -> Self {
        self.custom_provider_definitions.push(CustomProviderDefinition {
            name: name.into(),
            link_type: link_type.into(),
            properties: Vec::new(),
        });
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }
}

/// A link provided by a job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvidesLink {
    #[serde(rename = "as", default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub shared: bool,
}

/// A custom link type declared by a job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomProviderDefinition {
    pub name: String,

    #[serde(rename = "type")]
    pub link_type: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<String>,
}

/// Network attachment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub static_ips: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default: Vec<String>,
}

impl Network {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Previous name of a renamed instance group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Migration {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub az: Option<String>,
}

impl Migration {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            az: None,
        }
    }
}

/// Rollout policy for a deployment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePolicy {
    pub canaries: u32,
    pub canary_watch_time: String,
    pub update_watch_time: String,
    pub max_in_flight: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_strategy: Option<String>,
}

/// A variable generated by the orchestrator (password, certificate, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_mode: Option<String>,

    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub options: Properties,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumes: Option<VariableConsumes>,
}

/// Links a variable consumes to fill in certificate names
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableConsumes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_name: Option<VariableConsumesLink>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_name: Option<VariableConsumesLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableConsumesLink {
    pub from: String,

    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
}

/// Deployment-level feature toggles
///
/// Unset fields are omitted entirely so the orchestrator falls back to its
/// own defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Features {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_dns_addresses: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_short_dns_addresses: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub randomize_az_placement: Option<bool>,

    /// Feature flags this model does not name explicitly
    #[serde(flatten)]
    pub extra: BTreeMap<String, PropertyValue>,
}

impl Features {
    pub fn is_empty(&self) -> bool {
        self.use_dns_addresses.is_none()
            && self.use_short_dns_addresses.is_none()
            && self.randomize_az_placement.is_none()
            && self.extra.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_links_serialize_in_manifest_shape() {
        let job = Job::new("redis-server", "redis")
            .with_custom_provider_definition("redis-server-link", "address")
            .with_shared_provides_link("redis");

        let yaml = serde_yaml::to_string(&job).unwrap();
        assert!(yaml.contains("shared: true"));
        assert!(yaml.contains("type: address"));
        assert!(!yaml.contains("properties"));
    }

    #[test]
    fn unset_features_are_omitted() {
        let manifest = Manifest {
            name: "d".into(),
            ..Default::default()
        };
        let yaml = serde_yaml::to_string(&manifest).unwrap();
        assert!(!yaml.contains("features"));

        let manifest = Manifest {
            features: Features {
                use_short_dns_addresses: Some(false),
                ..Default::default()
            },
            ..manifest
        };
        let yaml = serde_yaml::to_string(&manifest).unwrap();
        assert!(yaml.contains("use_short_dns_addresses: false"));
    }

    #[test]
    fn previous_manifest_yaml_round_trips_properties() {
        let manifest: Manifest = serde_yaml::from_str(
            r#"
name: some-instance-id
releases:
  - name: some-release-name
    version: "4"
instance_groups:
  - name: redis-server
    instances: 1
    jobs:
      - name: redis-server
        release: some-release-name
        properties:
          redis:
            password: some-password
            maxclients: 47
"#,
        )
        .unwrap();

        let job = manifest.instance_group("redis-server").unwrap().job("redis-server").unwrap();
        let redis = job.properties["redis"].as_map().unwrap();
        assert_eq!(redis["maxclients"].as_i64(), Some(47));
        assert_eq!(manifest.release("some-release-name").unwrap().version, "4");
    }
}
