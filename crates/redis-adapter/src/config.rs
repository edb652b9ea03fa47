//! Adapter configuration
//!
//! Read once from a YAML file before any operation runs.

use crate::constants::DEFAULT_SERVICE_INSTANCE_GROUP;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error};

/// Errors loading the configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Error, could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error, could not parse config YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Operator configuration of the adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Name of the plan instance group running the service
    #[serde(
        rename = "redis_instance_group_name",
        default = "default_service_instance_group_name"
    )]
    pub service_instance_group_name: String,

    /// Always emit a fresh managed secret reference, even on update
    #[serde(default)]
    pub ignore_odb_managed_secret_on_update: bool,

    /// Store plan secrets in the secret store instead of the manifest
    #[serde(default)]
    pub secure_manifests_enabled: bool,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            service_instance_group_name: default_service_instance_group_name(),
            ignore_odb_managed_secret_on_update: false,
            secure_manifests_enabled: false,
        }
    }
}

impl AdapterConfig {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading adapter config");

        let content = std::fs::read_to_string(path).map_err(|source| {
            let err = ConfigError::Read {
                path: path.to_path_buf(),
                source,
            };
            error!("{}", err);
            err
        })?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// An empty document yields the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(yaml).map_err(|e| {
            let err = ConfigError::Parse(e);
            error!("{}", err);
            err
        })
    }

    pub fn with_service_instance_group_name(mut self, name: impl Into<String>) -> Self {
        self.service_instance_group_name = name.into();
        self
    }

    pub fn with_secure_manifests(mut self, enabled: bool) -> Self {
        self.secure_manifests_enabled = enabled;
        self
    }

    pub fn with_ignore_odb_managed_secret_on_update(mut self, ignore: bool) -> Self {
        self.ignore_odb_managed_secret_on_update = ignore;
        self
    }
}

fn default_service_instance_group_name() -> String {
    DEFAULT_SERVICE_INSTANCE_GROUP.to_string()
}
