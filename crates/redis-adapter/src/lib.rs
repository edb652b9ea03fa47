//! Redis Service Adapter
//!
//! Generates deployment manifests for on-demand Redis service instances and
//! turns deployed instances into connection credentials.
//!
//! ## Responsibilities
//!
//! - `generator` owns: the generate-manifest operation, from request
//!   validation to the final manifest, managed secrets and configs
//! - `properties` / `secrets` own: the service job property block and the
//!   reuse-or-mint decision for plan secrets
//! - `topology` owns: instance groups, errands, update policy, variables
//! - `binding` owns: create-binding and delete-binding
//!
//! ## Errors
//!
//! Every operation returns [`Result`]. Configuration problems are logged for
//! the operator and surface to the caller as an opaque message; request
//! mistakes carry a message the caller can act on. See [`AdapterError`].
//!
//! ## Usage
//!
//! ```no_run
//! use redis_adapter::{AdapterConfig, ManifestGenerator};
//! use redis_adapter_types::GenerateManifestParams;
//!
//! # fn example(params: GenerateManifestParams) -> redis_adapter::Result<()> {
//! let config = AdapterConfig::load("/var/vcap/jobs/service-adapter/config/service-adapter.conf")?;
//! let output = ManifestGenerator::new(config).generate_manifest(params)?;
//! println!("{}", output.manifest.name);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod binding;
pub mod config;
pub mod constants;
pub mod dashboard;
pub mod error;
pub mod generator;
pub mod parameters;
pub mod password;
pub mod properties;
pub mod releases;
pub mod secrets;
pub mod topology;
pub mod version;

// Re-exports
pub use binding::Binder;
pub use config::{AdapterConfig, ConfigError};
pub use dashboard::DashboardGenerator;
pub use error::{AdapterError, Result};
pub use generator::ManifestGenerator;
pub use parameters::ArbitraryParameters;
pub use password::{PasswordGenerator, RandomPasswordGenerator};
pub use properties::ServiceProperties;
pub use secrets::{SecretClass, SECRET_CLASSES};
pub use version::ReleaseVersion;
