//! Error types for manifest generation and binding
//!
//! Errors fall into two classes. Caller-actionable errors carry a message the
//! end user can act on. Operator-diagnostic errors describe configuration
//! problems: their detail is logged for the operator and the caller only sees
//! an opaque message.

use crate::config::ConfigError;
use thiserror::Error;
use tracing::error;

/// Errors returned by the adapter operations
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Request carried parameters outside the allow-list
    #[error("unsupported parameter(s) for this service plan: {}", .0.join(", "))]
    UnsupportedParameters(Vec<String>),

    /// A recognised request parameter had the wrong type
    #[error("parameter '{name}' must be {expected}")]
    InvalidParameter { name: String, expected: &'static str },

    #[error("{0} is not a valid BOSH release version")]
    InvalidVersion(String),

    #[error("no release provided for job {0}")]
    NoReleaseForJob(String),

    #[error("job {job} defined in multiple releases: {}", .releases.join(", "))]
    AmbiguousJobOwnership { job: String, releases: Vec<String> },

    #[error("no release with name {0} found in previous manifest")]
    MissingPreviousRelease(String),

    #[error("error generating manifest: new release version {new} is lower than existing release version {old}")]
    Downgrade { old: String, new: String },

    #[error("could not parse vm extensions config: {0}")]
    InvalidVmExtensionsConfig(String),

    #[error("could not generate password: {0}")]
    PasswordGeneration(String),

    #[error("could not find path for {0}")]
    MissingSecretPath(String),

    #[error("expecting a credhub ref string with format ((xxx)), but got: {0}")]
    MalformedSecretReference(String),

    #[error("manifest wasn't correctly interpolated: missing value for `{0}`")]
    UnresolvedSecret(String),

    #[error("The required secret was not provided to DeleteBinding")]
    MissingBindingSecret,

    /// The binding credential failed the re-authentication check
    #[error("The incorrect secret value was provided to DeleteBinding")]
    InvalidBindingSecret,

    #[error("DeleteBinding received secrets when secure manifests are disabled")]
    UnexpectedBindingSecrets,

    /// A required plan property is absent (operator-diagnostic)
    #[error("")]
    MissingPlanProperty(String),

    /// The plan does not match the adapter configuration (operator-diagnostic)
    #[error("Contact your operator, service configuration issue occurred")]
    ServiceConfiguration(String),

    /// Deployed topology does not have the expected shape (operator-diagnostic)
    #[error("")]
    UnexpectedTopology(String),

    /// A plan or manifest property has the wrong type (operator-diagnostic)
    #[error("")]
    PropertyTypeMismatch {
        property: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl AdapterError {
    /// Whether the caller sees an opaque message for this error
    pub fn is_operator_facing(&self) -> bool {
        self.operator_detail().is_some()
    }

    /// Detail logged for the operator; `None` for caller-actionable errors
    pub fn operator_detail(&self) -> Option<String> {
        match self {
            AdapterError::MissingPlanProperty(property) => {
                Some(format!("the plan property '{}' is missing", property))
            }
            AdapterError::ServiceConfiguration(detail) | AdapterError::UnexpectedTopology(detail) => {
                Some(detail.clone())
            }
            AdapterError::PropertyTypeMismatch {
                property,
                expected,
                found,
            } => Some(format!(
                "the property '{}' must be {}, found {}",
                property, expected, found
            )),
            _ => None,
        }
    }

    pub(crate) fn missing_plan_property(property: &str) -> Self {
        AdapterError::MissingPlanProperty(property.to_string()).logged()
    }

    pub(crate) fn service_configuration(detail: impl Into<String>) -> Self {
        AdapterError::ServiceConfiguration(detail.into()).logged()
    }

    pub(crate) fn unexpected_topology(detail: impl Into<String>) -> Self {
        AdapterError::UnexpectedTopology(detail.into()).logged()
    }

    pub(crate) fn type_mismatch(
        property: impl Into<String>,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        AdapterError::PropertyTypeMismatch {
            property: property.into(),
            expected,
            found,
        }
        .logged()
    }

    /// Emit the operator-facing description of this error
    pub(crate) fn logged(self) -> Self {
        match self.operator_detail() {
            Some(detail) => error!("{}", detail),
            None => error!("{}", self),
        }
        self
    }
}

/// Result type for adapter operations
pub type Result<T> = std::result::Result<T, AdapterError>;
