//! Validation of the arbitrary parameters supplied by the end user

use crate::constants::{
    MANAGED_SECRET_KEY, MAX_CLIENTS_PARAMETER, SECRET_PATH_PARAMETER,
    VM_EXTENSIONS_CONFIG_PARAMETER,
};
use crate::error::{AdapterError, Result};
use redis_adapter_types::{Properties, PropertyValue};

/// Parameter keys a plan accepts
pub const SUPPORTED_PARAMETERS: [&str; 4] = [
    MAX_CLIENTS_PARAMETER,
    SECRET_PATH_PARAMETER,
    MANAGED_SECRET_KEY,
    VM_EXTENSIONS_CONFIG_PARAMETER,
];

/// Typed view of the recognised request parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArbitraryParameters {
    /// Connection limit override
    pub max_clients: Option<i64>,

    /// Secret-store path for the ad-hoc `secret` property
    pub secret_path: Option<String>,

    /// Replacement value for the managed secret
    pub managed_secret: Option<String>,

    /// Cloud-config document declaring extra VM extensions
    pub vm_extensions_config: Option<String>,
}

impl ArbitraryParameters {
    /// Validate and decode the parameter map
    ///
    /// Unknown keys are rejected together, before any type check runs.
    pub fn from_request(params: &Properties) -> Result<Self> {
        let unsupported: Vec<String> = params
            .keys()
            .filter(|k| !SUPPORTED_PARAMETERS.contains(&k.as_str()))
            .cloned()
            .collect();
        if !unsupported.is_empty() {
            return Err(AdapterError::UnsupportedParameters(unsupported));
        }

        let max_clients = params
            .get(MAX_CLIENTS_PARAMETER)
            .map(|v| match v {
                PropertyValue::Integer(i) => Ok(*i),
                // JSON numbers arrive as floats; the fraction is dropped
                PropertyValue::Float(f) => Ok(f.trunc() as i64),
                _ => Err(invalid(MAX_CLIENTS_PARAMETER, "a number")),
            })
            .transpose()?;

        Ok(Self {
            max_clients,
            secret_path: string_param(params, SECRET_PATH_PARAMETER)?,
            managed_secret: string_param(params, MANAGED_SECRET_KEY)?,
            vm_extensions_config: string_param(params, VM_EXTENSIONS_CONFIG_PARAMETER)?
                .filter(|c| !c.is_empty()),
        })
    }
}

fn string_param(params: &Properties, name: &str) -> Result<Option<String>> {
    params
        .get(name)
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid(name, "a string"))
        })
        .transpose()
}

fn invalid(name: &str, expected: &'static str) -> AdapterError {
    AdapterError::InvalidParameter {
        name: name.to_string(),
        expected,
    }
}
