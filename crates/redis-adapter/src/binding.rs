//! Credential binding
//!
//! Binding is read-only over an already deployed instance: the address comes
//! from the deployment topology, the password from the deployed manifest, and
//! secret values from the map the broker resolved for the manifest's
//! references.

use crate::config::AdapterConfig;
use crate::constants::{
    GENERATED_SECRET_KEY, GENERATED_SECRET_VARIABLE, MANAGED_SECRET_KEY, SERVICE_PORT,
    SERVICE_PROPERTIES_KEY,
};
use crate::error::{AdapterError, Result};
use crate::generator::log_platform;
use crate::properties::service_block;
use crate::secrets::{parse_placeholder, placeholder};
use redis_adapter_types::{
    Binding, CreateBindingParams, Credentials, DeleteBindingParams, DeploymentTopology,
    ManifestSecrets, Properties, PropertyValue,
};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// A service property holding a secret reference the binding resolves
#[derive(Debug, Clone, Copy)]
struct SecretField {
    name: &'static str,
    /// Skipped when the manifest carries no reference
    optional: bool,
}

const SECRET_FIELDS: &[SecretField] = &[
    SecretField { name: GENERATED_SECRET_KEY, optional: false },
    SecretField { name: MANAGED_SECRET_KEY, optional: false },
    SecretField { name: "ca_cert", optional: false },
    SecretField { name: "private_key", optional: false },
    SecretField { name: "certificate", optional: false },
    SecretField { name: "secret", optional: true },
    SecretField { name: "plan_secret", optional: true },
];

/// Creates and removes bindings to service instances
#[derive(Debug, Clone, Default)]
pub struct Binder {
    config: AdapterConfig,
}

impl Binder {
    pub fn new(config: AdapterConfig) -> Self {
        Self { config }
    }

    /// Produce connection credentials for a deployed instance
    #[instrument(skip(self, params), fields(binding_id = %params.binding_id))]
    pub fn create_binding(&self, params: CreateBindingParams) -> Result<Binding> {
        log_platform(&params.request_params);

        let group_name = &self.config.service_instance_group_name;
        let host = service_host(&params.deployment_topology, group_name)?;

        let block = service_block(&params.manifest, group_name)?.ok_or_else(|| {
            AdapterError::type_mismatch(SERVICE_PROPERTIES_KEY, "a map", "absent")
        })?;
        let password = match block.get("password") {
            Some(PropertyValue::String(password)) => password.clone(),
            other => {
                return Err(AdapterError::type_mismatch(
                    "password",
                    "a string",
                    other.map_or("absent", PropertyValue::kind),
                ))
            }
        };

        let mut field_values: BTreeMap<&str, String> = BTreeMap::new();
        let mut resolved = ManifestSecrets::new();
        if let Some(secrets) = &params.secrets {
            for field in SECRET_FIELDS {
                let Some((reference, value)) = resolve_field(block, field, secrets)? else {
                    continue;
                };
                field_values.insert(field.name, value.clone());
                resolved.insert(reference, value);
            }
        }

        info!(host = %host, resolved_secrets = resolved.len(), "Created binding");

        Ok(Binding {
            credentials: Credentials {
                host,
                port: SERVICE_PORT,
                password,
                generated_secret: field_values.remove(GENERATED_SECRET_KEY),
                odb_managed_secret: field_values.remove(MANAGED_SECRET_KEY),
                plan_secret: field_values.remove("plan_secret"),
                secret: field_values.remove("secret"),
                dns_addresses: params.dns_addresses.unwrap_or_default(),
                passed_in_secrets: params.secrets,
                expected_resolved_secrets: resolved,
            },
        })
    }

    /// Validate the credential presented when a binding is removed
    #[instrument(skip(self, params), fields(binding_id = %params.binding_id))]
    pub fn delete_binding(&self, params: DeleteBindingParams) -> Result<()> {
        let dns_addresses = params.dns_addresses.unwrap_or_default();
        let dns_json = serde_json::to_string(&dns_addresses).unwrap_or_default();
        info!(dns_addresses = %dns_json, "Deleting binding");

        let secrets = params.secrets.unwrap_or_default();

        if !self.config.secure_manifests_enabled {
            if !secrets.is_empty() {
                return Err(AdapterError::UnexpectedBindingSecrets.logged());
            }
            return Ok(());
        }

        let reference = placeholder(GENERATED_SECRET_VARIABLE);
        match secrets.get(&reference) {
            None => Err(AdapterError::MissingBindingSecret.logged()),
            // Any non-empty value passes the login check
            Some(value) if value.is_empty() => Err(AdapterError::InvalidBindingSecret.logged()),
            Some(_) => {
                debug!("Binding secret accepted");
                Ok(())
            }
        }
    }
}

/// The single address of the service group
fn service_host(topology: &DeploymentTopology, group_name: &str) -> Result<String> {
    if topology.len() != 1 {
        return Err(AdapterError::unexpected_topology(format!(
            "expected 1 instance group in the Redis deployment, got {}",
            topology.len()
        )));
    }

    match topology.get(group_name).map(Vec::as_slice) {
        Some([address]) => Ok(address.clone()),
        other => Err(AdapterError::unexpected_topology(format!(
            "expected {} instance group to have only 1 instance, got {}",
            group_name,
            other.map_or(0, <[String]>::len)
        ))),
    }
}

/// Look up one secret field; `None` when an optional field has no reference
fn resolve_field(
    block: &Properties,
    field: &SecretField,
    secrets: &ManifestSecrets,
) -> Result<Option<(String, String)>> {
    let reference = block
        .get(field.name)
        .and_then(PropertyValue::as_str)
        .filter(|r| !r.is_empty());

    let Some(reference) = reference else {
        if field.optional {
            debug!(field = field.name, "No reference for optional secret");
            return Ok(None);
        }
        return Err(AdapterError::MissingSecretPath(field.name.to_string()).logged());
    };

    parse_placeholder(reference).map_err(AdapterError::logged)?;

    match secrets.get(reference).filter(|v| !v.is_empty()) {
        Some(value) => Ok(Some((reference.to_string(), value.clone()))),
        None => Err(AdapterError::UnresolvedSecret(reference.to_string()).logged()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topology(addresses: &[&str]) -> DeploymentTopology {
        let mut topology = DeploymentTopology::new();
        topology.insert(
            "redis-server".into(),
            addresses.iter().map(|a| a.to_string()).collect(),
        );
        topology
    }

    #[test]
    fn host_needs_exactly_one_instance() {
        assert_eq!(service_host(&topology(&["10.0.0.1"]), "redis-server").unwrap(), "10.0.0.1");

        let err = service_host(&topology(&[]), "redis-server").unwrap_err();
        assert_eq!(
            err.operator_detail().as_deref(),
            Some("expected redis-server instance group to have only 1 instance, got 0")
        );

        let err = service_host(&topology(&["a", "b"]), "redis-server").unwrap_err();
        assert_eq!(
            err.operator_detail().as_deref(),
            Some("expected redis-server instance group to have only 1 instance, got 2")
        );
        assert_eq!(err.to_string(), "");
    }

    #[test]
    fn host_needs_exactly_one_group() {
        let err = service_host(&DeploymentTopology::new(), "redis-server").unwrap_err();
        assert_eq!(
            err.operator_detail().as_deref(),
            Some("expected 1 instance group in the Redis deployment, got 0")
        );

        let mut two = topology(&["10.0.0.1"]);
        two.insert("health-check".into(), vec![]);
        let err = service_host(&two, "redis-server").unwrap_err();
        assert_eq!(
            err.operator_detail().as_deref(),
            Some("expected 1 instance group in the Redis deployment, got 2")
        );
    }

    #[test]
    fn optional_field_without_reference_is_skipped() {
        let block = Properties::new();
        let field = SecretField { name: "secret", optional: true };
        assert!(resolve_field(&block, &field, &ManifestSecrets::new())
            .unwrap()
            .is_none());

        let field = SecretField { name: "ca_cert", optional: false };
        let err = resolve_field(&block, &field, &ManifestSecrets::new()).unwrap_err();
        assert_eq!(err.to_string(), "could not find path for ca_cert");
    }

    #[test]
    fn empty_secret_value_is_unresolved() {
        let mut block = Properties::new();
        block.insert("generated_secret".into(), "((secret_pass))".into());
        let mut secrets = ManifestSecrets::new();
        secrets.insert("((secret_pass))".into(), String::new());

        let field = SecretField { name: "generated_secret", optional: false };
        let err = resolve_field(&block, &field, &secrets).unwrap_err();
        assert_eq!(
            err.to_string(),
            "manifest wasn't correctly interpolated: missing value for `((secret_pass))`"
        );
    }
}
