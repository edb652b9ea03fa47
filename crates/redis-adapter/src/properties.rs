//! Service job property reconciliation
//!
//! Computes the `redis` property block of the service job from the plan, the
//! request parameters and the block of the previous deployment. Values read
//! back from a previous manifest go through an explicit decode step: a value
//! of the wrong type is a [`PropertyTypeMismatch`](AdapterError::PropertyTypeMismatch),
//! never a silently recomputed default.

use crate::constants::{
    CERTIFICATE_VARIABLE, DEFAULT_MAX_CLIENTS, GENERATED_SECRET_KEY, GENERATED_SECRET_VARIABLE,
    MANAGED_SECRET_KEY, PERSISTENCE_PROPERTY, SERVICE_JOB_NAME, SERVICE_PROPERTIES_KEY,
};
use crate::error::{AdapterError, Result};
use crate::parameters::ArbitraryParameters;
use crate::password::PasswordGenerator;
use crate::secrets::{self, PreviousSecretState};
use redis_adapter_types::{ManagedSecrets, Manifest, ManifestSecrets, Properties, PropertyValue};
use tracing::debug;

const PASSWORD_PROPERTY: &str = "password";
const MAX_CLIENTS_PROPERTY: &str = "maxclients";
const SECRET_PROPERTY: &str = "secret";

/// Property block of the service job
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceProperties {
    pub persistence: bool,
    pub password: String,
    pub max_clients: i64,

    /// Reference to the orchestrator-generated password variable
    pub generated_secret: String,

    /// Managed secret: a literal carried over, or a broker reference
    pub managed_secret: String,

    pub ca_cert: String,
    pub certificate: String,
    pub private_key: String,

    /// References of reconciled secret classes, keyed by property
    pub secret_references: Properties,

    /// Ad-hoc secret, if requested now or present before
    pub secret: Option<PropertyValue>,
}

impl ServiceProperties {
    /// The job properties: `{"redis": {...}}`
    pub fn to_properties(&self) -> Properties {
        let mut block = Properties::new();
        block.insert(
            PERSISTENCE_PROPERTY.into(),
            (if self.persistence { "yes" } else { "no" }).into(),
        );
        block.insert(PASSWORD_PROPERTY.into(), self.password.clone().into());
        block.insert(MAX_CLIENTS_PROPERTY.into(), self.max_clients.into());
        block.insert(GENERATED_SECRET_KEY.into(), self.generated_secret.clone().into());
        block.insert(MANAGED_SECRET_KEY.into(), self.managed_secret.clone().into());
        block.insert("ca_cert".into(), self.ca_cert.clone().into());
        block.insert("certificate".into(), self.certificate.clone().into());
        block.insert("private_key".into(), self.private_key.clone().into());
        block.extend(self.secret_references.clone());
        if let Some(secret) = &self.secret {
            block.insert(SECRET_PROPERTY.into(), secret.clone());
        }

        let mut properties = Properties::new();
        properties.insert(SERVICE_PROPERTIES_KEY.into(), PropertyValue::Map(block));
        properties
    }
}

/// Locate the service property block of a deployed manifest
///
/// Looks at the configured service group (or the first group), then its
/// service job (or first job), falling back to group-level properties.
/// Returns `None` when no block exists.
pub fn service_block<'a>(manifest: &'a Manifest, group_name: &str) -> Result<Option<&'a Properties>> {
    let Some(group) = manifest
        .instance_group(group_name)
        .or_else(|| manifest.instance_groups.first())
    else {
        return Ok(None);
    };

    let from_job = group
        .job(SERVICE_JOB_NAME)
        .or_else(|| group.jobs.first())
        .and_then(|job| job.properties.get(SERVICE_PROPERTIES_KEY));

    match from_job.or_else(|| group.properties.get(SERVICE_PROPERTIES_KEY)) {
        None => Ok(None),
        Some(PropertyValue::Map(block)) => Ok(Some(block)),
        Some(other) => Err(AdapterError::type_mismatch(
            SERVICE_PROPERTIES_KEY,
            "a map",
            other.kind(),
        )),
    }
}

/// Everything the reconciler reads
#[derive(Debug, Clone, Copy)]
pub struct ReconcileInputs<'a> {
    pub plan_properties: &'a Properties,
    pub params: &'a ArbitraryParameters,

    /// Service block of the previous manifest
    pub previous: Option<&'a Properties>,

    pub previous_secrets: Option<&'a ManifestSecrets>,

    pub ignore_managed_secret: bool,
    pub secure_manifests: bool,
}

/// Compute the service property block
///
/// Newly minted secrets are added to `managed`.
pub fn reconcile(
    inputs: ReconcileInputs<'_>,
    passwords: &dyn PasswordGenerator,
    managed: &mut ManagedSecrets,
) -> Result<ServiceProperties> {
    let persistence = persistence(inputs.plan_properties)?;
    let password = password(inputs.previous, passwords)?;
    let managed_secret = managed_secret(inputs.previous, inputs.ignore_managed_secret);
    let max_clients = max_clients(inputs.params, inputs.previous)?;

    let secret_references = if inputs.secure_manifests {
        secrets::reconcile_secret_classes(
            inputs.plan_properties,
            PreviousSecretState {
                properties: inputs.previous,
                secrets: inputs.previous_secrets,
            },
            managed,
        )?
    } else {
        Properties::new()
    };

    let secret = match &inputs.params.secret_path {
        Some(path) => Some(PropertyValue::String(secrets::placeholder(path))),
        None => inputs
            .previous
            .and_then(|block| block.get(SECRET_PROPERTY))
            .cloned(),
    };

    Ok(ServiceProperties {
        persistence,
        password,
        max_clients,
        generated_secret: secrets::placeholder(GENERATED_SECRET_VARIABLE),
        managed_secret,
        ca_cert: secrets::placeholder(&format!("{}.ca", CERTIFICATE_VARIABLE)),
        certificate: secrets::placeholder(&format!("{}.certificate", CERTIFICATE_VARIABLE)),
        private_key: secrets::placeholder(&format!("{}.private_key", CERTIFICATE_VARIABLE)),
        secret_references,
        secret,
    })
}

fn persistence(plan_properties: &Properties) -> Result<bool> {
    match plan_properties.get(PERSISTENCE_PROPERTY) {
        None => Err(AdapterError::missing_plan_property(PERSISTENCE_PROPERTY)),
        Some(PropertyValue::Bool(enabled)) => Ok(*enabled),
        Some(other) => Err(AdapterError::type_mismatch(
            PERSISTENCE_PROPERTY,
            "a boolean",
            other.kind(),
        )),
    }
}

fn password(previous: Option<&Properties>, passwords: &dyn PasswordGenerator) -> Result<String> {
    let Some(block) = previous else {
        debug!("Generating a new service password");
        return passwords.generate();
    };

    match block.get(PASSWORD_PROPERTY) {
        Some(PropertyValue::String(password)) => Ok(password.clone()),
        Some(other) => Err(AdapterError::type_mismatch(
            PASSWORD_PROPERTY,
            "a string",
            other.kind(),
        )),
        None => Err(AdapterError::type_mismatch(
            PASSWORD_PROPERTY,
            "a string",
            "absent",
        )),
    }
}

fn managed_secret(previous: Option<&Properties>, ignore: bool) -> String {
    let carried = previous
        .filter(|_| !ignore)
        .and_then(|block| block.get(MANAGED_SECRET_KEY))
        .and_then(PropertyValue::as_str);

    match carried {
        Some(value) => value.to_string(),
        None => secrets::odb_secret_placeholder(MANAGED_SECRET_KEY),
    }
}

fn max_clients(params: &ArbitraryParameters, previous: Option<&Properties>) -> Result<i64> {
    if let Some(requested) = params.max_clients {
        return Ok(requested);
    }

    match previous.and_then(|block| block.get(MAX_CLIENTS_PROPERTY)) {
        None => Ok(DEFAULT_MAX_CLIENTS),
        Some(PropertyValue::Integer(value)) => Ok(*value),
        Some(other) => Err(AdapterError::type_mismatch(
            MAX_CLIENTS_PROPERTY,
            "an integer",
            other.kind(),
        )),
    }
}
