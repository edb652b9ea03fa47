//! Secret references and the secret lifecycle
//!
//! Secrets never appear in a generated manifest as plaintext. The manifest
//! carries `((name))` placeholders instead, which the orchestrator or the
//! broker resolves at deploy time. Plan-supplied secrets are handed back to
//! the broker as managed secrets under a freshly minted key, unless the
//! previous deployment already stores the same value, in which case the old
//! reference is kept.

use crate::constants::ODB_SECRET_PREFIX;
use crate::error::{AdapterError, Result};
use redis_adapter_types::{ManagedSecrets, ManifestSecrets, Properties, PropertyValue};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info};
use uuid::Uuid;

static PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(\(([^()]+)\)\)$").expect("placeholder pattern is valid"));

/// Length of the random suffix appended to minted secret keys
pub const SECRET_KEY_SUFFIX_LEN: usize = 6;

/// `((name))`
pub fn placeholder(name: &str) -> String {
    format!("(({}))", name)
}

/// `((odb_secret:key))`, resolved by the broker from its secret store
pub fn odb_secret_placeholder(key: &str) -> String {
    placeholder(&format!("{}:{}", ODB_SECRET_PREFIX, key))
}

/// Extract the name from a `((name))` reference
///
/// The whole string must be a single reference with a non-empty name.
pub fn parse_placeholder(raw: &str) -> Result<&str> {
    PLACEHOLDER_PATTERN
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| AdapterError::MalformedSecretReference(raw.to_string()))
}

/// A kind of plan-supplied secret handled by the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretClass {
    /// Plan property carrying the plaintext
    pub name: &'static str,

    /// Service property receiving the reference
    pub property_key: &'static str,

    /// Prefix of the secret-store key minted for a new value
    pub store_key_prefix: &'static str,
}

/// Secret classes reconciled on every generate call
pub const SECRET_CLASSES: &[SecretClass] = &[SecretClass {
    name: "plan_secret",
    property_key: "plan_secret",
    store_key_prefix: "plan_secret_key",
}];

/// Fresh secret-store key for `class`
pub fn mint_store_key(class: &SecretClass) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}{}", class.store_key_prefix, &suffix[..SECRET_KEY_SUFFIX_LEN])
}

/// Inputs the reconciler compares against
#[derive(Debug, Clone, Copy, Default)]
pub struct PreviousSecretState<'a> {
    /// Service property block of the previous manifest
    pub properties: Option<&'a Properties>,

    /// Values resolved for the previous manifest's references
    pub secrets: Option<&'a ManifestSecrets>,
}

/// Decide the reference for every secret class the plan supplies
///
/// Returns the service properties to set (property key to reference) and
/// records newly minted secrets in `managed`.
pub fn reconcile_secret_classes(
    plan_properties: &Properties,
    previous: PreviousSecretState<'_>,
    managed: &mut ManagedSecrets,
) -> Result<Properties> {
    let mut references = Properties::new();

    for class in SECRET_CLASSES {
        let Some(value) = plan_properties.get(class.name) else {
            debug!(class = class.name, "Plan supplies no secret for class");
            continue;
        };
        let plaintext = value
            .as_str()
            .ok_or_else(|| AdapterError::type_mismatch(class.name, "a string", value.kind()))?;

        let reference = match reusable_reference(class, plaintext, previous)? {
            Some(existing) => {
                debug!(class = class.name, reference = %existing, "Reusing secret reference");
                existing
            }
            None => {
                let key = mint_store_key(class);
                info!(class = class.name, key = %key, "Minted new secret reference");
                managed.insert(key.clone(), plaintext.to_string());
                odb_secret_placeholder(&key)
            }
        };

        references.insert(class.property_key.to_string(), PropertyValue::String(reference));
    }

    Ok(references)
}

fn reusable_reference(
    class: &SecretClass,
    plaintext: &str,
    previous: PreviousSecretState<'_>,
) -> Result<Option<String>> {
    let (Some(snapshot), Some(properties)) = (previous.secrets, previous.properties) else {
        return Ok(None);
    };
    let Some(existing) = properties.get(class.property_key) else {
        return Ok(None);
    };
    let existing = existing
        .as_str()
        .ok_or_else(|| AdapterError::type_mismatch(class.property_key, "a string", existing.kind()))?;

    Ok((snapshot.get(existing).map(String::as_str) == Some(plaintext)).then(|| existing.to_string()))
}
