//! Instance topology building blocks
//!
//! Pieces of the generated manifest that depend only on the plan and the
//! previous deployment: networks, update policy, errand placement,
//! variables, features and VM extensions.

use crate::constants::{
    ADDRESS_LINK_NAME, CERTIFICATE_VARIABLE, COLOCATED_ERRAND_PROPERTY,
    ERRAND_FAILURE_OVERRIDE_PROPERTY, ERRAND_SLEEP_PROPERTY, EXTRA_FEATURE_PROPERTY,
    GENERATED_SECRET_VARIABLE, SHORT_DNS_PROPERTY, STANDALONE_ERRANDS, STEMCELL_ALIAS,
};
use crate::error::{AdapterError, Result};
use crate::releases::gather_job;
use redis_adapter_types::{
    Features, InstanceGroup, Job, Lifecycle, Manifest, Network, Plan, PlanUpdate, Properties,
    PropertyValue, ServiceRelease, UpdatePolicy, Variable, VariableConsumes, VariableConsumesLink,
};
use serde::Deserialize;
use tracing::debug;

/// Watch window used by the synthesized update policy
pub const DEFAULT_WATCH_TIME: &str = "30000-240000";

pub const DEFAULT_VM_STRATEGY: &str = "delete-create";

/// Attach a group to each named network
pub fn networks(names: &[String]) -> Vec<Network> {
    names.iter().map(Network::named).collect()
}

/// Update policy for the generated manifest
///
/// A plan-supplied block is copied as is. Otherwise a default is synthesized,
/// rolling out one instance at a time when updating an existing deployment.
pub fn update_policy(plan_update: Option<&PlanUpdate>, has_previous: bool) -> UpdatePolicy {
    if let Some(update) = plan_update {
        return UpdatePolicy {
            canaries: update.canaries,
            canary_watch_time: update.canary_watch_time.clone(),
            update_watch_time: update.update_watch_time.clone(),
            max_in_flight: update.max_in_flight,
            serial: update.serial,
            vm_strategy: None,
        };
    }

    let parallelism = if has_previous { 1 } else { 4 };
    UpdatePolicy {
        canaries: parallelism,
        canary_watch_time: DEFAULT_WATCH_TIME.to_string(),
        update_watch_time: DEFAULT_WATCH_TIME.to_string(),
        max_in_flight: parallelism,
        serial: None,
        vm_strategy: Some(DEFAULT_VM_STRATEGY.to_string()),
    }
}

/// Test-support properties of a standalone errand group
pub fn errand_properties(errand: &str, plan_properties: &Properties) -> Properties {
    let override_applies = match plan_properties.get(ERRAND_FAILURE_OVERRIDE_PROPERTY) {
        Some(PropertyValue::Bool(enabled)) => *enabled,
        Some(PropertyValue::String(target)) => target == errand,
        _ => false,
    };

    let settings = if override_applies {
        Some(("systest-failure-override", PropertyValue::Bool(true)))
    } else {
        plan_properties
            .get(ERRAND_SLEEP_PROPERTY)
            .filter(|v| !v.is_null())
            .map(|sleep| ("systest-sleep", sleep.clone()))
    };

    let mut properties = Properties::new();
    if let Some((key, value)) = settings {
        let mut inner = Properties::new();
        inner.insert(key.to_string(), value);
        properties.insert(errand.to_string(), PropertyValue::Map(inner));
    }
    properties
}

/// Errand jobs placed on the service group itself
///
/// Only active when the plan sets `colocated_errand`. Pre-delete errands come
/// first; errands without instance targets run elsewhere and are skipped.
pub fn colocated_errand_jobs(plan: &Plan, releases: &[ServiceRelease]) -> Result<Vec<Job>> {
    if plan.property(COLOCATED_ERRAND_PROPERTY).and_then(PropertyValue::as_bool) != Some(true) {
        return Ok(Vec::new());
    }

    let errands = plan
        .lifecycle_errands
        .pre_delete
        .iter()
        .chain(&plan.lifecycle_errands.post_deploy)
        .filter(|errand| !errand.instances.is_empty());

    let mut jobs: Vec<Job> = Vec::new();
    for errand in errands {
        if jobs.iter().any(|job| job.name == errand.name) {
            continue;
        }
        debug!(errand = %errand.name, "Colocating errand on service group");
        jobs.push(gather_job(&errand.name, releases)?);
    }
    Ok(jobs)
}

/// Separate errand groups for the reserved errand names the plan declares
pub fn standalone_errand_groups(
    plan: &Plan,
    releases: &[ServiceRelease],
) -> Result<Vec<InstanceGroup>> {
    let mut groups = Vec::new();

    for errand in STANDALONE_ERRANDS {
        let Some(template) = plan.instance_group(errand) else {
            continue;
        };

        groups.push(InstanceGroup {
            name: errand.to_string(),
            instances: template.instances,
            jobs: vec![gather_job(errand, releases)?],
            vm_type: template.vm_type.clone(),
            vm_extensions: template.vm_extensions.clone(),
            persistent_disk_type: template.persistent_disk_type.clone(),
            stemcell: STEMCELL_ALIAS.to_string(),
            networks: networks(&template.networks),
            azs: template.azs.clone(),
            lifecycle: Some(Lifecycle::Errand),
            properties: errand_properties(errand, &plan.properties),
            ..Default::default()
        });
    }

    Ok(groups)
}

/// Variables the orchestrator generates for every deployment
pub fn variables() -> Vec<Variable> {
    let mut certificate_options = Properties::new();
    certificate_options.insert("is_ca".into(), true.into());
    certificate_options.insert("common_name".into(), "redis".into());

    let mut wildcard = Properties::new();
    wildcard.insert("wildcard".into(), true.into());

    vec![
        Variable {
            name: GENERATED_SECRET_VARIABLE.to_string(),
            kind: "password".to_string(),
            ..Default::default()
        },
        Variable {
            name: CERTIFICATE_VARIABLE.to_string(),
            kind: "certificate".to_string(),
            update_mode: Some("no-overwrite".to_string()),
            options: certificate_options,
            consumes: Some(VariableConsumes {
                alternative_name: Some(VariableConsumesLink {
                    from: ADDRESS_LINK_NAME.to_string(),
                    properties: wildcard,
                }),
                common_name: Some(VariableConsumesLink {
                    from: ADDRESS_LINK_NAME.to_string(),
                    properties: Properties::new(),
                }),
            }),
        },
    ]
}

/// Feature block; plan properties that are not set leave their feature unset
pub fn features(plan_properties: &Properties) -> Features {
    let mut features = Features::default();

    if let Some(short_dns) = plan_properties.get(SHORT_DNS_PROPERTY) {
        features.use_short_dns_addresses = Some(short_dns.as_bool() == Some(true));
    }
    if let Some(extra) = plan_properties.get(EXTRA_FEATURE_PROPERTY) {
        features
            .extra
            .insert(EXTRA_FEATURE_PROPERTY.to_string(), extra.clone());
    }

    features
}

#[derive(Debug, Deserialize)]
struct CloudConfig {
    #[serde(default)]
    vm_extensions: Vec<CloudVmExtension>,
}

#[derive(Debug, Deserialize)]
struct CloudVmExtension {
    name: String,
}

/// Names of the VM extensions declared by a cloud-config document
pub fn parse_vm_extensions_config(config: &str) -> Result<Vec<String>> {
    let cloud: CloudConfig = serde_yaml::from_str(config)
        .map_err(|e| AdapterError::InvalidVmExtensionsConfig(e.to_string()))?;
    Ok(cloud.vm_extensions.into_iter().map(|ext| ext.name).collect())
}

/// VM extensions of the service group
///
/// Extensions from a supplied cloud-config are appended to the plan's. With
/// no config, an existing deployment keeps the extensions it was deployed
/// with.
pub fn vm_extensions(
    plan_extensions: &[String],
    vm_extensions_config: Option<&str>,
    previous: Option<&Manifest>,
    group_name: &str,
) -> Result<Vec<String>> {
    if let Some(config) = vm_extensions_config {
        let mut extensions = plan_extensions.to_vec();
        extensions.extend(parse_vm_extensions_config(config)?);
        return Ok(extensions);
    }

    let carried = previous.and_then(|manifest| manifest.instance_group(group_name));
    Ok(match carried {
        Some(group) => group.vm_extensions.clone(),
        None => plan_extensions.to_vec(),
    })
}
