//! Manifest Generator - Turns a service plan into a deployment manifest
//!
//! Generation is all-or-nothing: any failure aborts the call and no partial
//! manifest is returned. The steps run in a fixed order:
//!
//! 1. request parameters are validated
//! 2. an update is checked against the deployed release version
//! 3. the service job properties and secrets are reconciled
//! 4. instance groups, update policy, variables and features are assembled

use crate::config::AdapterConfig;
use crate::constants::{
    ADDRESS_LINK_NAME, ADDRESS_LINK_TYPE, CLOUD_CONFIG_KEY, CLOUD_FOUNDRY_PLATFORM,
    MANAGED_SECRET_KEY, MANAGED_SECRET_VALUE, PRODUCT_TAG, SERVICE_JOB_NAME, SHARED_LINK_NAME,
    STEMCELL_ALIAS,
};
use crate::error::{AdapterError, Result};
use crate::parameters::ArbitraryParameters;
use crate::password::{PasswordGenerator, RandomPasswordGenerator};
use crate::properties::{self, ReconcileInputs};
use crate::releases::{find_release_for_job, gather_job};
use crate::topology;
use crate::version;
use redis_adapter_types::{
    BoshConfigs, GenerateManifestOutput, GenerateManifestParams, InstanceGroup, ManagedSecrets,
    Manifest, ManifestRelease, ManifestStemcell, Migration, Properties, RequestParameters,
    ServiceRelease,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Builds deployment manifests for service instances
#[derive(Clone)]
pub struct ManifestGenerator {
    config: AdapterConfig,
    passwords: Arc<dyn PasswordGenerator>,
}

impl std::fmt::Debug for ManifestGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManifestGenerator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ManifestGenerator {
    /// Create a generator using OS randomness for passwords
    pub fn new(config: AdapterConfig) -> Self {
        Self {
            config,
            passwords: Arc::new(RandomPasswordGenerator),
        }
    }

    /// Replace the password strategy
    pub fn with_password_generator(mut self, passwords: impl PasswordGenerator + 'static) -> Self {
        self.passwords = Arc::new(passwords);
        self
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Generate the manifest for a provision or update
    #[instrument(skip(self, params), fields(deployment = %params.service_deployment.deployment_name))]
    pub fn generate_manifest(&self, params: GenerateManifestParams) -> Result<GenerateManifestOutput> {
        log_platform(&params.request_params);

        let arbitrary = ArbitraryParameters::from_request(params.request_params.arbitrary_params())?;
        let releases = &params.service_deployment.releases;

        if let Some(previous) = &params.previous_manifest {
            check_upgrade_path(previous, releases)?;
        }
        if params.previous_plan.is_some() {
            debug!("Previous plan supplied");
        }

        let (managed_secret_value, ignore_managed_secret) = match &arbitrary.managed_secret {
            Some(value) => (value.clone(), true),
            None => (
                MANAGED_SECRET_VALUE.to_string(),
                self.config.ignore_odb_managed_secret_on_update,
            ),
        };

        let group_name = &self.config.service_instance_group_name;
        let template = params.plan.instance_group(group_name).ok_or_else(|| {
            AdapterError::service_configuration(format!(
                "no {} instance group definition found",
                group_name
            ))
        })?;

        let stemcell = params
            .service_deployment
            .stemcells
            .first()
            .ok_or_else(|| {
                AdapterError::service_configuration(format!(
                    "no stemcell provided for deployment {}",
                    params.service_deployment.deployment_name
                ))
            })?;

        let previous_block = params
            .previous_manifest
            .as_ref()
            .map(|manifest| properties::service_block(manifest, group_name))
            .transpose()?
            .flatten();
        if params.previous_manifest.is_some() && previous_block.is_none() {
            warn!("Previous manifest has no service properties");
        }

        let mut managed_secrets = ManagedSecrets::new();
        let service_properties = properties::reconcile(
            ReconcileInputs {
                plan_properties: &params.plan.properties,
                params: &arbitrary,
                previous: previous_block,
                previous_secrets: params.previous_secrets.as_ref(),
                ignore_managed_secret,
                secure_manifests: self.config.secure_manifests_enabled,
            },
            self.passwords.as_ref(),
            &mut managed_secrets,
        )?;

        let service_job = gather_job(SERVICE_JOB_NAME, releases)?
            .with_properties(service_properties.to_properties())
            .with_custom_provider_definition(ADDRESS_LINK_NAME, ADDRESS_LINK_TYPE)
            .with_shared_provides_link(SHARED_LINK_NAME);

        let mut jobs = vec![service_job];
        jobs.extend(topology::colocated_errand_jobs(&params.plan, releases)?);

        let vm_extensions = topology::vm_extensions(
            &template.vm_extensions,
            arbitrary.vm_extensions_config.as_deref(),
            params.previous_manifest.as_ref(),
            group_name,
        )?;

        let service_group = InstanceGroup {
            name: template.name.clone(),
            instances: template.instances,
            jobs,
            vm_type: template.vm_type.clone(),
            vm_extensions,
            persistent_disk_type: template.persistent_disk_type.clone(),
            stemcell: STEMCELL_ALIAS.to_string(),
            networks: topology::networks(&template.networks),
            azs: template.azs.clone(),
            migrated_from: template
                .migrated_from
                .iter()
                .map(|m| Migration::named(m.name.clone()))
                .collect(),
            ..Default::default()
        };

        let mut instance_groups = vec![service_group];
        instance_groups.extend(topology::standalone_errand_groups(&params.plan, releases)?);

        let mut tags = Properties::new();
        tags.insert("product".into(), PRODUCT_TAG.into());

        let manifest = Manifest {
            name: params.service_deployment.deployment_name.clone(),
            releases: manifest_releases(releases),
            stemcells: vec![ManifestStemcell {
                alias: STEMCELL_ALIAS.to_string(),
                os: stemcell.os.clone(),
                version: stemcell.version.clone(),
            }],
            instance_groups,
            update: Some(topology::update_policy(
                params.plan.update.as_ref(),
                params.previous_manifest.is_some(),
            )),
            properties: Properties::new(),
            variables: topology::variables(),
            tags,
            features: topology::features(&params.plan.properties),
        };

        managed_secrets.insert(MANAGED_SECRET_KEY.to_string(), managed_secret_value);

        let mut configs = BoshConfigs::new();
        if let Some(cloud_config) = arbitrary.vm_extensions_config {
            configs.insert(CLOUD_CONFIG_KEY.to_string(), cloud_config);
        }

        info!(
            instance_groups = manifest.instance_groups.len(),
            managed_secrets = managed_secrets.len(),
            "Generated manifest"
        );

        Ok(GenerateManifestOutput {
            manifest,
            managed_secrets,
            configs,
        })
    }
}

/// Log requests that do not come from a platform sending full context
pub(crate) fn log_platform(request: &RequestParameters) {
    if request.arbitrary_context().is_empty() || request.platform() != Some(CLOUD_FOUNDRY_PLATFORM) {
        info!("Non Cloud Foundry platform (or pre OSBAPI 2.13) detected");
    }
}

/// Reject an update that would move the service release backwards
fn check_upgrade_path(previous: &Manifest, releases: &[ServiceRelease]) -> Result<()> {
    let new_release = find_release_for_job(SERVICE_JOB_NAME, releases)?;
    let old_release = previous
        .release(&new_release.name)
        .ok_or_else(|| AdapterError::MissingPreviousRelease(new_release.name.clone()))?;

    if version::is_downgrade(&old_release.version, &new_release.version)? {
        return Err(AdapterError::Downgrade {
            old: old_release.version.clone(),
            new: new_release.version.clone(),
        });
    }

    debug!(
        release = %new_release.name,
        from = %old_release.version,
        to = %new_release.version,
        "Upgrade path accepted"
    );
    Ok(())
}

fn manifest_releases(releases: &[ServiceRelease]) -> Vec<ManifestRelease> {
    releases
        .iter()
        .map(|r| ManifestRelease {
            name: r.name.clone(),
            version: r.version.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use redis_adapter_types::{Plan, PlanInstanceGroup, PropertyValue, ServiceDeployment, Stemcell};

    fn deployment(version: &str) -> ServiceDeployment {
        ServiceDeployment {
            deployment_name: "some-instance-id".into(),
            releases: vec![ServiceRelease::new("some-release-name", version)
                .with_jobs(["redis-server", "health-check", "cleanup-data"])],
            stemcells: vec![Stemcell {
                os: "Windows".into(),
                version: "3.1".into(),
            }],
        }
    }

    fn plan() -> Plan {
        let mut plan = Plan {
            instance_groups: vec![PlanInstanceGroup {
                name: "redis-server".into(),
                vm_type: "dedicated-vm".into(),
                networks: vec!["dedicated-network".into()],
                azs: vec!["dedicated-az1".into()],
                instances: 1,
                ..Default::default()
            }],
            ..Default::default()
        };
        plan.properties.insert("persistence".into(), true.into());
        plan
    }

    fn generator() -> ManifestGenerator {
        ManifestGenerator::new(AdapterConfig::default())
            .with_password_generator(|| -> Result<String> { Ok("fixed".to_string()) })
    }

    fn previous_manifest(version: &str) -> Manifest {
        serde_yaml::from_str(&format!(
            r#"
name: some-instance-id
releases:
  - name: some-release-name
    version: "{}"
instance_groups:
  - name: redis-server
    jobs:
      - name: redis-server
        release: some-release-name
        properties:
          redis:
            password: some-password
            maxclients: 47
"#,
            version
        ))
        .unwrap()
    }

    #[test]
    fn generates_a_fresh_manifest() {
        let output = generator()
            .generate_manifest(GenerateManifestParams {
                service_deployment: deployment("4"),
                plan: plan(),
                ..Default::default()
            })
            .unwrap();

        let manifest = &output.manifest;
        assert_eq!(manifest.name, "some-instance-id");
        assert_eq!(manifest.stemcells[0].alias, "only-stemcell");
        assert_eq!(manifest.stemcells[0].os, "Windows");
        assert_eq!(manifest.tags["product"].as_str(), Some("redis"));

        let group = manifest.instance_group("redis-server").unwrap();
        let job = group.job("redis-server").unwrap();
        assert!(job.provides["redis"].shared);
        assert_eq!(job.custom_provider_definitions[0].link_type, "address");
        let redis = job.properties["redis"].as_map().unwrap();
        assert_eq!(redis["password"].as_str(), Some("fixed"));

        assert_eq!(
            output.managed_secrets.get("odb_managed_secret").map(String::as_str),
            Some("HardcodedAdapterValue")
        );
        assert!(output.configs.is_empty());
    }

    #[test]
    fn downgrade_is_rejected_before_generation() {
        let err = generator()
            .generate_manifest(GenerateManifestParams {
                service_deployment: deployment("3"),
                plan: plan(),
                previous_manifest: Some(previous_manifest("4")),
                ..Default::default()
            })
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "error generating manifest: new release version 3 is lower than existing release version 4"
        );
    }

    #[test]
    fn previous_release_must_exist() {
        let mut previous = previous_manifest("4");
        previous.releases[0].name = "other-release".into();

        let err = generator()
            .generate_manifest(GenerateManifestParams {
                service_deployment: deployment("4"),
                plan: plan(),
                previous_manifest: Some(previous),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "no release with name some-release-name found in previous manifest"
        );
    }

    #[test]
    fn missing_service_group_is_a_configuration_error() {
        let generator = ManifestGenerator::new(
            AdapterConfig::default().with_service_instance_group_name("not-there"),
        );
        let err = generator
            .generate_manifest(GenerateManifestParams {
                service_deployment: deployment("4"),
                plan: plan(),
                ..Default::default()
            })
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Contact your operator, service configuration issue occurred"
        );
        assert_eq!(
            err.operator_detail().as_deref(),
            Some("no not-there instance group definition found")
        );
    }

    #[test]
    fn managed_secret_override_replaces_the_previous_value() {
        let mut previous = previous_manifest("4");
        if let Some(PropertyValue::Map(block)) =
            previous.instance_groups[0].jobs[0].properties.get_mut("redis")
        {
            block.insert("odb_managed_secret".into(), "previous-value".into());
        }

        let output = generator()
            .generate_manifest(GenerateManifestParams {
                service_deployment: deployment("4"),
                plan: plan(),
                request_params: RequestParameters::default()
                    .with_parameter("odb_managed_secret", "override"),
                previous_manifest: Some(previous),
                ..Default::default()
            })
            .unwrap();

        let redis = output.manifest.instance_groups[0].jobs[0].properties["redis"]
            .as_map()
            .unwrap();
        assert_eq!(
            redis["odb_managed_secret"].as_str(),
            Some("((odb_secret:odb_managed_secret))")
        );
        assert_eq!(
            output.managed_secrets.get("odb_managed_secret").map(String::as_str),
            Some("override")
        );
    }
}
