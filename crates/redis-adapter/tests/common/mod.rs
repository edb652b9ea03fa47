//! Shared fixtures for the integration tests

#![allow(dead_code)]

use redis_adapter::{AdapterConfig, ManifestGenerator, Result};
use redis_adapter_types::{
    Errand, GenerateManifestParams, Manifest, Plan, PlanInstanceGroup, PlanUpdate, Properties,
    PropertyValue, RequestParameters, ServiceDeployment, ServiceRelease, Stemcell,
};
use std::io;
use std::sync::{Arc, Mutex};

pub const FIXED_PASSWORD: &str = "really random password";

pub fn default_releases() -> Vec<ServiceRelease> {
    vec![ServiceRelease::new("some-release-name", "4").with_jobs([
        "redis-server",
        "health-check",
        "cleanup-data",
    ])]
}

pub fn deployment(releases: Vec<ServiceRelease>) -> ServiceDeployment {
    ServiceDeployment {
        deployment_name: "some-instance-id".into(),
        releases,
        stemcells: vec![Stemcell {
            os: "some-stemcell-os".into(),
            version: "1234".into(),
        }],
    }
}

pub fn dedicated_plan() -> Plan {
    let mut plan = Plan {
        instance_groups: vec![
            PlanInstanceGroup {
                name: "redis-server".into(),
                vm_type: "dedicated-vm".into(),
                vm_extensions: vec!["dedicated-extensions".into()],
                persistent_disk_type: Some("dedicated-disk".into()),
                networks: vec!["dedicated-network".into()],
                azs: vec!["dedicated-az1".into(), "dedicated-az2".into()],
                instances: 45,
                ..Default::default()
            },
            PlanInstanceGroup {
                name: "health-check".into(),
                vm_type: "health-check-vm".into(),
                vm_extensions: vec!["health-check-extensions".into()],
                networks: vec!["health-check-network".into()],
                azs: vec!["health-check-az1".into()],
                instances: 1,
                ..Default::default()
            },
            PlanInstanceGroup {
                name: "cleanup-data".into(),
                vm_type: "cleanup-data-vm".into(),
                vm_extensions: vec!["cleanup-data-extensions".into()],
                networks: vec!["cleanup-data-network".into()],
                azs: vec!["cleanup-data-az1".into()],
                instances: 1,
                ..Default::default()
            },
        ],
        update: Some(PlanUpdate {
            canaries: 1,
            max_in_flight: 5,
            canary_watch_time: "100-200".into(),
            update_watch_time: "100-200".into(),
            serial: None,
        }),
        ..Default::default()
    };
    plan.properties.insert("persistence".into(), true.into());
    plan
}

pub fn high_memory_plan() -> Plan {
    let mut plan = Plan {
        instance_groups: vec![PlanInstanceGroup {
            name: "redis-server".into(),
            vm_type: "high-memory-vm".into(),
            persistent_disk_type: Some("high-memory-disk".into()),
            networks: vec!["high-memory-network".into()],
            azs: vec!["high-memory-az1".into(), "high-memory-az2".into()],
            instances: 42,
            ..Default::default()
        }],
        ..Default::default()
    };
    plan.properties.insert("persistence".into(), false.into());
    plan
}

pub fn colocated_plan(errands: Vec<Errand>) -> Plan {
    let mut plan = high_memory_plan();
    plan.properties.insert("colocated_errand".into(), true.into());
    plan.lifecycle_errands.post_deploy = errands;
    plan
}

/// Previous manifest whose service properties sit on the instance group
pub fn old_manifest() -> Manifest {
    serde_yaml::from_str(
        r#"
name: some-instance-id
releases:
  - name: some-release-name
    version: "4"
instance_groups:
  - name: redis-server
    properties:
      redis:
        password: some-password
        persistence: this is the old value
        maxclients: 47
"#,
    )
    .expect("old manifest fixture parses")
}

pub fn old_manifest_with_version(version: &str) -> Manifest {
    let mut manifest = old_manifest();
    manifest.releases[0].version = version.to_string();
    manifest
}

pub fn generator(config: AdapterConfig) -> ManifestGenerator {
    ManifestGenerator::new(config)
        .with_password_generator(|| -> Result<String> { Ok(FIXED_PASSWORD.to_string()) })
}

pub fn params(plan: Plan) -> GenerateManifestParams {
    GenerateManifestParams {
        service_deployment: deployment(default_releases()),
        plan,
        request_params: RequestParameters::default().with_platform("cloudfoundry"),
        ..Default::default()
    }
}

/// The `redis` block of the generated service job
pub fn redis_properties(manifest: &Manifest) -> &Properties {
    manifest.instance_groups[0].jobs[0].properties["redis"]
        .as_map()
        .expect("redis properties are a map")
}

pub fn property_str<'a>(props: &'a Properties, key: &str) -> Option<&'a str> {
    props.get(key).and_then(PropertyValue::as_str)
}

#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a subscriber that records everything logged
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buf = SharedBuf::default();
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    (result, buf.contents())
}
