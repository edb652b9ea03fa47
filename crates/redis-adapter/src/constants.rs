//! Names shared between manifest generation and binding

/// Job providing the Redis server
pub const SERVICE_JOB_NAME: &str = "redis-server";

/// Default name of the service instance group
pub const DEFAULT_SERVICE_INSTANCE_GROUP: &str = "redis-server";

/// Key of the service property block on the service job
pub const SERVICE_PROPERTIES_KEY: &str = "redis";

/// Port the Redis server listens on
pub const SERVICE_PORT: u16 = 6379;

/// Shared link other deployments consume to discover the server
pub const SHARED_LINK_NAME: &str = "redis";

/// Custom link exposing the server address
pub const ADDRESS_LINK_NAME: &str = "redis-server-link";
pub const ADDRESS_LINK_TYPE: &str = "address";

pub const HEALTH_CHECK_ERRAND: &str = "health-check";
pub const CLEANUP_DATA_ERRAND: &str = "cleanup-data";

/// Errands that get their own instance group when a plan declares one
pub const STANDALONE_ERRANDS: [&str; 2] = [HEALTH_CHECK_ERRAND, CLEANUP_DATA_ERRAND];

/// The only stemcell alias used by generated manifests
pub const STEMCELL_ALIAS: &str = "only-stemcell";

/// Tag attached to every generated manifest
pub const PRODUCT_TAG: &str = "redis";

/// Platform whose bind/provision requests carry full context
pub const CLOUD_FOUNDRY_PLATFORM: &str = "cloudfoundry";

/// Prefix of references the broker resolves from its own secret store
pub const ODB_SECRET_PREFIX: &str = "odb_secret";

pub const GENERATED_SECRET_KEY: &str = "generated_secret";
pub const GENERATED_SECRET_VARIABLE: &str = "secret_pass";

pub const MANAGED_SECRET_KEY: &str = "odb_managed_secret";
pub const MANAGED_SECRET_VALUE: &str = "HardcodedAdapterValue";

pub const CERTIFICATE_VARIABLE: &str = "instance_certificate";

pub const CLOUD_CONFIG_KEY: &str = "cloud";

/// Plan properties
pub const PERSISTENCE_PROPERTY: &str = "persistence";
pub const COLOCATED_ERRAND_PROPERTY: &str = "colocated_errand";
pub const SHORT_DNS_PROPERTY: &str = "use_short_dns_addresses";
pub const EXTRA_FEATURE_PROPERTY: &str = "something_completely_different";
pub const ERRAND_FAILURE_OVERRIDE_PROPERTY: &str = "systest_errand_failure_override";
pub const ERRAND_SLEEP_PROPERTY: &str = "systest_errand_sleep";

/// Request parameters
pub const MAX_CLIENTS_PARAMETER: &str = "maxclients";
pub const SECRET_PATH_PARAMETER: &str = "credhub_secret_path";
pub const VM_EXTENSIONS_CONFIG_PARAMETER: &str = "vm_extensions_config";

pub const DEFAULT_MAX_CLIENTS: i64 = 10000;
