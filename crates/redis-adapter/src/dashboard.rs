//! Dashboard URL for service instances

use redis_adapter_types::{DashboardUrl, DashboardUrlParams};
use tracing::debug;

/// Base of every dashboard URL
pub const DASHBOARD_BASE_URL: &str = "https://example.com/dashboard";

#[derive(Debug, Clone, Copy, Default)]
pub struct DashboardGenerator;

impl DashboardGenerator {
    pub fn dashboard_url(&self, params: &DashboardUrlParams) -> DashboardUrl {
        debug!(instance_id = %params.instance_id, "Building dashboard URL");
        DashboardUrl {
            dashboard_url: format!("{}/{}", DASHBOARD_BASE_URL, params.instance_id),
        }
    }
}
