//! Release and job resolution

use crate::error::{AdapterError, Result};
use redis_adapter_types::{Job, ServiceRelease};

/// Find the single release that provides `job`
pub fn find_release_for_job<'a>(job: &str, releases: &'a [ServiceRelease]) -> Result<&'a ServiceRelease> {
    let owners: Vec<&ServiceRelease> = releases.iter().filter(|r| r.provides(job)).collect();

    match owners.as_slice() {
        [] => Err(AdapterError::NoReleaseForJob(job.to_string())),
        [release] => Ok(release),
        _ => Err(AdapterError::AmbiguousJobOwnership {
            job: job.to_string(),
            releases: owners.iter().map(|r| r.name.clone()).collect(),
        }),
    }
}

/// Build a manifest job reference for `job`
pub fn gather_job(job: &str, releases: &[ServiceRelease]) -> Result<Job> {
    let release = find_release_for_job(job, releases)?;
    Ok(Job::new(job, release.name.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn releases() -> Vec<ServiceRelease> {
        vec![
            ServiceRelease::new("redis", "4").with_jobs(["redis-server", "health-check"]),
            ServiceRelease::new("redis-errands", "1").with_jobs(["cleanup-data", "health-check"]),
        ]
    }

    #[test]
    fn resolves_the_owning_release() {
        let job = gather_job("redis-server", &releases()).unwrap();
        assert_eq!(job.name, "redis-server");
        assert_eq!(job.release, "redis");
    }

    #[test]
    fn missing_job_is_named() {
        let err = gather_job("backup", &releases()).unwrap_err();
        assert_eq!(err.to_string(), "no release provided for job backup");
    }

    #[test]
    fn ambiguous_job_names_every_release_in_order() {
        let err = find_release_for_job("health-check", &releases()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "job health-check defined in multiple releases: redis, redis-errands"
        );
    }
}
