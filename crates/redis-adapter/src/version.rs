//! Release version comparison
//!
//! Release versions look like `3`, `3.10`, `0+dev.2` or `1.1+dev.3`. Anything
//! after the recognised prefix (for example a `-fa37909` commit suffix) is
//! ignored.

use crate::error::{AdapterError, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Version string that is never treated as a downgrade
pub const LATEST: &str = "latest";

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)(?:\.(\d+))?(?:\+dev\.(\d+))?").expect("version pattern is valid")
});

/// Parsed release version, ordered lexicographically on (major, minor, patch)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ReleaseVersion {
    pub major: u64,
    pub minor: u64,
    /// The `+dev.N` counter
    pub patch: u64,
}

impl ReleaseVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl FromStr for ReleaseVersion {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || AdapterError::InvalidVersion(s.to_string());
        let captures = VERSION_PATTERN.captures(s).ok_or_else(invalid)?;

        let part = |idx: usize| -> Result<u64> {
            match captures.get(idx) {
                Some(m) => m.as_str().parse().map_err(|_| invalid()),
                None => Ok(0),
            }
        };

        Ok(Self {
            major: part(1)?,
            minor: part(2)?,
            patch: part(3)?,
        })
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}+dev.{}", self.major, self.minor, self.patch)
    }
}

/// Whether moving from `old` to `new` goes backwards
///
/// `latest` on either side is always allowed. The new version is parsed
/// first, so a malformed new version is reported even when the old one is
/// also malformed.
pub fn is_downgrade(old: &str, new: &str) -> Result<bool> {
    if old == LATEST || new == LATEST {
        return Ok(false);
    }

    let new: ReleaseVersion = new.parse()?;
    let old: ReleaseVersion = old.parse()?;
    Ok(new < old)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_partial_versions() {
        assert_eq!("3".parse::<ReleaseVersion>().unwrap(), ReleaseVersion::new(3, 0, 0));
        assert_eq!("3.10".parse::<ReleaseVersion>().unwrap(), ReleaseVersion::new(3, 10, 0));
        assert_eq!("0+dev.2".parse::<ReleaseVersion>().unwrap(), ReleaseVersion::new(0, 0, 2));
        assert_eq!(
            "0.1+dev.8-fa37909".parse::<ReleaseVersion>().unwrap(),
            ReleaseVersion::new(0, 1, 8)
        );
    }

    #[test]
    fn rejects_non_numeric_versions() {
        let err = "oi".parse::<ReleaseVersion>().unwrap_err();
        assert_eq!(err.to_string(), "oi is not a valid BOSH release version");
    }

    #[test]
    fn downgrade_table() {
        let cases = [
            ("3", "3", false),
            ("3", "4", false),
            ("3", "2", true),
            ("3.2", "3.10", false),
            ("3.10", "3.2", true),
            ("3", "3.0", false),
            ("3.0", "3", false),
            ("3", "3.1", false),
            ("3.1", "3", true),
            ("0+dev.2", "0+dev.10", false),
            ("0+dev.10", "0+dev.2", true),
            ("1.1+dev.2", "1.1+dev.10", false),
            ("1.1+dev.10", "1.1+dev.2", true),
            ("1.2", "2.1", false),
            ("2.1", "1.2", true),
            ("1+dev.2", "2+dev.1", false),
            ("2+dev.1", "1+dev.2", true),
            ("0.1+dev.2", "0.2+dev.1", false),
            ("0.2+dev.1", "0.1+dev.2", true),
            ("0+dev.1", "1", false),
            ("1", "1+dev.1", false),
            ("2", "1+dev.1", true),
            ("latest", "latest", false),
            ("latest", "1", false),
            ("4", "latest", false),
        ];

        for (old, new, expected) in cases {
            assert_eq!(
                is_downgrade(old, new).unwrap(),
                expected,
                "old {} new {}",
                old,
                new
            );
        }
    }

    #[test]
    fn invalid_new_version_reported_first() {
        let err = is_downgrade("bad-old", "bad-new").unwrap_err();
        assert_eq!(err.to_string(), "bad-new is not a valid BOSH release version");
    }

    fn version_string() -> impl Strategy<Value = String> {
        (0u64..50, proptest::option::of(0u64..50), proptest::option::of(0u64..50)).prop_map(
            |(major, minor, dev)| {
                let mut s = major.to_string();
                if let Some(minor) = minor {
                    s.push_str(&format!(".{}", minor));
                }
                if let Some(dev) = dev {
                    s.push_str(&format!("+dev.{}", dev));
                }
                s
            },
        )
    }

    proptest! {
        #[test]
        fn comparison_is_antisymmetric(a in version_string(), b in version_string()) {
            let a: ReleaseVersion = a.parse().unwrap();
            let b: ReleaseVersion = b.parse().unwrap();
            prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
        }

        #[test]
        fn comparison_is_transitive(
            a in version_string(),
            b in version_string(),
            c in version_string(),
        ) {
            let a: ReleaseVersion = a.parse().unwrap();
            let b: ReleaseVersion = b.parse().unwrap();
            let c: ReleaseVersion = c.parse().unwrap();
            if a <= b && b <= c {
                prop_assert!(a <= c);
            }
        }

        #[test]
        fn a_version_never_downgrades_to_itself(v in version_string()) {
            prop_assert!(!is_downgrade(&v, &v).unwrap());
        }
    }
}
