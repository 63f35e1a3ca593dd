use semver::{Version, VersionReq};

use crate::error::{MindError, Result};
use crate::plugin::manifest::MinderManifest;

/// Version of the entry-point contract minders are compiled against.
pub const RUNTIME_VERSION: &str = "1.0.0";

/// Comparands for the two gated axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostVersions {
    pub host: Version,
    pub runtime: Version,
}

impl Default for HostVersions {
    fn default() -> Self {
        Self {
            host: Version::parse(env!("CARGO_PKG_VERSION")).expect("crate version is semver"),
            runtime: Version::parse(RUNTIME_VERSION).expect("runtime version is semver"),
        }
    }
}

impl HostVersions {
    pub fn new(host: Version, runtime: Version) -> Self {
        Self { host, runtime }
    }

    /// Runtime axis first, then host axis. Undeclared axes pass.
    pub fn check(&self, manifest: &MinderManifest) -> Result<()> {
        self.check_runtime(manifest.runtime_requirement.as_deref())?;
        self.check_host(manifest.host_requirement.as_deref())
    }

    pub fn check_runtime(&self, requirement: Option<&str>) -> Result<()> {
        let Some(required) = requirement else {
            return Ok(());
        };

        if satisfies(required, &self.runtime)? {
            return Ok(());
        }

        Err(MindError::IncompatibleRuntimeVersion {
            required: required.to_string(),
            actual: self.runtime.to_string(),
        })
    }

    pub fn check_host(&self, requirement: Option<&str>) -> Result<()> {
        let Some(required) = requirement else {
            return Ok(());
        };

        if satisfies(required, &self.host)? {
            return Ok(());
        }

        Err(MindError::IncompatibleHostVersion {
            required: required.to_string(),
            actual: self.host.to_string(),
        })
    }
}

fn satisfies(requirement: &str, actual: &Version) -> Result<bool> {
    let req = VersionReq::parse(requirement).map_err(|source| {
        MindError::InvalidVersionRequirement {
            requirement: requirement.to_string(),
            source,
        }
    })?;

    Ok(req.matches(actual))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versions(host: &str, runtime: &str) -> HostVersions {
        HostVersions::new(Version::parse(host).unwrap(), Version::parse(runtime).unwrap())
    }

    #[test]
    fn undeclared_axes_are_not_checked() {
        let versions = versions("0.1.0", "1.0.0");
        versions.check_runtime(None).unwrap();
        versions.check_host(None).unwrap();
    }

    #[test]
    fn conjunctive_range_is_honoured() {
        let versions = versions("1.4.2", "1.0.0");
        versions.check_host(Some(">=1.0.0, <2.0.0")).unwrap();

        let err = versions.check_host(Some(">=1.0.0, <1.4.0")).unwrap_err();
        match err {
            MindError::IncompatibleHostVersion { required, actual } => {
                assert_eq!(required, ">=1.0.0, <1.4.0");
                assert_eq!(actual, "1.4.2");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn runtime_axis_has_its_own_error() {
        let err = versions("0.1.0", "1.0.0")
            .check_runtime(Some(">=999.0.0"))
            .unwrap_err();
        assert!(matches!(err, MindError::IncompatibleRuntimeVersion { .. }));
        assert!(err.to_string().contains("1.0.0 not in '>=999.0.0'"));
    }

    #[test]
    fn runtime_is_checked_before_host() {
        let manifest = MinderManifest::parse(
            "name = \"A\"\nversion = \"0.1.0\"\nmind = \">=999.0.0\"\nruntime = \">=999.0.0\"\n",
        )
        .unwrap();

        let err = versions("0.1.0", "1.0.0").check(&manifest).unwrap_err();
        assert!(matches!(err, MindError::IncompatibleRuntimeVersion { .. }));
    }

    #[test]
    fn garbage_range_is_rejected() {
        let err = versions("0.1.0", "1.0.0")
            .check_host(Some("not a range"))
            .unwrap_err();
        assert!(matches!(err, MindError::InvalidVersionRequirement { .. }));
    }

    #[test]
    fn defaults_track_crate_version() {
        let defaults = HostVersions::default();
        assert_eq!(defaults.host.to_string(), env!("CARGO_PKG_VERSION"));
        assert_eq!(defaults.runtime.to_string(), RUNTIME_VERSION);
    }
}
