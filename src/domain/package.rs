//! Package version derived from the assembly version.
//!
//! Non-release builds carry a pre-release identifier (`1.0.7-pre`); the
//! identifier is validated with the `semver` pre-release grammar.

use semver::Prerelease;
use std::fmt;

use crate::domain::AssemblyVersion;
use crate::error::{ChangeRevisionError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageVersion {
    pub version: AssemblyVersion,
    pub prerelease: Prerelease,
}

impl PackageVersion {
    /// Package version for a build: release builds get none, others get `tag`.
    pub fn for_build(version: AssemblyVersion, release: bool, tag: &str) -> Result<Self> {
        let prerelease = if release || tag.is_empty() {
            Prerelease::EMPTY
        } else {
            Prerelease::new(tag).map_err(|e| {
                ChangeRevisionError::config(format!("invalid pre-release tag '{}': {}", tag, e))
            })?
        };

        Ok(PackageVersion {
            version,
            prerelease,
        })
    }

    pub fn is_prerelease(&self) -> bool {
        !self.prerelease.is_empty()
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.version)?;
        if self.is_prerelease() {
            write!(f, "-{}", self.prerelease)?;
        }
        Ok(())
    }
}
