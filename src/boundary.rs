use std::fmt;
use std::path::PathBuf;

/// Non-fatal conditions met while bumping a version.
/// These are collected into the bump outcome and shown to the user; they do
/// not stop the run.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// The client did not finish within the bounded wait
    ProcessTimedOut { command: String, captured: usize },
    /// The checkout is not on the primary branch and the guard is disabled
    NotOnPrimaryBranch {
        primary: String,
        current: Option<String>,
    },
    /// Package generation is on but the descriptor has no package version element
    PackageVersionElementMissing { descriptor: PathBuf },
    /// The packaging manifest has no version element to update
    ManifestVersionMissing { manifest: PathBuf },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::ProcessTimedOut { command, captured } => {
                write!(
                    f,
                    "'{}' timed out, continuing with {} captured bytes",
                    command, captured
                )
            }
            BoundaryWarning::NotOnPrimaryBranch { primary, current } => match current {
                Some(current) => write!(
                    f,
                    "Checked out on '{}', not '{}'; commit count is still taken from '{}'",
                    current, primary, primary
                ),
                None => write!(
                    f,
                    "No checked-out branch found; commit count is taken from '{}'",
                    primary
                ),
            },
            BoundaryWarning::PackageVersionElementMissing { descriptor } => {
                write!(
                    f,
                    "Package generation enabled but {} has no <Version> or <PackageVersion> element",
                    descriptor.display()
                )
            }
            BoundaryWarning::ManifestVersionMissing { manifest } => {
                write!(f, "Manifest {} has no <version> element", manifest.display())
            }
        }
    }
}
