use crate::error::{ChangeRevisionError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

/// Dotted-decimal assembly version with two to four segments
/// (`major.minor[.build[.revision]]`).
///
/// The last populated segment is the revision slot: it is the one replaced by
/// the measured commit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AssemblyVersion {
    pub major: u32,
    pub minor: u32,
    pub build: Option<u32>,
    pub revision: Option<u32>,
}

/// Segment incremented by one for release builds.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseIncrement {
    #[default]
    Minor,
    /// Falls back to `Minor` when the version has no separate build segment
    Build,
}

impl AssemblyVersion {
    /// Create a three-segment version
    pub fn new(major: u32, minor: u32, build: u32) -> Self {
        AssemblyVersion {
            major,
            minor,
            build: Some(build),
            revision: None,
        }
    }

    /// Create a four-segment version
    pub fn with_revision(major: u32, minor: u32, build: u32, revision: u32) -> Self {
        AssemblyVersion {
            major,
            minor,
            build: Some(build),
            revision: Some(revision),
        }
    }

    /// Parse a dotted-decimal version (e.g., "1.2.3" or "1.0.0.0")
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let parts: Vec<&str> = trimmed.split('.').collect();
        if !(2..=4).contains(&parts.len()) {
            return Err(ChangeRevisionError::malformed(format!(
                "'{}' - expected two to four dot-separated numbers",
                text
            )));
        }

        let mut numbers = Vec::with_capacity(parts.len());
        for part in &parts {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ChangeRevisionError::malformed(format!(
                    "'{}' - segment '{}' is not a number",
                    text, part
                )));
            }
            let number = part.parse::<u32>().map_err(|_| {
                ChangeRevisionError::malformed(format!("'{}' - segment '{}' is too large", text, part))
            })?;
            numbers.push(number);
        }

        Ok(AssemblyVersion {
            major: numbers[0],
            minor: numbers[1],
            build: numbers.get(2).copied(),
            revision: numbers.get(3).copied(),
        })
    }

    /// Number of populated segments
    pub fn segment_count(&self) -> usize {
        match (self.build, self.revision) {
            (_, Some(_)) => 4,
            (Some(_), None) => 3,
            (None, None) => 2,
        }
    }

    /// Computes the next version.
    ///
    /// Major is kept. On release builds the segment chosen by `increment` goes
    /// up by one. The revision slot (the last segment, or a new third segment
    /// for two-segment versions) receives `revision`.
    pub fn next(
        &self,
        revision: RevisionCount,
        release: bool,
        increment: ReleaseIncrement,
    ) -> Result<Self> {
        let count = u32::from(revision.value());
        let mut next = *self;

        if release {
            match (increment, self.segment_count()) {
                (ReleaseIncrement::Build, 4) => next.build = Some(bump(self.build.unwrap_or(0))?),
                _ => next.minor = bump(self.minor)?,
            }
        }

        if self.segment_count() == 4 {
            next.revision = Some(count);
        } else {
            next.build = Some(count);
        }

        Ok(next)
    }
}

fn bump(segment: u32) -> Result<u32> {
    segment.checked_add(1).ok_or_else(|| {
        ChangeRevisionError::OutOfRange(format!("segment {} cannot be incremented", segment))
    })
}

impl FromStr for AssemblyVersion {
    type Err = ChangeRevisionError;

    fn from_str(s: &str) -> Result<Self> {
        AssemblyVersion::parse(s)
    }
}

impl fmt::Display for AssemblyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(build) = self.build {
            write!(f, ".{}", build)?;
        }
        if let Some(revision) = self.revision {
            write!(f, ".{}", revision)?;
        }
        Ok(())
    }
}

/// Commit count measured on the primary branch.
///
/// Parsed as a 16-bit signed integer; negative or larger values are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RevisionCount(u16);

impl RevisionCount {
    pub fn new(value: u16) -> Result<Self> {
        if value > i16::MAX as u16 {
            return Err(ChangeRevisionError::OutOfRange(format!(
                "{} exceeds {}",
                value,
                i16::MAX
            )));
        }
        Ok(RevisionCount(value))
    }

    /// Parse captured client output; surrounding whitespace is ignored.
    pub fn parse(output: &str) -> Result<Self> {
        let trimmed = output.trim();
        if trimmed.is_empty() {
            return Err(ChangeRevisionError::malformed(
                "revision count output is empty",
            ));
        }

        let value = trimmed.parse::<i16>().map_err(|e| match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                ChangeRevisionError::OutOfRange(format!(
                    "'{}' does not fit a 16-bit signed integer",
                    trimmed
                ))
            }
            _ => ChangeRevisionError::malformed(format!(
                "revision count '{}' is not a number",
                trimmed
            )),
        })?;

        if value < 0 {
            return Err(ChangeRevisionError::OutOfRange(format!(
                "revision count {} is negative",
                value
            )));
        }

        Ok(RevisionCount(value as u16))
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for RevisionCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Build configuration and project name given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    pub configuration: String,
    pub project: String,
}

impl BuildContext {
    pub fn new(configuration: impl Into<String>, project: impl Into<String>) -> Self {
        BuildContext {
            configuration: configuration.into(),
            project: project.into(),
        }
    }

    /// Build a context from positional arguments (configuration, project).
    pub fn from_args<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = args.into_iter().map(Into::into);
        match (args.next(), args.next()) {
            (Some(configuration), Some(project))
                if !configuration.is_empty() && !project.is_empty() =>
            {
                Ok(BuildContext::new(configuration, project))
            }
            _ => Err(ChangeRevisionError::InsufficientArguments(
                "expected <CONFIGURATION> <PROJECT>".to_string(),
            )),
        }
    }

    /// Case-sensitive comparison against the release marker.
    pub fn is_release(&self, release_configuration: &str) -> bool {
        self.configuration == release_configuration
    }
}
