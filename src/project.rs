//! Locating the project descriptor, its metadata file and packaging manifest,
//! and telling legacy descriptors from modern ones.

use regex::Regex;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

use crate::domain::BuildContext;
use crate::error::{ChangeRevisionError, Result};

pub const DESCRIPTOR_EXTENSION: &str = "csproj";
pub const MANIFEST_EXTENSION: &str = "nuspec";

/// How the project stores its version numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorFormat {
    /// Attribute declarations in `Properties/AssemblyInfo.cs`
    Legacy,
    /// Elements inside the project descriptor itself
    Modern,
}

fn legacy_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<TargetFrameworkVersion\b").expect("valid regex"))
}

fn modern_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<TargetFrameworks?\b").expect("valid regex"))
}

impl DescriptorFormat {
    /// Detect the format from descriptor text.
    ///
    /// A `<TargetFrameworkVersion>` element means legacy; otherwise a
    /// `<TargetFramework>` or `<TargetFrameworks>` element means modern.
    pub fn detect(descriptor_text: &str) -> Result<Self> {
        if legacy_marker().is_match(descriptor_text) {
            Ok(DescriptorFormat::Legacy)
        } else if modern_marker().is_match(descriptor_text) {
            Ok(DescriptorFormat::Modern)
        } else {
            Err(ChangeRevisionError::unsupported_format(
                "descriptor has neither <TargetFrameworkVersion> nor <TargetFramework>",
            ))
        }
    }
}

/// Directory the descriptor search starts from.
///
/// When `working_dir` lies inside a `bin/<configuration>` build output
/// directory, the search starts above `bin`.
pub fn search_root(working_dir: &Path, configuration: &str) -> PathBuf {
    let components: Vec<Component> = working_dir.components().collect();

    let cut = components
        .windows(2)
        .rposition(|pair| {
            pair[0].as_os_str().eq_ignore_ascii_case("bin")
                && pair[1].as_os_str().eq_ignore_ascii_case(configuration)
        });

    match cut {
        Some(index) => components[..index].iter().collect(),
        None => working_dir.to_path_buf(),
    }
}

/// Files belonging to one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFiles {
    pub project_dir: PathBuf,
    pub descriptor: PathBuf,
}

impl ProjectFiles {
    /// Find `<project>.csproj` from the search root upward.
    ///
    /// Each ancestor is checked for the descriptor directly and inside a
    /// `<project>/` child directory.
    pub fn locate(working_dir: &Path, ctx: &BuildContext) -> Result<Self> {
        let root = search_root(working_dir, &ctx.configuration);
        let file_name = format!("{}.{}", ctx.project, DESCRIPTOR_EXTENSION);

        for dir in root.ancestors() {
            for candidate in [dir.join(&file_name), dir.join(&ctx.project).join(&file_name)] {
                if candidate.is_file() {
                    debug!(descriptor = %candidate.display(), "found project descriptor");
                    let project_dir = candidate
                        .parent()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| dir.to_path_buf());
                    return Ok(ProjectFiles {
                        project_dir,
                        descriptor: candidate,
                    });
                }
            }
        }

        Err(ChangeRevisionError::MissingProjectDirectory(format!(
            "no {} found in {} or its parents",
            file_name,
            root.display()
        )))
    }

    /// Attribute metadata file used by legacy descriptors.
    pub fn legacy_metadata(&self) -> PathBuf {
        self.project_dir.join("Properties").join("AssemblyInfo.cs")
    }

    /// Packaging manifest beside the descriptor, if any.
    ///
    /// `<project>.nuspec` is preferred; otherwise the first `*.nuspec` by name.
    pub fn find_manifest(&self) -> Result<Option<PathBuf>> {
        let mut manifests: Vec<PathBuf> = fs::read_dir(&self.project_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .map(|ext| ext.eq_ignore_ascii_case(MANIFEST_EXTENSION))
                        .unwrap_or(false)
            })
            .collect();
        manifests.sort();

        let own_stem = self.descriptor.file_stem();
        let preferred = manifests
            .iter()
            .position(|path| path.file_stem() == own_stem)
            .unwrap_or(0);

        if manifests.len() > 1 {
            debug!(count = manifests.len(), "several manifests found");
        }

        Ok(if manifests.is_empty() {
            None
        } else {
            Some(manifests.swap_remove(preferred))
        })
    }

    pub fn read_descriptor(&self) -> Result<String> {
        Ok(fs::read_to_string(&self.descriptor)?)
    }
}
