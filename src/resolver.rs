//! Working out the new version and which files to patch.
//!
//! Nothing is written here: [resolve] reads the project files and returns a
//! [VersionPlan]; [apply_plan] performs the writes.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::boundary::BoundaryWarning;
use crate::config::PolicyConfig;
use crate::domain::{AssemblyVersion, BuildContext, PackageVersion, RevisionCount};
use crate::error::{ChangeRevisionError, Result};
use crate::patcher::{self, PatchOutcome, Substitution};
use crate::project::{DescriptorFormat, ProjectFiles};

const ASSEMBLY_VERSION: &str = "AssemblyVersion";
const ASSEMBLY_FILE_VERSION: &str = "AssemblyFileVersion";
const FILE_VERSION: &str = "FileVersion";
const GENERATE_PACKAGE: &str = "GeneratePackageOnBuild";
const PACKAGE_VERSION_ELEMENTS: [&str; 2] = ["Version", "PackageVersion"];
const MANIFEST_VERSION: &str = "version";

/// A file and the substitutions to run on it.
#[derive(Debug, Clone)]
pub struct PatchTarget {
    pub path: PathBuf,
    pub rules: Vec<Substitution>,
}

/// Everything needed to carry out a version bump.
#[derive(Debug, Clone)]
pub struct VersionPlan {
    pub format: DescriptorFormat,
    pub current: AssemblyVersion,
    pub next: AssemblyVersion,
    pub package: Option<PackageVersion>,
    pub targets: Vec<PatchTarget>,
    pub warnings: Vec<BoundaryWarning>,
}

/// Text content of the first uncommented `<name>` element, trimmed.
pub fn element_value(text: &str, name: &str) -> Option<String> {
    Substitution::element(name, "").ok()?.current_value(text)
}

/// Version string of the first uncommented `[assembly: <name>("...")]`
/// declaration.
pub fn attribute_value(text: &str, name: &str) -> Option<String> {
    Substitution::attribute(name, "").ok()?.current_value(text)
}

/// Compute the version plan for a project.
///
/// # Returns
/// * `Ok(VersionPlan)` - New version and the files to patch
/// * `Err` - Unsupported format, missing elements or a malformed version
pub fn resolve(
    files: &ProjectFiles,
    ctx: &BuildContext,
    revision: RevisionCount,
    policy: &PolicyConfig,
) -> Result<VersionPlan> {
    let descriptor_text = files.read_descriptor()?;
    let format = DescriptorFormat::detect(&descriptor_text)?;
    info!(?format, descriptor = %files.descriptor.display(), "detected project format");

    let release = ctx.is_release(&policy.release_configuration);

    match format {
        DescriptorFormat::Legacy => resolve_legacy(files, revision, release, policy),
        DescriptorFormat::Modern => {
            resolve_modern(files, &descriptor_text, revision, release, policy)
        }
    }
}

fn resolve_legacy(
    files: &ProjectFiles,
    revision: RevisionCount,
    release: bool,
    policy: &PolicyConfig,
) -> Result<VersionPlan> {
    let metadata = files.legacy_metadata();
    let text = fs::read_to_string(&metadata)?;

    let raw = attribute_value(&text, ASSEMBLY_VERSION).ok_or_else(|| {
        ChangeRevisionError::malformed(format!(
            "no {} declaration in {}",
            ASSEMBLY_VERSION,
            metadata.display()
        ))
    })?;
    let current = AssemblyVersion::parse(&raw)?;
    let next = current.next(revision, release, policy.release_increment)?;
    info!(%current, %next, "resolved legacy version");

    let value = next.to_string();
    let rules = vec![
        Substitution::attribute(ASSEMBLY_VERSION, value.clone())?,
        Substitution::attribute(ASSEMBLY_FILE_VERSION, value)?,
    ];

    Ok(VersionPlan {
        format: DescriptorFormat::Legacy,
        current,
        next,
        package: None,
        targets: vec![PatchTarget {
            path: metadata,
            rules,
        }],
        warnings: Vec::new(),
    })
}

fn resolve_modern(
    files: &ProjectFiles,
    descriptor_text: &str,
    revision: RevisionCount,
    release: bool,
    policy: &PolicyConfig,
) -> Result<VersionPlan> {
    let descriptor = &files.descriptor;
    let raw = require_element(descriptor_text, ASSEMBLY_VERSION, descriptor)?;
    require_element(descriptor_text, FILE_VERSION, descriptor)?;

    let current = AssemblyVersion::parse(&raw)?;
    let next = current.next(revision, release, policy.release_increment)?;
    info!(%current, %next, "resolved project version");

    let value = next.to_string();
    let mut rules = vec![
        Substitution::element(ASSEMBLY_VERSION, value.clone())?,
        Substitution::element(FILE_VERSION, value)?,
    ];
    let mut targets = Vec::new();
    let mut warnings = Vec::new();

    let package = if generates_package(descriptor_text) {
        let package = PackageVersion::for_build(next, release, &policy.prerelease_tag)?;
        debug!(%package, "package generation enabled");

        let mut has_package_element = false;
        for name in PACKAGE_VERSION_ELEMENTS {
            let rule = Substitution::element(name, package.to_string())?;
            if rule.matches(descriptor_text) {
                has_package_element = true;
                rules.push(rule);
            }
        }
        if !has_package_element {
            warnings.push(BoundaryWarning::PackageVersionElementMissing {
                descriptor: descriptor.clone(),
            });
        }

        if let Some(manifest) = files.find_manifest()? {
            let rule = Substitution::element(MANIFEST_VERSION, package.to_string())?;
            if rule.matches(&fs::read_to_string(&manifest)?) {
                targets.push(PatchTarget {
                    path: manifest,
                    rules: vec![rule],
                });
            } else {
                warnings.push(BoundaryWarning::ManifestVersionMissing { manifest });
            }
        }

        Some(package)
    } else {
        None
    };

    targets.insert(
        0,
        PatchTarget {
            path: descriptor.clone(),
            rules,
        },
    );

    Ok(VersionPlan {
        format: DescriptorFormat::Modern,
        current,
        next,
        package,
        targets,
        warnings,
    })
}

fn require_element(text: &str, name: &str, descriptor: &Path) -> Result<String> {
    element_value(text, name).ok_or_else(|| {
        ChangeRevisionError::missing_element(format!("<{}> in {}", name, descriptor.display()))
    })
}

fn generates_package(descriptor_text: &str) -> bool {
    element_value(descriptor_text, GENERATE_PACKAGE)
        .map(|value| value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Write every target of the plan, descriptor first.
///
/// Targets are written independently: a failure on a later target leaves the
/// earlier ones updated.
pub fn apply_plan(plan: &VersionPlan, dry_run: bool) -> Result<Vec<PatchOutcome>> {
    plan.targets
        .iter()
        .map(|target| patcher::patch_file(&target.path, &target.rules, dry_run))
        .collect()
}
