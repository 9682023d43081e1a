//! Main workflow orchestration logic
//!
//! Wires the components together in order: repository access, branch
//! listing and guard, commit count, version resolution, file patching. Kept
//! apart from `main.rs` so the workflow can run against any
//! [Repository] without clap.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::boundary::BoundaryWarning;
use crate::config::{Backend, Config};
use crate::domain::{
    current_branch, is_on_branch, AssemblyVersion, BuildContext, PackageVersion, RevisionCount,
};
use crate::error::{ChangeRevisionError, Result};
use crate::git::{CliRepository, Git2Repository, Repository};
use crate::locator::BinaryLocator;
use crate::patcher::PatchOutcome;
use crate::project::{DescriptorFormat, ProjectFiles};
use crate::resolver;

/// Arguments for the bump workflow
#[derive(Debug, Clone, PartialEq)]
pub struct BumpArgs {
    pub context: BuildContext,

    /// Directory the tool was started from (a project or build output dir)
    pub working_dir: PathBuf,

    /// Resolve and report without writing files
    pub dry_run: bool,
}

/// Result of a successful bump
#[derive(Debug, Clone)]
pub struct BumpOutcome {
    pub format: DescriptorFormat,
    pub previous: AssemblyVersion,
    pub version: AssemblyVersion,
    pub package: Option<PackageVersion>,
    pub revision: RevisionCount,
    pub patched: Vec<PatchOutcome>,
    pub warnings: Vec<BoundaryWarning>,
}

/// Open the repository backend selected in the configuration.
///
/// For the subprocess backend the client is located on the search path
/// first; when it cannot be found no process is started.
pub fn open_repository(config: &Config, working_dir: &Path) -> Result<Box<dyn Repository>> {
    match config.git.backend {
        Backend::Cli => {
            let client = BinaryLocator::from_env()?.locate(
                &config.git.path_filter,
                &config.git.executable_name(),
                config.git.path_match,
            )?;
            info!(client = %client.display(), "located git client");
            Ok(Box::new(CliRepository::new(
                client,
                working_dir,
                config.git.timeout(),
            )))
        }
        Backend::Libgit2 => Ok(Box::new(Git2Repository::open(working_dir)?)),
    }
}

/// Main bump workflow
///
/// 1. Read the branch listing and apply the primary-branch policy
/// 2. Read the commit count of the primary branch
/// 3. Locate the project and resolve the new version
/// 4. Patch the descriptor (and manifest)
///
/// Any failure before step 4 leaves every file untouched.
pub fn run_bump(repo: &dyn Repository, args: &BumpArgs, config: &Config) -> Result<BumpOutcome> {
    let primary = &config.git.primary_branch;
    let mut warnings = Vec::new();

    let listing = repo.branch_listing()?;
    if !is_on_branch(&listing, primary) {
        if config.policy.branch_policy().is_enforced() {
            return Err(ChangeRevisionError::NotOnPrimaryBranch(primary.clone()));
        }
        warnings.push(BoundaryWarning::NotOnPrimaryBranch {
            primary: primary.clone(),
            current: current_branch(&listing).map(str::to_string),
        });
    }

    let count_output = repo.revision_count(primary)?;
    warnings.extend(repo.take_warnings());
    let revision = RevisionCount::parse(&count_output)?;
    info!(%revision, branch = %primary, "measured revision count");

    let files = ProjectFiles::locate(&args.working_dir, &args.context)?;
    let plan = resolver::resolve(&files, &args.context, revision, &config.policy)?;
    let patched = resolver::apply_plan(&plan, args.dry_run)?;

    warnings.extend(plan.warnings.iter().cloned());

    Ok(BumpOutcome {
        format: plan.format,
        previous: plan.current,
        version: plan.next,
        package: plan.package,
        revision,
        patched,
        warnings,
    })
}
