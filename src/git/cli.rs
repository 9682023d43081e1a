use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::boundary::BoundaryWarning;
use crate::error::Result;
use crate::git::Repository;
use crate::process::ProcessRunner;

/// Repository backed by the git client executable
pub struct CliRepository {
    runner: ProcessRunner,
    working_dir: PathBuf,
    warnings: RefCell<Vec<BoundaryWarning>>,
}

impl CliRepository {
    /// Wrap a located client; invocations run in `working_dir` and each waits
    /// at most `timeout`.
    pub fn new(client: impl Into<PathBuf>, working_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        CliRepository {
            runner: ProcessRunner::new(client, timeout),
            working_dir: working_dir.into(),
            warnings: RefCell::new(Vec::new()),
        }
    }

    pub fn client(&self) -> &Path {
        self.runner.program()
    }

    fn capture(&self, args: &[&str]) -> Result<String> {
        let output = self.runner.run(args, &self.working_dir)?;
        if output.timed_out {
            self.warnings.borrow_mut().push(BoundaryWarning::ProcessTimedOut {
                command: format!("{} {}", self.runner.program().display(), args.join(" ")),
                captured: output.text.len(),
            });
        }
        Ok(output.text)
    }
}

impl Repository for CliRepository {
    fn branch_listing(&self) -> Result<String> {
        self.capture(&["branch"])
    }

    fn revision_count(&self, branch: &str) -> Result<String> {
        self.capture(&["rev-list", branch, "--count"])
    }

    fn take_warnings(&self) -> Vec<BoundaryWarning> {
        self.warnings.take()
    }
}
