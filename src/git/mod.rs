//! Git operations abstraction layer
//!
//! The version bump needs two facts from the repository: which branch is
//! checked out, and how many commits the primary branch has. The
//! [Repository] trait exposes both in the text format the git client prints,
//! so the branch guard and the revision parser work the same whichever
//! implementation produced them:
//!
//! - [cli::CliRepository]: runs the located git client as a subprocess
//! - [repository::Git2Repository]: reads the repository in-process with `git2`
//! - [mock::MockRepository]: canned output for tests

pub mod cli;
pub mod mock;
pub mod repository;

pub use cli::CliRepository;
pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::boundary::BoundaryWarning;
use crate::error::Result;

/// Common git operation trait for abstraction
///
/// ## Output format
///
/// Both methods return raw text rather than parsed values. Empty text is a
/// valid answer (for example when the client timed out); callers decide
/// whether that is fatal.
pub trait Repository {
    /// Branch listing, one branch per line, the current one as `* <name>`
    ///
    /// Equivalent to the output of `git branch`.
    fn branch_listing(&self) -> Result<String>;

    /// Number of commits reachable from `branch`, as text
    ///
    /// Equivalent to the output of `git rev-list <branch> --count`.
    fn revision_count(&self, branch: &str) -> Result<String>;

    /// Non-fatal conditions met by the calls so far; draining.
    fn take_warnings(&self) -> Vec<BoundaryWarning> {
        Vec::new()
    }
}
