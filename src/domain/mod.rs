//! Domain logic - pure version and branch rules independent of the file system
//! and the version control client

pub mod branch;
pub mod package;
pub mod version;

pub use branch::{current_branch, is_on_branch, BranchPolicy};
pub use package::PackageVersion;
pub use version::{AssemblyVersion, BuildContext, ReleaseIncrement, RevisionCount};
