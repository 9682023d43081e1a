/// Marker the client prints in front of the checked-out branch.
pub const CURRENT_BRANCH_MARKER: char = '*';

/// What to do when the checkout is not on the primary branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BranchPolicy {
    /// Abort the version bump
    Enforce,
    /// Always proceed
    #[default]
    Ignore,
}

impl BranchPolicy {
    pub fn is_enforced(&self) -> bool {
        matches!(self, BranchPolicy::Enforce)
    }
}

/// Check whether `branch` is the checked-out branch in a branch listing.
///
/// The listing has one branch per line with the current one written as
/// `* <name>`. Line endings may be `\n` or `\r\n`.
pub fn is_on_branch(listing: &str, branch: &str) -> bool {
    let expected = format!("{} {}", CURRENT_BRANCH_MARKER, branch);
    listing
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .any(|line| line == expected)
}

/// Name of the checked-out branch in a branch listing, if any.
pub fn current_branch(listing: &str) -> Option<&str> {
    let prefix = format!("{} ", CURRENT_BRANCH_MARKER);
    listing
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .find_map(|line| line.strip_prefix(prefix.as_str()))
}
