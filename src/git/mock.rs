use crate::boundary::BoundaryWarning;
use crate::error::{ChangeRevisionError, Result};
use crate::git::Repository;
use std::cell::RefCell;
use std::collections::HashMap;

/// Mock repository for testing without a git client or repository
pub struct MockRepository {
    listing: String,
    counts: HashMap<String, String>,
    calls: RefCell<Vec<String>>,
    warnings: RefCell<Vec<BoundaryWarning>>,
}

impl MockRepository {
    /// Create a new mock with an empty branch listing
    pub fn new() -> Self {
        MockRepository {
            listing: String::new(),
            counts: HashMap::new(),
            calls: RefCell::new(Vec::new()),
            warnings: RefCell::new(Vec::new()),
        }
    }

    /// Mock checked out on `branch` whose commit count output is `count`
    pub fn on_branch(branch: &str, count: impl Into<String>) -> Self {
        let mut repo = MockRepository::new();
        repo.set_listing(format!("* {}\n", branch));
        repo.set_revision_count(branch, count);
        repo
    }

    /// Set the raw branch listing text
    pub fn set_listing(&mut self, listing: impl Into<String>) {
        self.listing = listing.into();
    }

    /// Set the raw commit count output for a branch
    pub fn set_revision_count(&mut self, branch: impl Into<String>, output: impl Into<String>) {
        self.counts.insert(branch.into(), output.into());
    }

    /// Queue a warning to be handed out by `take_warnings`
    pub fn push_warning(&self, warning: BoundaryWarning) {
        self.warnings.borrow_mut().push(warning);
    }

    /// Operations invoked so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn branch_listing(&self) -> Result<String> {
        self.calls.borrow_mut().push("branch".to_string());
        Ok(self.listing.clone())
    }

    fn revision_count(&self, branch: &str) -> Result<String> {
        self.calls
            .borrow_mut()
            .push(format!("rev-list {} --count", branch));
        self.counts.get(branch).cloned().ok_or_else(|| {
            ChangeRevisionError::malformed(format!("unknown branch '{}'", branch))
        })
    }

    fn take_warnings(&self) -> Vec<BoundaryWarning> {
        self.warnings.take()
    }
}
