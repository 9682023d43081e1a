use crate::domain::branch::CURRENT_BRANCH_MARKER;
use crate::error::Result;
use git2::{BranchType, Repository as Git2Repo};
use std::path::Path;
use tracing::debug;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;
        debug!(path = %repo.path().display(), "opened repository");

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }
}

impl super::Repository for Git2Repository {
    fn branch_listing(&self) -> Result<String> {
        let mut names = Vec::new();
        for entry in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = entry?;
            if let Some(name) = branch.name()? {
                names.push((name.to_string(), branch.is_head()));
            }
        }
        names.sort();

        let mut listing = String::new();
        for (name, is_head) in names {
            if is_head {
                listing.push(CURRENT_BRANCH_MARKER);
                listing.push(' ');
            } else {
                listing.push_str("  ");
            }
            listing.push_str(&name);
            listing.push('\n');
        }

        Ok(listing)
    }

    fn revision_count(&self, branch: &str) -> Result<String> {
        let head = self
            .repo
            .find_branch(branch, BranchType::Local)?
            .get()
            .peel_to_commit()?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.push(head.id())?;

        let mut count: u64 = 0;
        for oid in revwalk {
            oid?;
            count += 1;
        }

        Ok(format!("{}\n", count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::Repository;
    use git2::Signature;
    use tempfile::TempDir;

    fn commit(repo: &Git2Repo, message: &str) {
        let sig = Signature::now("Test Author", "test@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap();
    }

    fn repo_with_commits(n: usize) -> (TempDir, Git2Repo) {
        let dir = TempDir::new().unwrap();
        let repo = Git2Repo::init(dir.path()).unwrap();
        repo.set_head("refs/heads/master").unwrap();
        for i in 0..n {
            commit(&repo, &format!("commit {}", i));
        }
        (dir, repo)
    }

    #[test]
    fn test_revision_count_and_listing() {
        let (dir, repo) = repo_with_commits(3);
        let head = repo.head().unwrap().peel_to_commit().unwrap();
        repo.branch("develop", &head, false).unwrap();

        let wrapped = Git2Repository::open(dir.path()).unwrap();
        assert_eq!(wrapped.revision_count("master").unwrap(), "3\n");
        assert_eq!(wrapped.branch_listing().unwrap(), "  develop\n* master\n");
    }

    #[test]
    fn test_unknown_branch_is_error() {
        let (_dir, repo) = repo_with_commits(1);
        let wrapped = Git2Repository::from_git2(repo);
        assert!(wrapped.revision_count("release").is_err());
    }
}
