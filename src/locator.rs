//! Locating the version control client on the executable search path.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::debug;

use crate::error::{ChangeRevisionError, Result};

/// Name of the environment variable holding the executable search path.
pub const SEARCH_PATH_VAR: &str = "PATH";

/// Which entry wins when several search-path directories qualify.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// The earliest entry, as a shell would resolve it
    #[default]
    First,
    /// The latest entry
    Last,
    /// Exactly one entry must qualify
    Unique,
}

/// Scans a search path for a directory matching `search_for` and, when given,
/// holding `binary_name`.
///
/// The substring test is case-insensitive; an empty `search_for` matches every
/// entry. Entries are split with the platform path separator.
///
/// # Returns
/// * `Ok(Some(dir))` - The qualifying directory
/// * `Ok(None)` - No entry qualifies
/// * `Err` - `Unique` was requested and several entries qualify
pub fn find_in_search_path(
    search_path: &OsString,
    search_for: &str,
    binary_name: Option<&str>,
    strategy: MatchStrategy,
) -> Result<Option<PathBuf>> {
    let needle = search_for.to_lowercase();

    let mut candidates = std::env::split_paths(search_path)
        .filter(|dir| !dir.as_os_str().is_empty())
        .filter(|dir| dir.to_string_lossy().to_lowercase().contains(&needle))
        .filter(|dir| match binary_name {
            Some(name) => dir.join(name).is_file(),
            None => true,
        })
        .inspect(|dir| debug!(dir = %dir.display(), "search path entry qualifies"));

    let found = match strategy {
        MatchStrategy::First => candidates.next(),
        MatchStrategy::Last => candidates.last(),
        MatchStrategy::Unique => {
            let all: Vec<PathBuf> = candidates.collect();
            if all.len() > 1 {
                let listed: Vec<String> = all.iter().map(|d| d.display().to_string()).collect();
                return Err(ChangeRevisionError::client_not_found(format!(
                    "ambiguous search path, {} entries qualify: {}",
                    all.len(),
                    listed.join(", ")
                )));
            }
            all.into_iter().next()
        }
    };

    Ok(found)
}

/// Reads the executable search path from the environment.
pub fn read_search_path() -> Result<OsString> {
    match std::env::var_os(SEARCH_PATH_VAR) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ChangeRevisionError::SearchPathUnavailable(format!(
            "{} is not set",
            SEARCH_PATH_VAR
        ))),
    }
}

/// Resolves the full path of a client executable from the search path.
pub struct BinaryLocator {
    search_path: OsString,
}

impl BinaryLocator {
    pub fn new(search_path: OsString) -> Self {
        BinaryLocator { search_path }
    }

    /// Creates a locator over the process environment's search path.
    pub fn from_env() -> Result<Self> {
        Ok(BinaryLocator::new(read_search_path()?))
    }

    /// Returns the full path of `binary_name` inside the qualifying directory.
    pub fn locate(
        &self,
        search_for: &str,
        binary_name: &str,
        strategy: MatchStrategy,
    ) -> Result<PathBuf> {
        let dir = find_in_search_path(&self.search_path, search_for, Some(binary_name), strategy)?
            .ok_or_else(|| {
                ChangeRevisionError::client_not_found(format!(
                    "no {} entry containing '{}' holds {}",
                    SEARCH_PATH_VAR, search_for, binary_name
                ))
            })?;

        Ok(dir.join(binary_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn search_path_of(dirs: &[&Path]) -> OsString {
        std::env::join_paths(dirs).unwrap()
    }

    fn dir_with_binary(root: &TempDir, name: &str, binary: &str) -> PathBuf {
        let dir = root.path().join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(binary), b"").unwrap();
        dir
    }

    #[test]
    fn test_first_and_last_match() {
        let root = TempDir::new().unwrap();
        let a = dir_with_binary(&root, "Git-A", "git");
        let b = dir_with_binary(&root, "git-b", "git");
        let path = search_path_of(&[&a, &b]);

        let first = find_in_search_path(&path, "git", Some("git"), MatchStrategy::First).unwrap();
        assert_eq!(first, Some(a));

        let last = find_in_search_path(&path, "GIT", Some("git"), MatchStrategy::Last).unwrap();
        assert_eq!(last, Some(b));
    }

    #[test]
    fn test_unique_rejects_ambiguity() {
        let root = TempDir::new().unwrap();
        let a = dir_with_binary(&root, "git-a", "git");
        let b = dir_with_binary(&root, "git-b", "git");
        let path = search_path_of(&[&a, &b]);

        let err = find_in_search_path(&path, "git", Some("git"), MatchStrategy::Unique).unwrap_err();
        assert!(err.to_string().contains("ambiguous"));
    }

    #[test]
    fn test_substring_without_binary() {
        let root = TempDir::new().unwrap();
        let tools = root.path().join("tools");
        let git = root.path().join("git-cmd");
        fs::create_dir_all(&tools).unwrap();
        fs::create_dir_all(&git).unwrap();
        let path = search_path_of(&[&tools, &git]);

        let found = find_in_search_path(&path, "GIT-CMD", None, MatchStrategy::First).unwrap();
        assert_eq!(found, Some(git));
    }

    #[test]
    fn test_matching_dir_without_binary_is_skipped() {
        let root = TempDir::new().unwrap();
        let empty = root.path().join("git-empty");
        fs::create_dir_all(&empty).unwrap();
        let path = search_path_of(&[&empty]);

        let found = find_in_search_path(&path, "git", Some("git"), MatchStrategy::Last).unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn test_locator_joins_binary() {
        let root = TempDir::new().unwrap();
        let dir = dir_with_binary(&root, "bin", "git");
        let locator = BinaryLocator::new(search_path_of(&[&dir]));

        let client = locator.locate("", "git", MatchStrategy::First).unwrap();
        assert_eq!(client, dir.join("git"));
    }

    #[test]
    fn test_locator_reports_client_not_found() {
        let root = TempDir::new().unwrap();
        let dir = dir_with_binary(&root, "bin", "hg");
        let locator = BinaryLocator::new(search_path_of(&[&dir]));

        let err = locator.locate("", "git", MatchStrategy::First).unwrap_err();
        assert!(matches!(err, ChangeRevisionError::ClientNotFound(_)));
    }
}
