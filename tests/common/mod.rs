// Shared helpers for integration tests
#![allow(dead_code)]

use git2::{Repository, Signature};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub fn fixture_dir(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).expect("Could not create directory");
    for entry in fs::read_dir(from).expect("Could not read fixture directory") {
        let entry = entry.expect("Could not read fixture entry");
        let target = to.join(entry.file_name());
        if entry.path().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), &target).expect("Could not copy fixture file");
        }
    }
}

/// Copy `tests/fixtures/<name>` into a fresh temp dir.
pub fn copy_fixture(name: &str) -> TempDir {
    let temp_dir = TempDir::new().expect("Could not create temp dir");
    copy_dir(&fixture_dir(name), temp_dir.path());
    temp_dir
}

/// Initialise a repository on `master` with `commits` empty commits.
pub fn init_repo(path: &Path, commits: usize) -> Repository {
    let repo = Repository::init(path).expect("Could not init git repo");
    repo.set_head("refs/heads/master")
        .expect("Could not point HEAD at master");

    let sig = Signature::now("Test User", "test@example.com").expect("Could not create signature");
    for i in 0..commits {
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(
            Some("HEAD"),
            &sig,
            &sig,
            &format!("commit {}", i),
            &tree,
            &parents,
        )
        .expect("Could not commit");
    }
    repo
}

/// Write an executable stand-in for the git client answering `branch` and
/// `rev-list` with canned output.
#[cfg(unix)]
pub fn fake_git(dir: &Path, listing: &str, count: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    fs::create_dir_all(dir).unwrap();
    let script = dir.join("git");
    fs::write(
        &script,
        format!(
            "#!/bin/sh\ncase \"$1\" in\n  branch) printf '{}' ;;\n  rev-list) echo {} ;;\nesac\n",
            listing, count
        ),
    )
    .unwrap();
    let mut perms = fs::metadata(&script).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&script, perms).unwrap();
    script
}
