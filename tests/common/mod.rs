#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::process::Command as StdCommand;
use std::sync::Once;
use tempfile::{tempdir, TempDir};

static INIT: Once = Once::new();

pub fn setup_test_env() {
    INIT.call_once(|| {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off"))
            .is_test(true)
            .init();
    });
}

/// Runs git in `dir` and returns trimmed stdout, panicking on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = StdCommand::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

pub fn git_succeeds(dir: &Path, args: &[&str]) -> bool {
    StdCommand::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

pub fn write_file(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

pub fn commit_file(dir: &Path, relative: &str, content: &str, message: &str) {
    write_file(dir, relative, content);
    git(dir, &["add", "--", relative]);
    git(dir, &["commit", "-q", "-m", message]);
}

pub fn empty_commit(dir: &Path, message: &str) {
    git(dir, &["commit", "-q", "--allow-empty", "-m", message]);
}

pub fn subjects(dir: &Path, rev: &str) -> Vec<String> {
    git(dir, &["log", "--format=%s", rev])
        .lines()
        .map(String::from)
        .collect()
}

/// A repository on `main` with one empty commit and no remote.
pub fn setup_repo() -> TempDir {
    setup_test_env();

    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path();
    git(path, &["init", "-q"]);
    git(path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(path, &["config", "user.name", "Test User"]);
    git(path, &["config", "user.email", "test@example.com"]);
    git(path, &["config", "commit.gpgsign", "false"]);
    git(path, &["config", "tag.gpgsign", "false"]);
    empty_commit(path, "chore: init");
    dir
}

/// A working copy plus a bare `origin`, with `main` and `develop` pushed.
/// The working copy is left on `develop`.
pub struct Fixture {
    pub remote: TempDir,
    pub work: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let work = setup_repo();
        let remote = tempdir().expect("Failed to create remote directory");
        git(remote.path(), &["init", "-q", "--bare"]);
        git(remote.path(), &["symbolic-ref", "HEAD", "refs/heads/main"]);

        let remote_url = remote.path().to_string_lossy().to_string();
        let path = work.path();
        git(path, &["remote", "add", "origin", &remote_url]);
        git(path, &["push", "-q", "-u", "origin", "main"]);
        git(path, &["checkout", "-q", "-b", "develop"]);
        git(path, &["push", "-q", "-u", "origin", "develop"]);

        Fixture { remote, work }
    }

    pub fn path(&self) -> &Path {
        self.work.path()
    }

    /// Runs git against the bare remote.
    pub fn remote_git(&self, args: &[&str]) -> String {
        git(self.remote.path(), args)
    }

    pub fn remote_tags(&self) -> Vec<String> {
        let listing = self.remote_git(&["tag", "--list"]);
        listing.lines().map(String::from).collect()
    }

    pub fn remote_has_branch(&self, branch: &str) -> bool {
        git_succeeds(
            self.remote.path(),
            &["rev-parse", "--verify", "-q", &format!("refs/heads/{}", branch)],
        )
    }

    /// Starts `branch` from `develop` and pushes it.
    pub fn feature_branch(&self, branch: &str) {
        git(self.path(), &["checkout", "-q", "-b", branch, "develop"]);
        git(self.path(), &["push", "-q", "-u", "origin", branch]);
    }
}
