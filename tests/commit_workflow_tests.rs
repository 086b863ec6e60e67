mod common;

use common::{commit_file, git, subjects, write_file, Fixture};
use steward::config::Settings;
use steward::error::CliError;
use steward::git::{CommitOrchestrator, GitRepo};
use steward::input::{parse_commit_spec, AssumeYes, CommitSpec, SpecFields};

fn spec(raw: &str) -> CommitSpec {
    parse_commit_spec(
        &SpecFields::default(),
        Some(raw),
        &Settings::default().commit_scopes,
    )
    .unwrap()
}

fn files_in(dir: &std::path::Path, rev: &str) -> Vec<String> {
    let mut files: Vec<String> = git(dir, &["show", "--name-only", "--format=", rev])
        .lines()
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();
    files.sort();
    files
}

#[test]
fn test_commits_one_group_per_directory() {
    let fixture = Fixture::new();
    let path = fixture.path();
    write_file(path, "src/a.rs", "pub fn a() {}\n");
    write_file(path, "src/b.rs", "pub fn b() {}\n");
    write_file(path, "docs/guide.md", "# Guide\n");
    write_file(path, "README.md", "# Readme\n");

    let repo = GitRepo::discover(path).unwrap();
    let orchestrator = CommitOrchestrator::new(&repo, &AssumeYes, "origin");
    let outcomes = orchestrator.run(&spec("feat,utils,Document|Add readme")).unwrap();

    let groups: Vec<&str> = outcomes.iter().map(|o| o.group.as_str()).collect();
    assert_eq!(groups, vec!["docs", "root", "src"]);

    assert_eq!(
        subjects(path, "HEAD~3..HEAD"),
        vec![
            "feat(utils): Add readme",
            "feat(utils): Add readme",
            "feat(utils): Document"
        ]
    );
    assert_eq!(files_in(path, "HEAD"), vec!["src/a.rs", "src/b.rs"]);
    assert_eq!(files_in(path, "HEAD~1"), vec!["README.md"]);
    assert_eq!(files_in(path, "HEAD~2"), vec!["docs/guide.md"]);

    assert!(repo.changes().unwrap().is_empty());
    assert_eq!(
        fixture.remote_git(&["rev-parse", "develop"]),
        git(path, &["rev-parse", "HEAD"])
    );
}

#[test]
fn test_wildcard_scope_makes_a_single_commit() {
    let fixture = Fixture::new();
    let path = fixture.path();
    write_file(path, "src/a.rs", "a\n");
    write_file(path, "tests/b.rs", "b\n");
    write_file(path, "Cargo.toml", "[package]\n");

    let repo = GitRepo::discover(path).unwrap();
    let outcomes = CommitOrchestrator::new(&repo, &AssumeYes, "origin")
        .run(&spec("chore,*,Tidy up,Everything at once"))
        .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].group, "*");
    assert_eq!(
        git(path, &["log", "-1", "--format=%B"]),
        "chore(all): Tidy up\n\nEverything at once"
    );
    assert_eq!(
        files_in(path, "HEAD"),
        vec!["Cargo.toml", "src/a.rs", "tests/b.rs"]
    );
}

#[test]
fn test_deletions_and_modifications_are_staged() {
    let fixture = Fixture::new();
    let path = fixture.path();
    commit_file(path, "src/old.rs", "old\n", "feat: old");
    commit_file(path, "src/kept.rs", "v1\n", "feat: kept");

    std::fs::remove_file(path.join("src/old.rs")).unwrap();
    write_file(path, "src/kept.rs", "v2\n");
    write_file(path, "src/new.rs", "new\n");

    let repo = GitRepo::discover(path).unwrap();
    let outcomes = CommitOrchestrator::new(&repo, &AssumeYes, "origin")
        .run(&spec("refactor,core,Rework module"))
        .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(
        files_in(path, "HEAD"),
        vec!["src/kept.rs", "src/new.rs", "src/old.rs"]
    );
    assert!(!path.join("src/old.rs").exists());
    assert!(repo.is_clean().unwrap());
    assert!(repo.changes().unwrap().is_empty());
}

#[test]
fn test_nested_directories_are_separate_groups() {
    let fixture = Fixture::new();
    let path = fixture.path();
    write_file(path, "src/lib.rs", "lib\n");
    write_file(path, "src/git/mod.rs", "mod\n");

    let repo = GitRepo::discover(path).unwrap();
    let outcomes = CommitOrchestrator::new(&repo, &AssumeYes, "origin")
        .run(&spec("feat,core,Split"))
        .unwrap();

    let groups: Vec<&str> = outcomes.iter().map(|o| o.group.as_str()).collect();
    assert_eq!(groups, vec!["src", "src/git"]);
    assert_eq!(files_in(path, "HEAD"), vec!["src/git/mod.rs"]);
    assert_eq!(files_in(path, "HEAD~1"), vec!["src/lib.rs"]);
}

#[cfg(unix)]
#[test]
fn test_failing_group_does_not_stop_the_batch() {
    use std::os::unix::fs::PermissionsExt;

    let fixture = Fixture::new();
    let path = fixture.path();
    std::fs::create_dir_all(path.join(".git/hooks")).unwrap();
    let hook = path.join(".git/hooks/pre-commit");
    std::fs::write(
        &hook,
        "#!/bin/sh\nif git diff --cached --name-only | grep -q '^docs/'; then\n  echo 'docs are frozen' >&2\n  exit 1\nfi\nexit 0\n",
    )
    .unwrap();
    std::fs::set_permissions(&hook, std::fs::Permissions::from_mode(0o755)).unwrap();

    write_file(path, "docs/guide.md", "# Guide\n");
    write_file(path, "src/a.rs", "a\n");

    let repo = GitRepo::discover(path).unwrap();
    let outcomes = CommitOrchestrator::new(&repo, &AssumeYes, "origin")
        .run(&spec("feat,core,Docs|Code"))
        .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].group, "src");
    assert_eq!(outcomes[0].message, "feat(core): Code");
    assert_eq!(files_in(path, "HEAD"), vec!["src/a.rs"]);

    let remaining: Vec<String> = repo
        .changes()
        .unwrap()
        .into_iter()
        .map(|c| c.path)
        .collect();
    assert_eq!(remaining, vec!["docs/guide.md"]);
}

#[test]
fn test_push_failure_keeps_local_commit_but_reports_nothing() {
    let repo_dir = common::setup_repo();
    let path = repo_dir.path();
    write_file(path, "src/a.rs", "a\n");

    let repo = GitRepo::discover(path).unwrap();
    let outcomes = CommitOrchestrator::new(&repo, &AssumeYes, "origin")
        .run(&spec("fix,core,Local only"))
        .unwrap();

    assert!(outcomes.is_empty());
    assert_eq!(subjects(path, "-1"), vec!["fix(core): Local only"]);
}

#[test]
fn test_clean_tree_has_nothing_to_commit() {
    let fixture = Fixture::new();
    let repo = GitRepo::discover(fixture.path()).unwrap();
    let result = CommitOrchestrator::new(&repo, &AssumeYes, "origin").run(&spec("feat,core,x"));
    assert!(matches!(result, Err(CliError::NothingToCommit)));
}

#[test]
fn test_staged_then_removed_files_are_left_out() {
    let fixture = Fixture::new();
    let path = fixture.path();
    write_file(path, "src/ghost.rs", "gone\n");
    write_file(path, "tmp/scratch.rs", "gone\n");
    git(path, &["add", "src/ghost.rs", "tmp/scratch.rs"]);
    std::fs::remove_file(path.join("src/ghost.rs")).unwrap();
    std::fs::remove_file(path.join("tmp/scratch.rs")).unwrap();
    write_file(path, "src/real.rs", "pub fn real() {}\n");

    let repo = GitRepo::discover(path).unwrap();
    let head_before = git(path, &["rev-parse", "HEAD"]);
    let orchestrator = CommitOrchestrator::new(&repo, &AssumeYes, "origin");
    let outcomes = orchestrator.run(&spec("feat,utils,Add real")).unwrap();

    let groups: Vec<&str> = outcomes.iter().map(|o| o.group.as_str()).collect();
    assert_eq!(groups, vec!["src"]);
    assert_eq!(git(path, &["rev-parse", "HEAD~1"]), head_before);
    assert_eq!(files_in(path, "HEAD"), vec!["src/real.rs"]);
    assert!(repo.changes().unwrap().is_empty());
}
