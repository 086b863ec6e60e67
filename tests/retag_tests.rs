mod common;

use common::{empty_commit, git, Fixture};
use std::path::Path;
use steward::config::Settings;
use steward::error::CliError;
use steward::git::{GitRepo, ReleaseClassifier, TagRebuilder};

fn commit_on(path: &Path, message: &str) -> String {
    empty_commit(path, message);
    git(path, &["rev-parse", "HEAD"])
}

fn tag_target(path: &Path, tag: &str) -> String {
    git(path, &["rev-parse", &format!("{}^{{commit}}", tag)])
}

fn sorted_lines(output: String) -> Vec<String> {
    let mut lines: Vec<String> = output.lines().map(String::from).collect();
    lines.sort();
    lines
}

struct History {
    fixture: Fixture,
    feature_a: String,
    releases: Vec<String>,
}

/// `main` carries three release commits, one side-branch commit that only
/// reaches it through a merge, and a mix of legacy and semantic tags.
fn history() -> History {
    let fixture = Fixture::new();
    let path = fixture.path();
    git(path, &["checkout", "-q", "main"]);

    let feature_a = commit_on(path, "feat(core): a");
    let one = commit_on(path, "chore(release): one");
    git(path, &["tag", "2021-01-05", "HEAD"]);
    commit_on(path, "fix(cli): b");
    let two = commit_on(path, "Release two");
    git(path, &["tag", "-a", "release-2021-02-01", "-m", "old", "HEAD"]);

    git(path, &["checkout", "-q", "-b", "side"]);
    commit_on(path, "docs: release notes draft");
    git(path, &["checkout", "-q", "main"]);
    git(path, &["merge", "-q", "--no-ff", "-m", "feat(core): merge side work", "side"]);

    let three = commit_on(path, "release three");
    git(path, &["tag", "v9.9.9", "HEAD"]);
    git(path, &["tag", "keep-me", "HEAD~1"]);

    git(path, &["push", "-q", "origin", "main"]);
    git(path, &["push", "-q", "origin", "--tags"]);
    git(path, &["checkout", "-q", "develop"]);

    History {
        fixture,
        feature_a,
        releases: vec![one, two, three],
    }
}

#[test]
fn test_rebuild_produces_sequential_tags() {
    let history = history();
    let path = history.fixture.path();
    let repo = GitRepo::discover(path).unwrap();
    let settings = Settings::default();
    let classifier = ReleaseClassifier::from_settings(&settings, &[]).unwrap();

    let created = TagRebuilder::new(&repo, &settings, classifier)
        .rebuild()
        .unwrap();

    let tags: Vec<String> = created.iter().map(|r| r.tag()).collect();
    assert_eq!(tags, vec!["v0.0.1", "v0.0.2", "v0.0.3"]);
    for (i, hash) in history.releases.iter().enumerate() {
        assert_eq!(&tag_target(path, &format!("v0.0.{}", i + 1)), hash);
    }
    assert_eq!(
        git(path, &["tag", "-l", "--format=%(contents:subject)", "v0.0.2"]),
        "Release v0.0.2"
    );

    let expected = vec!["keep-me", "v0.0.1", "v0.0.2", "v0.0.3"];
    assert_eq!(sorted_lines(git(path, &["tag", "--list"])), expected);
    assert_eq!(
        sorted_lines(history.fixture.remote_git(&["tag", "--list"])),
        expected
    );
}

#[test]
fn test_override_commits_are_tagged_in_order() {
    let history = history();
    let path = history.fixture.path();
    let repo = GitRepo::discover(path).unwrap();
    let settings = Settings::default();
    let short = history.feature_a[..10].to_string();
    let classifier = ReleaseClassifier::from_settings(&settings, &[short]).unwrap();

    let created = TagRebuilder::new(&repo, &settings, classifier)
        .rebuild()
        .unwrap();

    assert_eq!(created.len(), 4);
    assert_eq!(tag_target(path, "v0.0.1"), history.feature_a);
    assert_eq!(tag_target(path, "v0.0.4"), history.releases[2]);
}

#[test]
fn test_no_release_commits_is_fatal() {
    let fixture = Fixture::new();
    let path = fixture.path();
    git(path, &["checkout", "-q", "main"]);
    commit_on(path, "feat(core): nothing to see");
    git(path, &["tag", "2020-12-31", "HEAD"]);
    git(path, &["checkout", "-q", "develop"]);

    let repo = GitRepo::discover(path).unwrap();
    let settings = Settings::default();
    let classifier = ReleaseClassifier::from_settings(&settings, &[]).unwrap();
    let result = TagRebuilder::new(&repo, &settings, classifier).rebuild();

    assert!(matches!(result, Err(CliError::NoReleaseCommits(ref b)) if b == "main"));
    assert!(repo.tags().unwrap().is_empty());
}

#[test]
fn test_unresolvable_staging_branch_is_rejected() {
    let history = history();
    let repo = GitRepo::discover(history.fixture.path()).unwrap();
    let settings = Settings {
        staging_branch: "does-not-exist".to_string(),
        ..Settings::default()
    };
    let classifier = ReleaseClassifier::from_settings(&settings, &[]).unwrap();
    let result = TagRebuilder::new(&repo, &settings, classifier).rebuild();

    assert!(matches!(result, Err(CliError::PreconditionError(_))));
    assert!(repo.tag_exists("2021-01-05").unwrap());
    assert!(repo.tag_exists("v9.9.9").unwrap());
}

#[cfg(unix)]
#[test]
fn test_rejected_remote_deletion_fails_the_rebuild() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let history = history();
    let hooks = history.fixture.remote.path().join("hooks");
    fs::create_dir_all(&hooks).unwrap();
    let hook = hooks.join("pre-receive");
    fs::write(
        &hook,
        "#!/bin/sh\nwhile read old new ref; do\n  [ \"$ref\" = refs/tags/2021-01-05 ] && exit 1\ndone\nexit 0\n",
    )
    .unwrap();
    fs::set_permissions(&hook, fs::Permissions::from_mode(0o755)).unwrap();

    let repo = GitRepo::discover(history.fixture.path()).unwrap();
    let settings = Settings::default();
    let classifier = ReleaseClassifier::from_settings(&settings, &[]).unwrap();
    let result = TagRebuilder::new(&repo, &settings, classifier).rebuild();

    assert!(matches!(result, Err(CliError::StateError(ref m)) if m.contains("2021-01-05")));
    assert!(history
        .fixture
        .remote_tags()
        .contains(&"2021-01-05".to_string()));
}
