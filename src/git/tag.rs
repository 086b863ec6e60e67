use super::pipeline::{Pipeline, Step};
use super::repository::{GitRepo, LogEntry};
use crate::config::{Settings, INITIAL_TAG, SEMVER_TAG_CANDIDATE_REGEX};
use crate::error::CliError;
use crate::logger;
use regex::Regex;
use semver::Version;
use std::cmp::Ordering;
use std::collections::BTreeSet;

const MIN_OVERRIDE_ID_LEN: usize = 7;

/// Total order over tag names: every semver-parsable tag ranks above every
/// unparsable one; parsable tags compare semantically, the rest by string.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let parse = |tag: &str| Version::parse(tag.trim_start_matches('v')).ok();
    match (parse(a), parse(b)) {
        (Some(a_version), Some(b_version)) => a_version.cmp(&b_version).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => a.cmp(b),
    }
}

/// Highest `v*.*.*`-shaped tag, if any.
pub fn latest_version_tag(tags: &[String]) -> Result<Option<String>, CliError> {
    let candidate = Regex::new(SEMVER_TAG_CANDIDATE_REGEX)?;
    let mut matching: Vec<&String> = tags.iter().filter(|t| candidate.is_match(t)).collect();
    matching.sort_by(|a, b| compare_versions(b, a));
    Ok(matching.first().map(|t| t.to_string()))
}

/// Patch bump of the highest version tag, or the initial tag when there is
/// none. Major and minor never change.
pub fn next_release_tag(tags: &[String]) -> Result<String, CliError> {
    let latest = match latest_version_tag(tags)? {
        Some(tag) => tag,
        None => return Ok(INITIAL_TAG.to_string()),
    };

    let parts: Vec<u64> = latest
        .trim_start_matches('v')
        .split('.')
        .map(|p| p.parse::<u64>())
        .collect::<Result<_, _>>()
        .map_err(|_| CliError::VersionFormatError(latest.clone()))?;

    match parts.as_slice() {
        [major, minor, patch] => Ok(format!("v{}.{}.{}", major, minor, patch + 1)),
        _ => Err(CliError::VersionFormatError(latest)),
    }
}

/// Fails with `TagExistsError` when `tag` is already in `existing`.
pub fn ensure_new_tag(existing: &[String], tag: &str) -> Result<(), CliError> {
    if existing.iter().any(|t| t == tag) {
        Err(CliError::TagExistsError(tag.to_string()))
    } else {
        Ok(())
    }
}

/// Decides which main-line commits were releases.
#[derive(Debug, Clone)]
pub struct ReleaseClassifier {
    keyword: String,
    overrides: BTreeSet<String>,
}

impl ReleaseClassifier {
    pub fn new<I, S>(keyword: &str, overrides: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ids = BTreeSet::new();
        for id in overrides {
            let id = id.as_ref().trim().to_lowercase();
            if id.len() < MIN_OVERRIDE_ID_LEN || !id.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(CliError::ValidationError(format!(
                    "override commit '{}' must be a hex id of at least {} characters",
                    id, MIN_OVERRIDE_ID_LEN
                )));
            }
            ids.insert(id);
        }
        Ok(ReleaseClassifier {
            keyword: keyword.to_lowercase(),
            overrides: ids,
        })
    }

    pub fn from_settings(settings: &Settings, extra: &[String]) -> Result<Self, CliError> {
        Self::new(
            &settings.release_keyword,
            settings.override_commits.iter().chain(extra.iter()),
        )
    }

    pub fn is_release(&self, entry: &LogEntry) -> bool {
        if !self.keyword.is_empty() && entry.subject.to_lowercase().contains(&self.keyword) {
            return true;
        }
        let hash = entry.hash.to_lowercase();
        self.overrides.iter().any(|id| hash.starts_with(id))
    }
}

/// A classified release point and the tag it receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseCommit {
    pub hash: String,
    pub subject: String,
    pub index: usize,
}

impl ReleaseCommit {
    pub fn tag(&self) -> String {
        format!("v0.0.{}", self.index)
    }
}

/// Release points of an oldest-first log, numbered from 1.
pub fn classify_releases(log: &[LogEntry], classifier: &ReleaseClassifier) -> Vec<ReleaseCommit> {
    log.iter()
        .filter(|entry| classifier.is_release(entry))
        .enumerate()
        .map(|(i, entry)| ReleaseCommit {
            hash: entry.hash.clone(),
            subject: entry.subject.clone(),
            index: i + 1,
        })
        .collect()
}

/// Replaces legacy date tags and any `v*` tags with `v0.0.1..v0.0.N`, one per
/// release commit on the release branch. Destructive on the remote.
pub struct TagRebuilder<'a> {
    repo: &'a GitRepo,
    settings: &'a Settings,
    classifier: ReleaseClassifier,
}

impl<'a> TagRebuilder<'a> {
    pub fn new(repo: &'a GitRepo, settings: &'a Settings, classifier: ReleaseClassifier) -> Self {
        TagRebuilder {
            repo,
            settings,
            classifier,
        }
    }

    pub fn check_preconditions(&self) -> Result<(), CliError> {
        self.repo.ensure_clean()?;
        for branch in [&self.settings.release_branch, &self.settings.staging_branch] {
            if !self.repo.resolves(branch)? {
                return Err(CliError::PreconditionError(format!(
                    "branch '{}' does not resolve to a commit",
                    branch
                )));
            }
        }
        Ok(())
    }

    fn obsolete_filter(&self) -> Result<impl Fn(&String) -> bool, CliError> {
        let legacy = Regex::new(&self.settings.legacy_tag_pattern)?;
        Ok(move |t: &String| legacy.is_match(t) || t.starts_with('v'))
    }

    fn obsolete_remote_tags(&self) -> Result<BTreeSet<String>, CliError> {
        let obsolete = self.obsolete_filter()?;
        let remote = self.repo.remote_tags(&self.settings.remote)?;
        Ok(remote.into_iter().filter(|t| obsolete(t)).collect())
    }

    /// Local and remote tags the rebuild removes. An unreachable remote is
    /// an error, since its tags could not be cleaned up.
    pub fn obsolete_tags(&self) -> Result<(BTreeSet<String>, BTreeSet<String>), CliError> {
        let obsolete = self.obsolete_filter()?;
        let local = self.repo.tags()?.into_iter().filter(|t| obsolete(t)).collect();
        Ok((local, self.obsolete_remote_tags()?))
    }

    /// Fails when the remote still carries obsolete tags beyond `created`.
    fn verify_remote(&self, created: &[ReleaseCommit]) -> Result<(), CliError> {
        let created: BTreeSet<String> = created.iter().map(ReleaseCommit::tag).collect();
        let leftover: Vec<String> = self
            .obsolete_remote_tags()?
            .into_iter()
            .filter(|t| !created.contains(t))
            .collect();
        if leftover.is_empty() {
            Ok(())
        } else {
            Err(CliError::StateError(format!(
                "remote '{}' still has obsolete tags: {}",
                self.settings.remote,
                leftover.join(", ")
            )))
        }
    }

    /// Runs the rebuild and returns the tags created, oldest first.
    pub fn rebuild(&self) -> Result<Vec<ReleaseCommit>, CliError> {
        self.check_preconditions()?;
        let remote = self.settings.remote.as_str();

        let (local, remote_only) = self.obsolete_tags()?;
        logger::info(&format!(
            "Deleting {} local and {} remote tag(s)",
            local.len(),
            remote_only.len()
        ));

        let deletions = local
            .iter()
            .map(|t| Step::git(format!("Deleting tag '{}'", t), ["tag", "-d", t.as_str()]))
            .chain(remote_only.iter().map(|t| {
                let refspec = format!(":refs/tags/{}", t);
                Step::git(
                    format!("Deleting remote tag '{}'", t),
                    ["push", remote, refspec.as_str()],
                )
                .warn_on_failure()
            }));
        Pipeline::new().extend(deletions).run(self.repo)?;

        let log = self.repo.first_parent_log(&self.settings.release_branch)?;
        let releases = classify_releases(&log, &self.classifier);
        if releases.is_empty() {
            return Err(CliError::NoReleaseCommits(
                self.settings.release_branch.clone(),
            ));
        }

        let creations = releases.iter().map(|release| {
            let tag = release.tag();
            let message = format!("Release {}", tag);
            log::debug!("{} -> {} ({})", tag, release.hash, release.subject);
            Step::git(
                format!("Tagging {} as {}", &release.hash[..7.min(release.hash.len())], tag),
                ["tag", "-a", tag.as_str(), "-m", message.as_str(), release.hash.as_str()],
            )
        });
        Pipeline::new()
            .extend(creations)
            .then(Step::git(
                "Force-pushing tags",
                ["push", remote, "--tags", "--force"],
            ))
            .run(self.repo)?;
        self.verify_remote(&releases)?;

        logger::success(&format!("Rebuilt {} release tag(s)", releases.len()));
        Ok(releases)
    }
}
