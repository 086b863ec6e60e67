use crate::config::Settings;
use crate::error::CliError;
use crate::git::{ensure_new_tag, next_release_tag, GitRepo, Pipeline, Step};
use crate::input::ReleaseRequest;
use crate::logger;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

const MERGE_MESSAGE_FILE: &str = "STEWARD_MERGE_MSG";

/// Title, optional body, then one bullet per released commit subject.
pub fn compose_merge_message(title: &str, body: Option<&str>, subjects: &[String]) -> String {
    let mut lines = vec![title.to_string()];
    if let Some(body) = body.filter(|b| !b.trim().is_empty()) {
        lines.push(String::new());
        lines.push(body.to_string());
    }
    lines.push(String::new());
    lines.extend(subjects.iter().map(|s| format!("- {}", s)));
    let mut message = lines.join("\n");
    message.push('\n');
    message
}

pub fn tag_message(tag: &str, title: &str) -> String {
    format!("Release {} - {}", tag, title)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseOutcome {
    pub merge_commit: String,
    pub tag: Option<String>,
    pub released: Vec<String>,
}

/// Merges the staging branch into the release branch and tags the merge.
pub struct ReleaseManager<'a> {
    repo: &'a GitRepo,
    settings: &'a Settings,
}

impl<'a> ReleaseManager<'a> {
    pub fn new(repo: &'a GitRepo, settings: &'a Settings) -> Self {
        ReleaseManager { repo, settings }
    }

    pub fn check_preconditions(&self) -> Result<(), CliError> {
        if !self.repo.is_clean()? {
            return Err(CliError::PreconditionError(
                "working tree has staged or unstaged changes".to_string(),
            ));
        }
        self.repo.current_branch()?;
        Ok(())
    }

    fn update_from_remote(&self, branch: &str) -> Vec<Step> {
        let upstream = format!("{}/{}", self.settings.remote, branch);
        vec![
            Step::git(format!("Switching to '{}'", branch), ["checkout", "-q", branch]),
            Step::git(
                format!("Fast-forwarding '{}'", branch),
                ["merge", "--ff-only", upstream.as_str()],
            ),
        ]
    }

    fn fetch(&self) -> Step {
        Step::git(
            format!("Fetching '{}'", self.settings.remote),
            ["fetch", "--tags", self.settings.remote.as_str()],
        )
    }

    fn merge_message_path(&self) -> Result<PathBuf, CliError> {
        Ok(self.repo.git_dir()?.join(MERGE_MESSAGE_FILE))
    }

    pub fn release(&self, request: &ReleaseRequest, create_tag: bool) -> Result<ReleaseOutcome, CliError> {
        self.check_preconditions()?;
        let current = self.repo.current_branch()?;
        if current != self.settings.staging_branch {
            logger::warning(&format!(
                "Releasing from '{}' instead of '{}'",
                current, self.settings.staging_branch
            ));
        }

        let staging = self.settings.staging_branch.as_str();
        let release = self.settings.release_branch.as_str();
        let remote = self.settings.remote.as_str();

        Pipeline::new()
            .then(self.fetch())
            .extend(self.update_from_remote(staging))
            .extend(self.update_from_remote(release))
            .run(self.repo)?;

        let subjects = self.repo.subjects_between(release, staging)?;
        if subjects.is_empty() {
            self.repo.run(["checkout", "-q", current.as_str()])?;
            return Err(CliError::PreconditionError(format!(
                "nothing to release: '{}' already contains '{}'",
                release, staging
            )));
        }
        logger::info(&format!("Releasing {} commit(s) from '{}'", subjects.len(), staging));

        let message_path = self.merge_message_path()?;
        fs::write(
            &message_path,
            compose_merge_message(&request.title, request.body.as_deref(), &subjects),
        )?;
        let message_arg = message_path.to_string_lossy().to_string();

        let merged = Pipeline::new()
            .then(Step::git(
                format!("Merging '{}' into '{}'", staging, release),
                ["merge", "--no-ff", "-F", message_arg.as_str(), staging],
            ))
            .run(self.repo);
        if let Err(e) = fs::remove_file(&message_path) {
            log::debug!("Could not remove {:?}: {}", message_path, e);
        }
        merged?;

        Pipeline::new()
            .then(Step::git(
                format!("Pushing '{}'", release),
                ["push", remote, release],
            ))
            .run(self.repo)?;
        let merge_commit = self.repo.commit_id("HEAD")?;
        logger::success(&format!("Merged '{}' into '{}'", staging, release));

        let tag = if create_tag {
            Some(self.tag_release(&merge_commit, &request.title)?)
        } else {
            logger::info("Skipping tag creation");
            None
        };

        Pipeline::new()
            .then(self.fetch())
            .extend(self.update_from_remote(release))
            .extend(self.update_from_remote(staging))
            .run(self.repo)?;

        Ok(ReleaseOutcome {
            merge_commit,
            tag,
            released: subjects,
        })
    }

    fn tag_release(&self, merge_commit: &str, title: &str) -> Result<String, CliError> {
        let existing = self.repo.tags()?;
        let tag = next_release_tag(&existing)?;
        ensure_new_tag(&existing, &tag)?;

        let message = tag_message(&tag, title);
        Pipeline::new()
            .then(Step::git(
                format!("Creating tag '{}'", tag),
                ["tag", "-a", tag.as_str(), "-m", message.as_str(), merge_commit],
            ))
            .then(Step::git(
                format!("Pushing tag '{}'", tag),
                ["push", self.settings.remote.as_str(), tag.as_str()],
            ))
            .run(self.repo)?;

        logger::success(&format!("Tagged release {}", tag));
        Ok(tag)
    }
}
