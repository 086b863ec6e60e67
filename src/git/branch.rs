use super::pipeline::{Pipeline, Step};
use super::repository::GitRepo;
use crate::config::Settings;
use crate::error::CliError;
use crate::logger;

/// Where a feature branch is in its sync/finish lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchState {
    OnFeature { branch: String },
    /// `head` is the feature tip right after the sync push.
    Synced { branch: String, head: String },
    Merged { branch: String },
    CleanedUp { branch: String },
}

impl BranchState {
    pub fn branch(&self) -> &str {
        match self {
            BranchState::OnFeature { branch }
            | BranchState::Synced { branch, .. }
            | BranchState::Merged { branch }
            | BranchState::CleanedUp { branch } => branch,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            BranchState::OnFeature { .. } => "on-feature",
            BranchState::Synced { .. } => "synced",
            BranchState::Merged { .. } => "merged",
            BranchState::CleanedUp { .. } => "cleaned-up",
        }
    }
}

pub struct BranchWorkflow<'a> {
    repo: &'a GitRepo,
    settings: &'a Settings,
    state: BranchState,
}

impl<'a> BranchWorkflow<'a> {
    /// Enters the workflow from the current branch, which must be a clean
    /// feature branch.
    pub fn start(repo: &'a GitRepo, settings: &'a Settings) -> Result<Self, CliError> {
        let branch = repo.current_branch()?;
        if !branch.starts_with(&settings.feature_prefix) || branch == settings.feature_prefix {
            return Err(CliError::BranchNameError {
                branch,
                prefix: settings.feature_prefix.clone(),
            });
        }
        repo.ensure_clean()?;

        log::debug!("Branch workflow started on '{}'", branch);
        Ok(BranchWorkflow {
            repo,
            settings,
            state: BranchState::OnFeature { branch },
        })
    }

    pub fn state(&self) -> &BranchState {
        &self.state
    }

    fn staging_from_remote(&self) -> Vec<Step> {
        let remote_staging = format!("{}/{}", self.settings.remote, self.settings.staging_branch);
        vec![
            Step::git(
                format!("Switching to '{}'", self.settings.staging_branch),
                ["checkout", "-q", self.settings.staging_branch.as_str()],
            ),
            Step::git(
                format!("Fast-forwarding '{}'", self.settings.staging_branch),
                ["merge", "--ff-only", remote_staging.as_str()],
            ),
        ]
    }

    /// Merges the freshly updated staging branch into the feature branch and
    /// pushes it.
    pub fn sync(&mut self) -> Result<(), CliError> {
        let branch = match &self.state {
            BranchState::OnFeature { branch } | BranchState::Synced { branch, .. } => branch.clone(),
            other => {
                return Err(CliError::StateError(format!(
                    "cannot sync '{}' in state {}",
                    other.branch(),
                    other.name()
                )))
            }
        };
        let staging = self.settings.staging_branch.as_str();
        let remote = self.settings.remote.as_str();
        let merge_message = format!("Merge branch '{}' into {}", staging, branch);

        logger::info(&format!("Syncing '{}' with '{}'", branch, staging));
        Pipeline::new()
            .then(Step::git(
                format!("Fetching '{}'", remote),
                ["fetch", "--prune", remote],
            ))
            .extend(self.staging_from_remote())
            .then(Step::git(
                format!("Switching back to '{}'", branch),
                ["checkout", "-q", branch.as_str()],
            ))
            .then(Step::git(
                format!("Merging '{}' into '{}'", staging, branch),
                ["merge", "--no-ff", "-m", merge_message.as_str(), staging],
            ))
            .then(Step::git(
                format!("Pushing '{}'", branch),
                ["push", "-u", remote, branch.as_str()],
            ))
            .run(self.repo)?;

        let head = self.repo.commit_id("HEAD")?;
        logger::success(&format!("'{}' is in sync with '{}'", branch, staging));
        self.state = BranchState::Synced { branch, head };
        Ok(())
    }

    /// Merges the synced feature branch into staging, pushes staging and
    /// removes the feature branch locally and remotely.
    pub fn finish(&mut self) -> Result<(), CliError> {
        let (branch, synced_head) = match &self.state {
            BranchState::Synced { branch, head } => (branch.clone(), head.clone()),
            other => {
                return Err(CliError::StateError(format!(
                    "finish requires a fresh sync, but '{}' is {}",
                    other.branch(),
                    other.name()
                )))
            }
        };

        let current = self.repo.current_branch()?;
        if current != branch {
            return Err(CliError::StateError(format!(
                "branch changed since sync: expected '{}', on '{}'",
                branch, current
            )));
        }
        if self.repo.commit_id("HEAD")? != synced_head {
            return Err(CliError::StateError(format!(
                "'{}' moved since it was synced; sync again",
                branch
            )));
        }
        self.repo.ensure_clean()?;

        let staging = self.settings.staging_branch.as_str();
        let remote = self.settings.remote.as_str();
        let merge_message = format!("Merge branch '{}' into {}", branch, staging);

        logger::info(&format!("Finishing '{}' into '{}'", branch, staging));
        Pipeline::new()
            .extend(self.staging_from_remote())
            .then(Step::git(
                format!("Merging '{}' into '{}'", branch, staging),
                ["merge", "--no-ff", "-m", merge_message.as_str(), branch.as_str()],
            ))
            .then(Step::git(
                format!("Pushing '{}'", staging),
                ["push", remote, staging],
            ))
            .run(self.repo)?;
        self.state = BranchState::Merged {
            branch: branch.clone(),
        };

        // `branch -d` refuses unmerged branches; that refusal is only a warning.
        let report = Pipeline::new()
            .then(
                Step::git(
                    format!("Deleting local branch '{}'", branch),
                    ["branch", "-d", branch.as_str()],
                )
                .warn_on_failure(),
            )
            .then(
                Step::git(
                    format!("Deleting remote branch '{}'", branch),
                    ["push", remote, "--delete", branch.as_str()],
                )
                .ignore_failure(),
            )
            .run(self.repo)?;
        log::debug!("Cleanup report: {:?}", report);

        logger::success(&format!("'{}' merged into '{}'", branch, staging));
        self.state = BranchState::CleanedUp { branch };
        Ok(())
    }
}
