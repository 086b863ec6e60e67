use super::pipeline::{Pipeline, Step};
use super::repository::{ChangeStatus, GitRepo};
use crate::config::{ROOT_GROUP, WILDCARD_SCOPE};
use crate::error::CliError;
use crate::input::{CommitSpec, Confirm};
use crate::logger;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Group key for a path: its immediate parent directory, or `root`.
pub fn group_key(path: &str) -> &str {
    match path.trim_start_matches("./").rsplit_once('/') {
        Some((dir, _)) if !dir.is_empty() => dir,
        _ => ROOT_GROUP,
    }
}

/// Partitions `paths` into commit groups, keyed and sorted by group key.
/// With `wildcard` everything lands in a single `*` group.
pub fn group_paths(paths: &[String], wildcard: bool) -> BTreeMap<String, Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    if wildcard {
        if !paths.is_empty() {
            groups.insert(WILDCARD_SCOPE.to_string(), paths.to_vec());
        }
        return groups;
    }

    for path in paths {
        groups
            .entry(group_key(path).to_string())
            .or_default()
            .push(path.clone());
    }
    groups
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedCommit {
    pub group: String,
    pub files: Vec<String>,
    pub message: String,
}

/// Pairs each group (in key order) with its message.
pub fn plan_commits(groups: &BTreeMap<String, Vec<String>>, spec: &CommitSpec) -> Vec<PlannedCommit> {
    groups
        .iter()
        .enumerate()
        .map(|(position, (group, files))| PlannedCommit {
            group: group.clone(),
            files: files.clone(),
            message: spec.message_for(position),
        })
        .collect()
}

/// Immediate-children pathspec for the directory holding `path`.
fn directory_pathspec(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((dir, _)) if !dir.is_empty() => format!(":(glob){}/*", dir),
        _ => ":(glob)*".to_string(),
    }
}

/// Preview of a plan: one header line per commit, followed by the indented
/// body of any message that has one.
pub fn preview_lines(plan: &[PlannedCommit]) -> Vec<String> {
    let mut lines = Vec::new();
    for planned in plan {
        let mut message = planned.message.lines();
        lines.push(format!(
            "  [{}] {} file(s) → {}",
            planned.group,
            planned.files.len(),
            message.next().unwrap_or_default()
        ));
        lines.extend(
            message
                .skip_while(|l| l.trim().is_empty())
                .map(|l| format!("      {}", l).trim_end().to_string()),
        );
    }
    lines
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitOutcome {
    pub message: String,
    pub group: String,
}

/// Stages, commits and pushes one group at a time. A failing group is
/// logged and skipped; the batch carries on with the next one.
pub struct CommitOrchestrator<'a> {
    repo: &'a GitRepo,
    confirm: &'a dyn Confirm,
    remote: String,
}

impl<'a> CommitOrchestrator<'a> {
    pub fn new(repo: &'a GitRepo, confirm: &'a dyn Confirm, remote: impl Into<String>) -> Self {
        CommitOrchestrator {
            repo,
            confirm,
            remote: remote.into(),
        }
    }

    pub fn plan(&self, spec: &CommitSpec) -> Result<Vec<PlannedCommit>, CliError> {
        let paths: Vec<String> = self.repo.changes()?.into_iter().map(|c| c.path).collect();
        if paths.is_empty() {
            return Err(CliError::NothingToCommit);
        }
        let groups = group_paths(&paths, spec.is_wildcard());
        Ok(plan_commits(&groups, spec))
    }

    pub fn run(&self, spec: &CommitSpec) -> Result<Vec<CommitOutcome>, CliError> {
        let statuses: HashMap<String, ChangeStatus> = self
            .repo
            .changes()?
            .into_iter()
            .map(|c| (c.path, c.status))
            .collect();
        let plan = self.plan(spec)?;

        logger::info(&format!("Planned {} commit(s):", plan.len()));
        for line in preview_lines(&plan) {
            logger::info(&line);
        }

        if !self
            .confirm
            .confirm(&format!("Create and push {} commit(s)?", plan.len()))?
        {
            logger::info("Aborted, nothing was committed");
            return Ok(Vec::new());
        }

        let mut succeeded = Vec::new();
        for planned in &plan {
            match self.commit_group(planned, &statuses) {
                Ok(()) => {
                    logger::success(&format!("Committed and pushed group '{}'", planned.group));
                    succeeded.push(CommitOutcome {
                        message: planned.message.clone(),
                        group: planned.group.clone(),
                    });
                }
                Err(e) => {
                    logger::warning(&format!("Skipping group '{}': {}", planned.group, e));
                }
            }
        }

        Ok(succeeded)
    }

    fn commit_group(
        &self,
        planned: &PlannedCommit,
        statuses: &HashMap<String, ChangeStatus>,
    ) -> Result<(), CliError> {
        let tracked_dirs: BTreeSet<String> = planned
            .files
            .iter()
            .filter(|f| statuses.get(*f).is_some_and(ChangeStatus::is_tracked))
            .map(|f| directory_pathspec(f))
            .collect();

        let existing: Vec<&String> = planned
            .files
            .iter()
            .filter(|f| self.repo.root().join(f).exists())
            .collect();

        // A file staged as new and then deleted is in neither HEAD nor, after
        // `add -u`, the index; naming it would make the commit pathspec fail.
        let mut commit_paths = Vec::new();
        for file in &planned.files {
            if self.repo.root().join(file).exists() || self.repo.in_head(file)? {
                commit_paths.push(file.clone());
            }
        }

        let mut pipeline = Pipeline::new();
        if !tracked_dirs.is_empty() {
            let args = ["add", "-u", "--"]
                .into_iter()
                .map(String::from)
                .chain(tracked_dirs);
            pipeline = pipeline.then(Step::git(
                format!("Staging tracked changes in '{}'", planned.group),
                args,
            ));
        }
        if !existing.is_empty() {
            let args = ["add", "--"]
                .into_iter()
                .map(String::from)
                .chain(existing.into_iter().cloned());
            pipeline = pipeline.then(Step::git(
                format!("Staging files in '{}'", planned.group),
                args,
            ));
        }

        if commit_paths.is_empty() {
            pipeline.run(self.repo)?;
            return Err(CliError::NothingToCommit);
        }

        let commit_args = ["commit", "-q", "-m", planned.message.as_str(), "--"]
            .into_iter()
            .map(String::from)
            .chain(commit_paths);

        pipeline
            .then(Step::git(
                format!("Committing '{}'", planned.group),
                commit_args,
            ))
            .then(Step::git(
                format!("Pushing '{}'", planned.group),
                ["push", self.remote.as_str(), "HEAD"],
            ))
            .run(self.repo)?;

        Ok(())
    }
}
