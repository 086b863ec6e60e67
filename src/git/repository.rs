use crate::error::CliError;
use git2::{Repository, Sort, Status, StatusOptions, StatusShow};
use serde::Serialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeStatus {
    Modified,
    Added,
    Deleted,
    Renamed,
    TypeChange,
    Untracked,
}

impl ChangeStatus {
    /// Whether the path is known to the index, i.e. `git add -u` reaches it.
    pub fn is_tracked(&self) -> bool {
        !matches!(self, ChangeStatus::Untracked)
    }

    fn from_git(status: Status) -> Self {
        if status.is_index_deleted() || status.is_wt_deleted() {
            ChangeStatus::Deleted
        } else if status.is_index_renamed() || status.is_wt_renamed() {
            ChangeStatus::Renamed
        } else if status.is_index_typechange() || status.is_wt_typechange() {
            ChangeStatus::TypeChange
        } else if status.is_index_new() {
            ChangeStatus::Added
        } else if status.is_wt_new() {
            ChangeStatus::Untracked
        } else {
            ChangeStatus::Modified
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    pub path: String,
    pub status: ChangeStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub hash: String,
    pub subject: String,
}

/// Handle on one working copy.
///
/// Read-only queries open the repository through `git2` on every call so
/// they always observe the current state; mutations run the `git` binary in
/// the working directory and treat a non-zero exit as failure.
#[derive(Debug, Clone)]
pub struct GitRepo {
    root: PathBuf,
}

impl GitRepo {
    pub fn discover(start: impl AsRef<Path>) -> Result<Self, CliError> {
        let start = start.as_ref();
        log::debug!("Starting repository discovery from: {start:?}");

        let repo = Repository::discover(start).map_err(|e| {
            log::error!("Failed to discover repository from {start:?}: {e}");
            CliError::GitError(git2::Error::from_str(
                "Could not find Git repository in current directory or any parent directories",
            ))
        })?;

        let root = repo
            .workdir()
            .and_then(|p| p.canonicalize().ok())
            .ok_or_else(|| {
                CliError::GitError(git2::Error::from_str(
                    "Could not determine repository root directory",
                ))
            })?;

        Ok(GitRepo { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn open(&self) -> Result<Repository, CliError> {
        Repository::open(&self.root).map_err(CliError::from)
    }

    /// The repository's `.git` directory.
    pub fn git_dir(&self) -> Result<PathBuf, CliError> {
        Ok(self.open()?.path().to_path_buf())
    }

    /// Runs `git <args>` in the working directory and returns its stdout.
    pub fn run<I, S>(&self, args: I) -> Result<String, CliError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<_> = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
        let display = args
            .iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");
        log::debug!("Running: git {}", display);

        let output = Command::new("git")
            .args(&args)
            .current_dir(&self.root)
            .output()?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            log::debug!("git {} exited with {:?}: {}", display, output.status.code(), stderr);
            Err(CliError::GitCommandError {
                command: display,
                stderr,
            })
        }
    }

    pub fn current_branch(&self) -> Result<String, CliError> {
        let repo = self.open()?;
        if repo.head_detached()? {
            return Err(CliError::PreconditionError(
                "HEAD is detached; check out a branch first".to_string(),
            ));
        }
        let head = repo.head()?;
        let name = head.shorthand().map(String::from);
        name.ok_or_else(|| CliError::Generic("Failed to get current branch".to_string()))
    }

    /// True when no tracked file has staged or unstaged changes. Untracked
    /// files do not count.
    pub fn is_clean(&self) -> Result<bool, CliError> {
        let repo = self.open()?;
        let mut opts = StatusOptions::new();
        opts.include_ignored(false)
            .include_untracked(false)
            .include_unmodified(false)
            .exclude_submodules(true)
            .show(StatusShow::IndexAndWorkdir);

        let statuses = repo.statuses(Some(&mut opts))?;
        Ok(statuses
            .iter()
            .all(|entry| entry.status() == Status::CURRENT || entry.status().is_ignored()))
    }

    pub fn ensure_clean(&self) -> Result<(), CliError> {
        if self.is_clean()? {
            Ok(())
        } else {
            Err(CliError::DirtyTreeError)
        }
    }

    /// Every changed path in the working tree and index, untracked files
    /// included, sorted by path.
    pub fn changes(&self) -> Result<Vec<FileChange>, CliError> {
        let repo = self.open()?;
        let mut opts = StatusOptions::new();
        opts.include_ignored(false)
            .include_untracked(true)
            .include_unmodified(false)
            .recurse_untracked_dirs(true)
            .renames_head_to_index(true)
            .exclude_submodules(true)
            .show(StatusShow::IndexAndWorkdir);

        let statuses = repo.statuses(Some(&mut opts))?;
        let mut changes: std::collections::BTreeMap<String, ChangeStatus> =
            std::collections::BTreeMap::new();

        for entry in statuses.iter() {
            let status = entry.status();
            if status.is_ignored() || status == Status::CURRENT {
                continue;
            }

            if status.is_index_renamed() {
                if let Some(delta) = entry.head_to_index() {
                    if let Some(old) = delta.old_file().path() {
                        changes.insert(old.to_string_lossy().to_string(), ChangeStatus::Deleted);
                    }
                    if let Some(new) = delta.new_file().path() {
                        changes.insert(new.to_string_lossy().to_string(), ChangeStatus::Renamed);
                    }
                    continue;
                }
            }

            if let Some(path) = entry.path() {
                changes.insert(path.to_string(), ChangeStatus::from_git(status));
            }
        }

        Ok(changes
            .into_iter()
            .map(|(path, status)| FileChange { path, status })
            .collect())
    }

    /// Whether `path` is part of the tree at HEAD.
    pub fn in_head(&self, path: &str) -> Result<bool, CliError> {
        let repo = self.open()?;
        let tree = match repo.head() {
            Ok(head) => head.peel_to_tree()?,
            Err(_) => return Ok(false),
        };
        let found = tree.get_path(Path::new(path)).is_ok();
        Ok(found)
    }

    pub fn tags(&self) -> Result<Vec<String>, CliError> {
        let repo = self.open()?;
        let tags = repo.tag_names(None)?;
        Ok(tags.iter().flatten().map(String::from).collect())
    }

    pub fn tag_exists(&self, name: &str) -> Result<bool, CliError> {
        Ok(self.tags()?.iter().any(|t| t == name))
    }

    /// Tag names advertised by `remote`.
    pub fn remote_tags(&self, remote: &str) -> Result<Vec<String>, CliError> {
        let listing = self.run(["ls-remote", "--tags", "--refs", remote])?;
        Ok(listing
            .lines()
            .filter_map(|line| line.split_whitespace().nth(1))
            .filter_map(|r| r.strip_prefix("refs/tags/"))
            .map(String::from)
            .collect())
    }

    pub fn resolves(&self, rev: &str) -> Result<bool, CliError> {
        let repo = self.open()?;
        let resolved = repo.revparse_single(rev).and_then(|o| o.peel_to_commit());
        Ok(resolved.is_ok())
    }

    pub fn commit_id(&self, rev: &str) -> Result<String, CliError> {
        let repo = self.open()?;
        let commit = repo.revparse_single(rev)?.peel_to_commit()?;
        Ok(commit.id().to_string())
    }

    /// Commits on the first-parent line of `branch`, oldest first.
    pub fn first_parent_log(&self, branch: &str) -> Result<Vec<LogEntry>, CliError> {
        let repo = self.open()?;
        let tip = repo.revparse_single(branch)?.peel_to_commit()?;

        let mut revwalk = repo.revwalk()?;
        revwalk.push(tip.id())?;
        revwalk.simplify_first_parent()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL)?;

        let mut entries = Vec::new();
        for oid in revwalk {
            let commit = repo.find_commit(oid?)?;
            entries.push(LogEntry {
                hash: commit.id().to_string(),
                subject: commit.summary().unwrap_or("").to_string(),
            });
        }

        entries.reverse();
        Ok(entries)
    }

    /// Subjects of commits reachable from `tip` but not from `base`, in
    /// `git log` order.
    pub fn subjects_between(&self, base: &str, tip: &str) -> Result<Vec<String>, CliError> {
        let range = format!("{}..{}", base, tip);
        let log = self.run(["log", "--format=%s", range.as_str()])?;
        Ok(log
            .lines()
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }
}
