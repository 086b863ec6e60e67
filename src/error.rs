use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Git error: {0}")]
    GitError(#[from] git2::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Input error: {0}")]
    InputError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflicting input: {0}")]
    ConflictError(String),

    #[error("Precondition failed: {0}")]
    PreconditionError(String),

    #[error("Current branch '{branch}' is not a feature branch (expected '{prefix}*')")]
    BranchNameError { branch: String, prefix: String },

    #[error("Working tree has staged or unstaged changes; commit or stash them first")]
    DirtyTreeError,

    #[error("Invalid workflow state: {0}")]
    StateError(String),

    #[error("`git {command}` failed: {stderr}")]
    GitCommandError { command: String, stderr: String },

    #[error("Invalid release title '{title}': expected a title matching {pattern}")]
    FormatError { title: String, pattern: String },

    #[error("Cannot derive next version from tag '{0}': expected v<major>.<minor>.<patch>")]
    VersionFormatError(String),

    #[error("Tag '{0}' already exists")]
    TagExistsError(String),

    #[error("Nothing to commit: no changed files found")]
    NothingToCommit,

    #[error("No release commits found on '{0}'; nothing to tag")]
    NoReleaseCommits(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Regex error: {0}")]
    RegexError(String),

    #[error("{0}")]
    Generic(String),
}

impl From<regex::Error> for CliError {
    fn from(error: regex::Error) -> Self {
        CliError::RegexError(error.to_string())
    }
}
