use crate::error::CliError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const COMMIT_TYPES: &[&str] = &[
    "feat", "fix", "refactor", "chore", "docs", "test", "style", "perf",
];

pub const RELEASE_TITLE_REGEX: &str =
    r"^(feat|fix|refactor|chore|docs|test|style|perf)(\([a-z0-9-]+\))?: .+$";

/// Candidate tags for the next release version (the `v*.*.*` shape).
pub const SEMVER_TAG_CANDIDATE_REGEX: &str = r"^v[^.]+\.[^.]+\.[^.]+$";

pub const WILDCARD_SCOPE: &str = "*";
pub const WILDCARD_SCOPE_DISPLAY: &str = "all";
pub const ROOT_GROUP: &str = "root";

pub const INITIAL_TAG: &str = "v0.0.1";

pub const LOCAL_CONFIG_FILE: &str = ".steward.toml";

fn default_remote() -> String {
    "origin".to_string()
}

fn default_staging_branch() -> String {
    "develop".to_string()
}

fn default_release_branch() -> String {
    "main".to_string()
}

fn default_feature_prefix() -> String {
    "feature/".to_string()
}

fn default_commit_scopes() -> Vec<String> {
    [
        "*", "core", "cli", "dag", "utils", "config", "docs", "tests", "ci", "deps",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_release_scopes() -> Vec<String> {
    ["release", "hotfix", "deps", "ci", "docs"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_release_keyword() -> String {
    "release".to_string()
}

fn default_legacy_tag_pattern() -> String {
    r"^(release[-_])?\d{4}[-.]\d{2}[-.]\d{2}([-.]\d+)?$".to_string()
}

/// Repository workflow settings.
///
/// Every key is optional in the TOML file; missing keys fall back to the
/// defaults above.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_staging_branch")]
    pub staging_branch: String,

    #[serde(default = "default_release_branch")]
    pub release_branch: String,

    #[serde(default = "default_feature_prefix")]
    pub feature_prefix: String,

    #[serde(default = "default_commit_scopes")]
    pub commit_scopes: Vec<String>,

    #[serde(default = "default_release_scopes")]
    pub release_scopes: Vec<String>,

    #[serde(default = "default_release_keyword")]
    pub release_keyword: String,

    #[serde(default = "default_legacy_tag_pattern")]
    pub legacy_tag_pattern: String,

    #[serde(default)]
    pub override_commits: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            remote: default_remote(),
            staging_branch: default_staging_branch(),
            release_branch: default_release_branch(),
            feature_prefix: default_feature_prefix(),
            commit_scopes: default_commit_scopes(),
            release_scopes: default_release_scopes(),
            release_keyword: default_release_keyword(),
            legacy_tag_pattern: default_legacy_tag_pattern(),
            override_commits: Vec::new(),
        }
    }
}

impl Settings {
    pub fn from_toml(content: &str) -> Result<Self, CliError> {
        toml::from_str(content).map_err(|e| CliError::ConfigError(e.to_string()))
    }

    fn from_file(path: &Path) -> Result<Self, CliError> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
            .map_err(|e| CliError::ConfigError(format!("{}: {}", path.display(), e)))
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("steward").join("config.toml"))
}

/// Loads settings from an explicit path, the repository's `.steward.toml`,
/// the user config directory, or the built-in defaults, in that order.
pub fn load_settings(explicit: Option<&Path>, repo_root: &Path) -> Result<Settings, CliError> {
    if let Some(path) = explicit {
        log::debug!("Loading settings from {path:?}");
        return Settings::from_file(path);
    }

    let local = repo_root.join(LOCAL_CONFIG_FILE);
    if local.exists() {
        log::debug!("Loading settings from {local:?}");
        return Settings::from_file(&local);
    }

    if let Some(user) = user_config_path().filter(|p| p.exists()) {
        log::debug!("Loading settings from {user:?}");
        return Settings::from_file(&user);
    }

    log::debug!("No configuration file found, using defaults");
    Ok(Settings::default())
}
