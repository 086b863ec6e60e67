use super::validation::{suggest_commit_type, validate_scope};
use crate::config::{COMMIT_TYPES, RELEASE_TITLE_REGEX};
use crate::error::CliError;
use crate::git::{format_commit_message, format_subject};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
    Feat,
    Fix,
    Refactor,
    Chore,
    Docs,
    Test,
    Style,
    Perf,
}

impl CommitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitType::Feat => "feat",
            CommitType::Fix => "fix",
            CommitType::Refactor => "refactor",
            CommitType::Chore => "chore",
            CommitType::Docs => "docs",
            CommitType::Test => "test",
            CommitType::Style => "style",
            CommitType::Perf => "perf",
        }
    }
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommitType {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "feat" => Ok(CommitType::Feat),
            "fix" => Ok(CommitType::Fix),
            "refactor" => Ok(CommitType::Refactor),
            "chore" => Ok(CommitType::Chore),
            "docs" => Ok(CommitType::Docs),
            "test" => Ok(CommitType::Test),
            "style" => Ok(CommitType::Style),
            "perf" => Ok(CommitType::Perf),
            other => {
                let hint = suggest_commit_type(other)
                    .map(|s| format!(" Did you mean '{}'?", s))
                    .unwrap_or_default();
                Err(CliError::ValidationError(format!(
                    "Invalid commit type '{}'. Allowed types are: {}.{}",
                    other,
                    COMMIT_TYPES.join(", "),
                    hint
                )))
            }
        }
    }
}

/// One commit's metadata, validated against the type taxonomy and a
/// workflow-specific scope set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSpec {
    pub commit_type: CommitType,
    pub scope: String,
    pub descriptions: Vec<String>,
    pub body: Option<String>,
}

impl CommitSpec {
    /// Description for the group at `position`; once the list runs out the
    /// last description is reused.
    pub fn description_for(&self, position: usize) -> &str {
        let index = position.min(self.descriptions.len().saturating_sub(1));
        &self.descriptions[index]
    }

    pub fn is_wildcard(&self) -> bool {
        self.scope == crate::config::WILDCARD_SCOPE
    }

    pub fn message_for(&self, position: usize) -> String {
        format_commit_message(
            self.commit_type.as_str(),
            &self.scope,
            self.description_for(position),
            self.body.as_deref(),
        )
    }
}

/// Structured input as it arrives from `--type/--scope/--description/--body`.
#[derive(Debug, Clone, Default)]
pub struct SpecFields {
    pub commit_type: Option<String>,
    pub scope: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
}

impl SpecFields {
    pub fn is_empty(&self) -> bool {
        self.commit_type.is_none()
            && self.scope.is_none()
            && self.description.is_none()
            && self.body.is_none()
    }
}

/// Splits `A|B| |C` into `["A", "B", "C"]`.
pub fn split_descriptions(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(String::from)
        .collect()
}

fn parse_delimited(spec: &str) -> Result<SpecFields, CliError> {
    let parts: Vec<&str> = spec.splitn(4, ',').map(str::trim).collect();
    if parts.len() < 3 {
        return Err(CliError::ValidationError(format!(
            "Malformed commit specification '{}': expected \"type,scope,description[,body]\"",
            spec
        )));
    }

    Ok(SpecFields {
        commit_type: Some(parts[0].to_string()),
        scope: Some(parts[1].to_string()),
        description: Some(parts[2].to_string()),
        body: parts.get(3).map(|b| b.to_string()),
    })
}

fn build_spec(fields: SpecFields, allowed_scopes: &[String]) -> Result<CommitSpec, CliError> {
    let missing = |name: &str| {
        CliError::ValidationError(format!("Missing commit {}; provide --{}", name, name))
    };

    let commit_type: CommitType = fields.commit_type.ok_or_else(|| missing("type"))?.parse()?;

    let scope = fields.scope.ok_or_else(|| missing("scope"))?;
    validate_scope(&scope, allowed_scopes)?;

    let raw_description = fields.description.ok_or_else(|| missing("description"))?;
    let descriptions = split_descriptions(&raw_description);
    if descriptions.is_empty() {
        return Err(CliError::ValidationError(format!(
            "Description '{}' is empty; at least one description is required",
            raw_description
        )));
    }

    let body = fields
        .body
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty());

    Ok(CommitSpec {
        commit_type,
        scope,
        descriptions,
        body,
    })
}

/// Builds a [`CommitSpec`] from exactly one of the structured fields or a
/// `type,scope,description[,body]` string.
pub fn parse_commit_spec(
    fields: &SpecFields,
    positional: Option<&str>,
    allowed_scopes: &[String],
) -> Result<CommitSpec, CliError> {
    match (fields.is_empty(), positional) {
        (false, Some(_)) => Err(CliError::ConflictError(
            "use either --type/--scope/--description/--body or a positional specification, not both"
                .to_string(),
        )),
        (true, None) => Err(CliError::ValidationError(
            "no commit specification given: pass \"type,scope,description[,body]\" or --type/--scope/--description"
                .to_string(),
        )),
        (true, Some(spec)) => build_spec(parse_delimited(spec)?, allowed_scopes),
        (false, None) => build_spec(fields.clone(), allowed_scopes),
    }
}

/// Title line and optional body of a release merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRequest {
    pub title: String,
    pub body: Option<String>,
}

fn check_release_title(title: &str) -> Result<(), CliError> {
    let grammar = Regex::new(RELEASE_TITLE_REGEX)?;
    if grammar.is_match(title) {
        Ok(())
    } else {
        Err(CliError::FormatError {
            title: title.to_string(),
            pattern: RELEASE_TITLE_REGEX.to_string(),
        })
    }
}

fn looks_like_delimited_spec(input: &str) -> bool {
    input
        .split(',')
        .next()
        .map(|head| COMMIT_TYPES.contains(&head.trim()))
        .unwrap_or(false)
        && input.contains(',')
}

/// Parses release input: structured flags, a comma spec, or a pre-formatted
/// `type(scope): title` line.
pub fn parse_release_request(
    fields: &SpecFields,
    positional: Option<&str>,
    allowed_scopes: &[String],
) -> Result<ReleaseRequest, CliError> {
    if let Some(raw) = positional {
        if !fields.is_empty() {
            return Err(CliError::ConflictError(
                "use either --type/--scope/--description/--body or a positional release title, not both"
                    .to_string(),
            ));
        }
        let raw = raw.trim();
        if check_release_title(raw).is_ok() {
            return Ok(ReleaseRequest {
                title: raw.to_string(),
                body: None,
            });
        }
        if !looks_like_delimited_spec(raw) {
            check_release_title(raw)?;
        }
    }

    let spec = parse_commit_spec(fields, positional, allowed_scopes)?;
    let title = format_subject(
        spec.commit_type.as_str(),
        &spec.scope,
        &spec.descriptions.join("; "),
    );
    check_release_title(&title)?;

    Ok(ReleaseRequest {
        title,
        body: spec.body,
    })
}
