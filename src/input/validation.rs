use crate::config::COMMIT_TYPES;
use crate::error::CliError;

const AFFIRMATIVE_ANSWERS: &[&str] = &["y", "yes"];

pub fn suggest_commit_type(input: &str) -> Option<&'static str> {
    let input = input.trim().to_lowercase();
    COMMIT_TYPES
        .iter()
        .min_by_key(|&&valid_type| strsim::levenshtein(&input, valid_type))
        .filter(|&&valid_type| {
            let distance = strsim::levenshtein(&input, valid_type);
            let max_allowed = (valid_type.len() as f32 * 0.6).ceil() as usize;
            distance <= max_allowed
        })
        .copied()
}

/// Rejects `scope` unless it is one of `allowed`, naming both in the error.
pub fn validate_scope(scope: &str, allowed: &[String]) -> Result<(), CliError> {
    if allowed.iter().any(|s| s == scope) {
        Ok(())
    } else {
        Err(CliError::ValidationError(format!(
            "Invalid scope '{}'. Allowed scopes are: {}",
            scope,
            allowed.join(", ")
        )))
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    AFFIRMATIVE_ANSWERS.contains(&answer.as_str())
}
