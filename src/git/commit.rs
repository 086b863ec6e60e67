use crate::config::{WILDCARD_SCOPE, WILDCARD_SCOPE_DISPLAY};

/// Scope as it appears in a subject line; the wildcard scope reads as `all`.
pub fn display_scope(scope: &str) -> &str {
    if scope == WILDCARD_SCOPE {
        WILDCARD_SCOPE_DISPLAY
    } else {
        scope
    }
}

pub fn format_subject(commit_type: &str, scope: &str, description: &str) -> String {
    format!("{}({}): {}", commit_type, display_scope(scope), description)
}

/// Renders `type(scope): description`, followed by a blank line and the body
/// when one is given.
pub fn format_commit_message(
    commit_type: &str,
    scope: &str,
    description: &str,
    body: Option<&str>,
) -> String {
    let subject = format_subject(commit_type, scope, description);
    match body {
        Some(body) if !body.is_empty() => format!("{}\n\n{}", subject, body),
        _ => subject,
    }
}
