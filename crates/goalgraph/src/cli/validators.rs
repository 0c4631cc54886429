//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time. Each one delegates to the domain rule so the CLI
//! and the engine never disagree.

use crate::domain::validation;

/// Validate goal ID prefix format.
///
/// Delegates to the validator in `commands::init`.
pub fn validate_prefix(s: &str) -> Result<String, String> {
    use crate::commands::init;

    let trimmed = s.trim();
    init::validate_prefix(trimmed).map_err(|e| e.to_string())?;
    Ok(trimmed.to_string())
}

/// Validate goal ID format.
///
/// Expected format: `prefix-suffix` where both halves are alphanumeric.
///
/// Examples: `goal-a3f8`, `proj-x1`
pub fn validate_goal_id(s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Goal ID cannot be empty".to_string());
    }

    let Some((prefix, suffix)) = s.split_once('-') else {
        return Err(format!(
            "Invalid goal ID format: '{s}'. Expected format: prefix-suffix (e.g., goal-a3f8)"
        ));
    };

    validate_prefix(prefix).map_err(|e| format!("Goal ID {}", e.to_lowercase()))?;

    if suffix.is_empty() {
        return Err("Goal ID suffix cannot be empty".to_string());
    }
    if !suffix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(format!(
            "Goal ID suffix must be alphanumeric, got '{suffix}'"
        ));
    }

    Ok(s.to_string())
}

/// Validate a goal title and return it trimmed.
pub fn validate_title(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    validation::validate_title(trimmed)?;
    Ok(trimmed.to_string())
}

/// Validate an image or icon URL.
pub fn validate_url(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    validation::validate_url(trimmed)?;
    Ok(trimmed.to_string())
}

/// Validate an assignee name.
pub fn validate_assignee(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    validation::validate_assignee(trimmed)?;
    Ok(trimmed.to_string())
}

/// Validate a deadline. The original text is kept; the engine parses it again.
pub fn validate_deadline(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    validation::parse_deadline(trimmed)?;
    Ok(trimmed.to_string())
}
