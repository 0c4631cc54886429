//! Field-level validation for goal input.
//!
//! Validation is pure: it inspects input and either returns the parsed values
//! the engine needs or a [`ValidationErrors`] list with one reason per failing
//! field. Nothing here touches the graph.
//!
//! Checks are written out explicitly rather than with regexes so each failure
//! carries a specific message.

use super::{Goal, GoalPatch, MAX_TITLE_LENGTH, NewGoal};
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

/// A single failing field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field name as it appears in input (`title`, `image_url`, ...)
    pub field: &'static str,

    /// Human-readable reason
    pub message: String,
}

/// All field errors found for one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// The individual field errors, in field order.
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Whether `field` has at least one error.
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Values produced by a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedGoal {
    /// Parsed deadline
    pub deadline: Option<DateTime<Utc>>,
}

/// Validate a complete set of goal fields.
///
/// Every field is checked and all failures are reported together.
pub fn validate_new_goal(goal: &NewGoal) -> Result<ValidatedGoal, ValidationErrors> {
    let mut errors = Vec::new();
    let mut push = |field: &'static str, result: Result<(), String>| {
        if let Err(message) = result {
            errors.push(FieldError { field, message });
        }
    };

    push("title", validate_title(&goal.title));
    if let Some(url) = &goal.image_url {
        push("image_url", validate_url(url));
    }
    if let Some(url) = &goal.icon_url {
        push("icon_url", validate_url(url));
    }
    if let Some(assignee) = &goal.assignee {
        push("assignee", validate_assignee(assignee));
    }

    let deadline = match goal.deadline.as_deref().map(parse_deadline) {
        Some(Ok(deadline)) => Some(deadline),
        Some(Err(message)) => {
            errors.push(FieldError {
                field: "deadline",
                message,
            });
            None
        }
        None => None,
    };

    if errors.is_empty() {
        Ok(ValidatedGoal { deadline })
    } else {
        Err(ValidationErrors(errors))
    }
}

/// Merge `patch` over `goal`, producing the field set an update must validate.
///
/// Unchanged deadlines are carried through in RFC 3339 form so the merged
/// result goes through exactly the same checks as creation.
pub fn merge_patch(goal: &Goal, patch: &GoalPatch) -> NewGoal {
    fn pick(current: Option<&String>, update: Option<&Option<String>>) -> Option<String> {
        match update {
            Some(value) => value.clone(),
            None => current.cloned(),
        }
    }

    let current_deadline = goal.deadline.map(|d| d.to_rfc3339());

    NewGoal {
        title: patch.title.clone().unwrap_or_else(|| goal.title.clone()),
        image_url: pick(goal.image_url.as_ref(), patch.image_url.as_ref()),
        icon_url: pick(goal.icon_url.as_ref(), patch.icon_url.as_ref()),
        assignee: pick(goal.assignee.as_ref(), patch.assignee.as_ref()),
        deadline: pick(current_deadline.as_ref(), patch.deadline.as_ref()),
    }
}

/// Validate a goal title.
///
/// The title must contain a non-whitespace character, be at most
/// [`MAX_TITLE_LENGTH`] characters, and be a single line without control
/// characters.
pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Title is required".to_string());
    }

    let length = title.chars().count();
    if length > MAX_TITLE_LENGTH {
        return Err(format!(
            "Title cannot exceed {} characters, got {} characters",
            MAX_TITLE_LENGTH, length
        ));
    }

    if title.contains('\n') || title.contains('\r') {
        return Err("Title cannot contain newline characters".to_string());
    }

    // Control characters excluding tab
    if let Some(pos) = title.chars().position(|c| {
        let code = c as u32;
        (code < 0x20 && code != 0x09) || (0x7F..=0x9F).contains(&code)
    }) {
        return Err(format!(
            "Title contains invalid control character at position {}",
            pos
        ));
    }

    Ok(())
}

/// Validate that `url` is an absolute URL.
///
/// Requires a scheme (`[A-Za-z][A-Za-z0-9+.-]*:`), a non-empty remainder, no
/// whitespace, and for network schemes an `//authority` with a host.
pub fn validate_url(url: &str) -> Result<(), String> {
    if url.is_empty() {
        return Err("URL cannot be empty".to_string());
    }

    if url.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err("URL cannot contain whitespace or control characters".to_string());
    }

    let Some((scheme, rest)) = url.split_once(':') else {
        return Err(format!("'{}' is not an absolute URL (missing scheme)", url));
    };

    let mut scheme_chars = scheme.chars();
    let valid_scheme = scheme_chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && scheme_chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !valid_scheme {
        return Err(format!("'{}' has an invalid URL scheme", url));
    }

    if rest.is_empty() {
        return Err(format!("'{}' has nothing after the scheme", url));
    }

    let scheme = scheme.to_ascii_lowercase();
    if matches!(scheme.as_str(), "http" | "https" | "ftp" | "ws" | "wss") {
        let Some(after_slashes) = rest.strip_prefix("//") else {
            return Err(format!("'{}' is missing '//' after the scheme", url));
        };
        let authority = after_slashes
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default();
        // Strip userinfo and port to get at the host
        let host_port = authority.rsplit('@').next().unwrap_or_default();
        let host = if host_port.starts_with('[') {
            host_port
        } else {
            host_port.split(':').next().unwrap_or_default()
        };
        if host.is_empty() {
            return Err(format!("'{}' has no host", url));
        }
    }

    Ok(())
}

/// Validate an assignee name.
pub fn validate_assignee(assignee: &str) -> Result<(), String> {
    if assignee.trim().is_empty() {
        return Err("Assignee cannot be blank (clear it instead)".to_string());
    }
    if assignee.chars().count() > MAX_TITLE_LENGTH {
        return Err(format!(
            "Assignee cannot exceed {} characters",
            MAX_TITLE_LENGTH
        ));
    }
    Ok(())
}

/// Parse a deadline given as an RFC 3339 timestamp or a `YYYY-MM-DD` date.
///
/// Dates resolve to midnight UTC.
pub fn parse_deadline(input: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = input.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
        .ok_or_else(|| {
            format!(
                "'{}' is not a valid deadline (expected YYYY-MM-DD or RFC 3339)",
                input
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    // ========== Title ==========

    #[test]
    fn test_validate_title_valid() {
        assert!(validate_title("Project plan").is_ok());
        assert!(validate_title(&"a".repeat(MAX_TITLE_LENGTH)).is_ok());
        assert!(validate_title("tab\tseparated").is_ok());
    }

    #[rstest]
    #[case::empty("")]
    #[case::whitespace("   ")]
    fn test_validate_title_required(#[case] title: &str) {
        let err = validate_title(title).unwrap_err();
        assert!(err.contains("required"));
    }

    #[test]
    fn test_validate_title_too_long() {
        let err = validate_title(&"a".repeat(MAX_TITLE_LENGTH + 1)).unwrap_err();
        assert!(err.contains("cannot exceed 255"));
    }

    #[test]
    fn test_validate_title_counts_characters_not_bytes() {
        let title = "å".repeat(MAX_TITLE_LENGTH);
        assert!(title.len() > MAX_TITLE_LENGTH);
        assert!(validate_title(&title).is_ok());
    }

    #[test]
    fn test_validate_title_rejects_newlines_and_controls() {
        assert!(validate_title("line\nbreak").is_err());
        assert!(validate_title("bell\u{7}").unwrap_err().contains("position 4"));
    }

    // ========== URLs ==========

    #[rstest]
    #[case("https://example.com/image.png")]
    #[case("http://localhost:3000")]
    #[case("https://user@example.com")]
    #[case("http://[::1]:8080/x")]
    #[case("data:image/png;base64,AAAA")]
    #[case("mailto:someone@example.com")]
    fn test_validate_url_valid(#[case] url: &str) {
        assert!(validate_url(url).is_ok(), "expected {url} to be valid");
    }

    #[rstest]
    #[case::empty("")]
    #[case::relative("/images/a.png")]
    #[case::no_scheme("example.com")]
    #[case::bad_scheme("1http://example.com")]
    #[case::whitespace("https://exa mple.com")]
    #[case::no_slashes("https:example.com")]
    #[case::no_host("https:///path")]
    #[case::nothing_after_scheme("https:")]
    fn test_validate_url_invalid(#[case] url: &str) {
        assert!(validate_url(url).is_err(), "expected {url} to be invalid");
    }

    // ========== Deadlines ==========

    #[test]
    fn test_parse_deadline_date() {
        let parsed = parse_deadline("2026-03-01").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_deadline_rfc3339_normalizes_to_utc() {
        let parsed = parse_deadline("2026-03-01T10:00:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap());
    }

    #[rstest]
    #[case("tomorrow")]
    #[case("2026-13-01")]
    #[case("01/03/2026")]
    fn test_parse_deadline_invalid(#[case] input: &str) {
        assert!(parse_deadline(input).is_err());
    }

    // ========== Whole-goal validation ==========

    #[test]
    fn test_validate_new_goal_collects_all_errors() {
        let goal = NewGoal {
            title: String::new(),
            image_url: Some("not a url".to_string()),
            icon_url: Some("https://ok.example/icon.svg".to_string()),
            assignee: Some("  ".to_string()),
            deadline: Some("someday".to_string()),
        };

        let errors = validate_new_goal(&goal).unwrap_err();
        assert_eq!(errors.errors().len(), 4);
        assert!(errors.has_field("title"));
        assert!(errors.has_field("image_url"));
        assert!(!errors.has_field("icon_url"));
        assert!(errors.has_field("assignee"));
        assert!(errors.has_field("deadline"));
        assert!(errors.to_string().starts_with("title: "));
    }

    #[test]
    fn test_validate_new_goal_parses_deadline() {
        let goal = NewGoal {
            deadline: Some("2026-12-24".to_string()),
            ..NewGoal::titled("Gifts")
        };
        let validated = validate_new_goal(&goal).unwrap();
        assert_eq!(
            validated.deadline,
            Some(Utc.with_ymd_and_hms(2026, 12, 24, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_merge_patch_keeps_and_clears() {
        let goal = Goal {
            id: "goal-1".into(),
            title: "Old".to_string(),
            image_url: Some("https://a.example/x.png".to_string()),
            icon_url: None,
            assignee: Some("alice".to_string()),
            deadline: Some(Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap()),
            completed: false,
            created_at: Utc::now(),
            completed_at: None,
            sequence: 1,
        };
        let patch = GoalPatch {
            title: Some("New".to_string()),
            assignee: Some(None),
            ..Default::default()
        };

        let merged = merge_patch(&goal, &patch);
        assert_eq!(merged.title, "New");
        assert_eq!(merged.image_url, goal.image_url);
        assert_eq!(merged.assignee, None);

        let validated = validate_new_goal(&merged).unwrap();
        assert_eq!(validated.deadline, goal.deadline);
    }
}
