//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success/Done:   green  (completed goals, finished actions)
//!   - Error:          red    (invariant violations)
//!   - Info/Reference: cyan   (goal IDs)
//!   - Accent:         magenta (assignees)
//!   - Muted:          dimmed (field labels, connectors)
//!   - Emphasis:       bold   (section headers)

use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Colorize a goal ID (cyan).
pub(crate) fn colorize_id(id: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return id.to_string();
    }
    id.cyan().to_string()
}

/// Colorize an assignee (magenta).
pub(crate) fn colorize_assignee(assignee: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return assignee.to_string();
    }
    assignee.magenta().to_string()
}

/// Completion checkbox, with ASCII fallback support.
pub(crate) fn completion_icon(completed: bool, config: &OutputConfig) -> String {
    let icon = match (config.use_ascii, completed) {
        (true, true) => "[x]",
        (true, false) => "[ ]",
        (false, true) => "✓",
        (false, false) => "○",
    };

    if !config.use_colors {
        return icon.to_string();
    }
    if completed {
        icon.green().to_string()
    } else {
        icon.white().to_string()
    }
}

/// Completed titles are dimmed so open work stands out.
pub(crate) fn colorize_title(title: &str, completed: bool, config: &OutputConfig) -> String {
    if !config.use_colors || !completed {
        return title.to_string();
    }
    title.dimmed().to_string()
}

/// Apply dimmed style to text (for labels/field names).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

/// A fixed-width bar for a percentage in `0..=100`.
pub(crate) fn progress_bar(percent: u8, width: usize, config: &OutputConfig) -> String {
    let filled = usize::from(percent.min(100)) * width / 100;
    let (full, empty) = if config.use_ascii {
        ("#", "-")
    } else {
        ("█", "░")
    };

    let done = full.repeat(filled);
    let rest = empty.repeat(width - filled);
    if !config.use_colors {
        return format!("{done}{rest}");
    }
    format!("{}{}", done.green(), rest.dimmed())
}
