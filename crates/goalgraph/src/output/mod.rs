//! Output formatting for CLI commands.
//!
//! Every printer takes an [`OutputMode`]: human-readable text, or JSON for
//! programmatic use.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers
//! - [`tree`]: Outline rendering with ASCII/Unicode connectors

pub mod color;
pub mod tree;

use crate::domain::Goal;
use crate::store::InvariantViolation;
use crate::view::GoalStats;
use serde::Serialize;
use std::env;
use std::io::{self, Write};

pub use color::{error, success};
pub use tree::print_outline;

use color::{bold, colorize_assignee, colorize_id, colorize_title, completion_icon, dimmed};

const DEFAULT_TERMINAL_WIDTH: usize = 80;
const DEFAULT_MAX_CONTENT_WIDTH: usize = 80;
const PROGRESS_BAR_WIDTH: usize = 30;

/// Configuration for output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Maximum content width for wrapping and truncation.
    pub max_width: usize,
    /// Whether to use ASCII-only icons and connectors.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new OutputConfig with explicit values.
    pub fn new(max_width: usize, use_ascii: bool, use_colors: bool) -> Self {
        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }

    /// Create an OutputConfig from environment variables.
    ///
    /// Reads:
    /// - `GOALGRAPH_MAX_WIDTH`: Maximum content width (default: 80)
    /// - `GOALGRAPH_ASCII`: "1" or "true" for ASCII-only output
    /// - `NO_COLOR`: Standard env var to disable colors (any value)
    /// - `GOALGRAPH_COLOR`: "0" or "false" to disable colors
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`OutputConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let max_width = match lookup("GOALGRAPH_MAX_WIDTH") {
            Some(s) if !s.is_empty() => match s.parse() {
                Ok(width) => width,
                Err(_) => {
                    tracing::warn!(
                        env_var = "GOALGRAPH_MAX_WIDTH",
                        value = %s,
                        default = DEFAULT_MAX_CONTENT_WIDTH,
                        "Invalid value, using default"
                    );
                    DEFAULT_MAX_CONTENT_WIDTH
                }
            },
            _ => DEFAULT_MAX_CONTENT_WIDTH,
        };

        let use_ascii = match lookup("GOALGRAPH_ASCII") {
            Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Some(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Some(v) => {
                tracing::warn!(
                    env_var = "GOALGRAPH_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            None => false,
        };

        // https://no-color.org/
        let use_colors = lookup("NO_COLOR").is_none()
            && lookup("GOALGRAPH_COLOR")
                .is_none_or(|v| v != "0" && !v.eq_ignore_ascii_case("false"));

        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_CONTENT_WIDTH,
            use_ascii: false,
            use_colors: true,
        }
    }
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

/// Terminal width capped by the configured maximum.
pub(crate) fn content_width(config: &OutputConfig) -> usize {
    let terminal_width = terminal_size::terminal_size()
        .map_or(DEFAULT_TERMINAL_WIDTH, |(w, _)| usize::from(w.0));
    terminal_width.min(config.max_width)
}

/// Cut `text` to at most `max` characters, marking the cut.
pub(crate) fn truncate(text: &str, max: usize, config: &OutputConfig) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let ellipsis = if config.use_ascii { "..." } else { "…" };
    let keep = max.saturating_sub(ellipsis.chars().count());
    let mut cut: String = text.chars().take(keep).collect();
    cut.push_str(ellipsis);
    cut
}

fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    textwrap::wrap(text, max_width.max(1))
        .into_iter()
        .map(std::borrow::Cow::into_owned)
        .collect()
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print a single goal
pub fn print_goal(goal: &Goal, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_goal_line(&mut handle, goal, &config),
        OutputMode::Json => write_json(&mut handle, goal),
    }
}

/// Print a list of goals
pub fn print_goals(goals: &[&Goal], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_goals_text(&mut handle, goals, &config),
        OutputMode::Json => write_json(&mut handle, &goals),
    }
}

/// Print a goal with its parents and children (for the show command)
pub fn print_goal_details(
    goal: &Goal,
    parents: &[&Goal],
    children: &[&Goal],
    mode: OutputMode,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_goal_details_text(
            &mut handle,
            goal,
            parents,
            children,
            &config,
            content_width(&config),
        ),
        OutputMode::Json => write_json(
            &mut handle,
            &serde_json::json!({
                "goal": goal,
                "parents": parents.iter().map(|g| &g.id).collect::<Vec<_>>(),
                "children": children.iter().map(|g| &g.id).collect::<Vec<_>>(),
            }),
        ),
    }
}

/// Print summary counts and the root-level progress bar
pub fn print_stats(stats: &GoalStats, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_stats_text(&mut handle, stats, &config),
        OutputMode::Json => write_json(&mut handle, stats),
    }
}

/// Print the result of an invariant audit
pub fn print_violations(violations: &[InvariantViolation], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_violations_text(&mut handle, violations, &config),
        OutputMode::Json => write_json(
            &mut handle,
            &serde_json::json!({
                "ok": violations.is_empty(),
                "violations": violations.iter().map(ToString::to_string).collect::<Vec<_>>(),
            }),
        ),
    }
}

/// Print a simple message
pub fn print_message(msg: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{msg}")
}

/// Print a JSON-formatted result for any serializable value
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, value)
}

fn write_json<W: Write, T: Serialize + ?Sized>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(w, "{json}")
}

// ============================================================================
// Text Formatting
// ============================================================================

fn print_goal_line<W: Write>(w: &mut W, goal: &Goal, config: &OutputConfig) -> io::Result<()> {
    write!(
        w,
        "{} {} {}",
        completion_icon(goal.completed, config),
        colorize_id(goal.id.as_str(), config),
        colorize_title(&goal.title, goal.completed, config)
    )?;
    if let Some(ref assignee) = goal.assignee {
        write!(w, "  @{}", colorize_assignee(assignee, config))?;
    }
    if let Some(deadline) = goal.deadline {
        write!(w, "  {} {}", dimmed("due", config), deadline.format("%Y-%m-%d"))?;
    }
    writeln!(w)
}

fn print_goals_text<W: Write>(w: &mut W, goals: &[&Goal], config: &OutputConfig) -> io::Result<()> {
    if goals.is_empty() {
        writeln!(w, "No goals found.")?;
        return Ok(());
    }

    writeln!(w, "Found {} goal(s):", goals.len())?;
    writeln!(w)?;
    for goal in goals {
        print_goal_line(w, goal, config)?;
    }
    Ok(())
}

fn print_goal_details_text<W: Write>(
    w: &mut W,
    goal: &Goal,
    parents: &[&Goal],
    children: &[&Goal],
    config: &OutputConfig,
    width: usize,
) -> io::Result<()> {
    let header_indent = goal.id.as_str().len() + 4;
    let mut title_lines = wrap_text(&goal.title, width.saturating_sub(header_indent)).into_iter();
    writeln!(
        w,
        "{} {}: {}",
        completion_icon(goal.completed, config),
        colorize_id(goal.id.as_str(), config),
        title_lines.next().unwrap_or_default()
    )?;
    for line in title_lines {
        writeln!(w, "{}{line}", " ".repeat(header_indent))?;
    }

    let status = if goal.completed { "completed" } else { "active" };
    writeln!(w, "{} {}", dimmed("Status:", config), status)?;

    if let Some(ref assignee) = goal.assignee {
        writeln!(
            w,
            "{} {}",
            dimmed("Assignee:", config),
            colorize_assignee(assignee, config)
        )?;
    }
    if let Some(deadline) = goal.deadline {
        writeln!(
            w,
            "{} {}",
            dimmed("Deadline:", config),
            deadline.format("%Y-%m-%d %H:%M")
        )?;
    }
    if let Some(ref url) = goal.image_url {
        writeln!(w, "{} {}", dimmed("Image:", config), url)?;
    }
    if let Some(ref url) = goal.icon_url {
        writeln!(w, "{} {}", dimmed("Icon:", config), url)?;
    }

    writeln!(
        w,
        "{} {}",
        dimmed("Created:", config),
        goal.created_at.format("%Y-%m-%d %H:%M")
    )?;
    if let Some(completed_at) = goal.completed_at {
        writeln!(
            w,
            "{} {}",
            dimmed("Completed:", config),
            completed_at.format("%Y-%m-%d %H:%M")
        )?;
    }

    print_related_section(w, "Parents", parents, config)?;
    print_related_section(w, "Children", children, config)?;
    Ok(())
}

fn print_related_section<W: Write>(
    w: &mut W,
    title: &str,
    goals: &[&Goal],
    config: &OutputConfig,
) -> io::Result<()> {
    if goals.is_empty() {
        return Ok(());
    }
    writeln!(w)?;
    writeln!(w, "{} ({}):", bold(title, config), goals.len())?;
    for goal in goals {
        write!(w, "  ")?;
        print_goal_line(w, goal, config)?;
    }
    Ok(())
}

fn print_stats_text<W: Write>(w: &mut W, stats: &GoalStats, config: &OutputConfig) -> io::Result<()> {
    writeln!(
        w,
        "{} {:>3}%",
        color::progress_bar(stats.progress, PROGRESS_BAR_WIDTH, config),
        stats.progress
    )?;
    writeln!(
        w,
        "{} total, {} completed, {} active ({} root, {} relation(s))",
        stats.total, stats.completed, stats.active, stats.roots, stats.relations
    )
}

fn print_violations_text<W: Write>(
    w: &mut W,
    violations: &[InvariantViolation],
    config: &OutputConfig,
) -> io::Result<()> {
    if violations.is_empty() {
        return writeln!(w, "{}", success("Goal graph is consistent.", config));
    }
    writeln!(
        w,
        "{}",
        error(&format!("Found {} problem(s):", violations.len()), config)
    )?;
    for violation in violations {
        writeln!(w, "  - {violation}")?;
    }
    Ok(())
}
