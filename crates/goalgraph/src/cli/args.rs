//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation.

use clap::Parser;

use super::types::{CompletionFilterArg, DeletionModeArg, SortKeyArg};
use super::validators::{
    validate_assignee, validate_deadline, validate_goal_id, validate_prefix, validate_title,
    validate_url,
};

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Goal ID prefix (e.g., "proj" for "proj-a3f8")
    ///
    /// Must be 2-20 alphanumeric characters.
    #[arg(short, long, value_parser = validate_prefix)]
    pub prefix: Option<String>,

    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `add` command
#[derive(Parser, Debug, Clone)]
pub struct AddArgs {
    /// Goal title (at most 255 characters)
    #[arg(value_parser = validate_title)]
    pub title: String,

    /// Image URL
    #[arg(long, value_parser = validate_url)]
    pub image: Option<String>,

    /// Icon URL
    #[arg(long, value_parser = validate_url)]
    pub icon: Option<String>,

    /// Assignee name
    #[arg(short, long, value_parser = validate_assignee)]
    pub assignee: Option<String>,

    /// Deadline as YYYY-MM-DD or an RFC 3339 timestamp
    #[arg(short, long, value_parser = validate_deadline)]
    pub deadline: Option<String>,

    /// Place the new goal under this parent instead of at the root
    #[arg(long, value_parser = validate_goal_id)]
    pub parent: Option<String>,

    /// Position among the parent's children (default: first)
    #[arg(long, requires = "parent", default_value_t = 0)]
    pub index: usize,
}

/// Arguments for the `edit` command
///
/// Only provided fields change. `--no-*` flags clear an optional field.
#[derive(Parser, Debug, Clone)]
pub struct EditArgs {
    /// Goal ID to edit
    #[arg(value_parser = validate_goal_id)]
    pub id: String,

    /// New title
    #[arg(long, value_parser = validate_title)]
    pub title: Option<String>,

    /// New image URL
    #[arg(long, value_parser = validate_url, conflicts_with = "no_image")]
    pub image: Option<String>,

    /// Clear the image URL
    #[arg(long)]
    pub no_image: bool,

    /// New icon URL
    #[arg(long, value_parser = validate_url, conflicts_with = "no_icon")]
    pub icon: Option<String>,

    /// Clear the icon URL
    #[arg(long)]
    pub no_icon: bool,

    /// New assignee
    #[arg(short, long, value_parser = validate_assignee, conflicts_with = "no_assignee")]
    pub assignee: Option<String>,

    /// Clear the assignee
    #[arg(long)]
    pub no_assignee: bool,

    /// New deadline
    #[arg(short, long, value_parser = validate_deadline, conflicts_with = "no_deadline")]
    pub deadline: Option<String>,

    /// Clear the deadline
    #[arg(long)]
    pub no_deadline: bool,
}

/// Arguments for the `rm` command
#[derive(Parser, Debug, Clone)]
pub struct RemoveArgs {
    /// Goal ID to delete
    #[arg(value_parser = validate_goal_id)]
    pub id: String,

    /// Override the configured deletion mode
    #[arg(long, value_enum)]
    pub mode: Option<DeletionModeArg>,
}

/// Arguments for the `toggle` command
#[derive(Parser, Debug, Clone)]
pub struct ToggleArgs {
    /// Goal ID whose completion flips, along with all its descendants
    #[arg(value_parser = validate_goal_id)]
    pub id: String,
}

/// Arguments for the `mv` command
///
/// Detaches the goal from every current parent, then places it under
/// `--under` or at the root level.
#[derive(Parser, Debug, Clone)]
pub struct MoveArgs {
    /// Goal ID to move
    #[arg(value_parser = validate_goal_id)]
    pub id: String,

    /// New parent
    #[arg(long, value_parser = validate_goal_id, required_unless_present = "root", conflicts_with = "root")]
    pub under: Option<String>,

    /// Move to the root level
    #[arg(long)]
    pub root: bool,

    /// Position among the new siblings (clamped)
    #[arg(long, default_value_t = 0)]
    pub index: usize,
}

/// Arguments for the `link` command
#[derive(Parser, Debug, Clone)]
pub struct LinkArgs {
    /// Parent goal ID
    #[arg(value_parser = validate_goal_id)]
    pub parent: String,

    /// Child goal ID
    #[arg(value_parser = validate_goal_id)]
    pub child: String,

    /// Position among the parent's children (default: last)
    #[arg(long)]
    pub index: Option<usize>,
}

/// Arguments for the `unlink` command
#[derive(Parser, Debug, Clone)]
pub struct UnlinkArgs {
    /// Parent goal ID
    #[arg(value_parser = validate_goal_id)]
    pub parent: String,

    /// Child goal ID
    #[arg(value_parser = validate_goal_id)]
    pub child: String,
}

/// Arguments for the `show` command
#[derive(Parser, Debug, Clone)]
pub struct ShowArgs {
    /// Goal ID to show
    #[arg(value_parser = validate_goal_id)]
    pub id: String,
}

/// Arguments for the `list` command
#[derive(Parser, Debug, Clone)]
pub struct ListArgs {
    /// Completion filter
    #[arg(short, long, value_enum, default_value_t)]
    pub filter: CompletionFilterArg,

    /// Sort key
    #[arg(short, long, value_enum, default_value_t)]
    pub sort: SortKeyArg,

    /// Maximum number of goals to show
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

/// Arguments for the `tree` command
#[derive(Parser, Debug, Clone)]
pub struct TreeArgs {
    /// Render only the subtree under this goal
    #[arg(value_parser = validate_goal_id)]
    pub id: Option<String>,
}

/// Arguments for the `search` command
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Case-insensitive title substring
    pub query: String,
}

/// Arguments for the `progress` command
#[derive(Parser, Debug, Clone)]
pub struct ProgressArgs {}

/// Arguments for the `check` command
#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {}
