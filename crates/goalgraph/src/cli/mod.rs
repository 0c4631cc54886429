//! CLI argument parsing and command dispatch.
//!
//! # Commands
//!
//! - `init`: Initialize a new goalgraph workspace
//! - `add`: Create a goal, optionally under a parent
//! - `edit`: Change or clear goal fields
//! - `rm`: Delete a goal (detach or cascade)
//! - `toggle`: Flip completion for a goal and its descendants
//! - `mv`: Reparent a goal or move it to the root level
//! - `link` / `unlink`: Add or remove a single parent relation
//! - `show`, `list`, `tree`, `search`, `progress`: Read-only views
//! - `check`: Audit the graph's structural invariants
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! goalgraph add "Launch" --assignee alice --deadline 2030-01-15
//! goalgraph add "Write copy" --parent goal-a3f8
//! goalgraph mv goal-91bc --under goal-0e4f --index 0
//! goalgraph toggle goal-a3f8
//! goalgraph tree
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{
    AddArgs, CheckArgs, EditArgs, InitArgs, LinkArgs, ListArgs, MoveArgs, ProgressArgs,
    RemoveArgs, SearchArgs, ShowArgs, ToggleArgs, TreeArgs, UnlinkArgs,
};

pub use types::{CompletionFilterArg, DeletionModeArg, SortKeyArg};

pub use validators::{validate_goal_id, validate_prefix, validate_title};

/// Goalgraph - track goals in a multi-parent goal graph
///
/// Goals can have several parents. Completing a goal completes everything
/// beneath it. The graph is stored in `.goalgraph/goals.jsonl`.
#[derive(Parser, Debug)]
#[command(name = "goalgraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new goalgraph workspace
    ///
    /// Creates the `.goalgraph/` directory with configuration and an empty
    /// goal file.
    Init(InitArgs),

    /// Create a new goal
    Add(AddArgs),

    /// Edit an existing goal
    ///
    /// Only provided fields change. Use the `--no-*` flags to clear a field.
    Edit(EditArgs),

    /// Delete a goal
    ///
    /// By default children are detached and become roots when left without a
    /// parent. Set `delete-mode: cascade` in the config, or pass
    /// `--mode cascade`, to remove every descendant instead.
    #[command(visible_alias = "delete")]
    Rm(RemoveArgs),

    /// Toggle completion of a goal and all of its descendants
    Toggle(ToggleArgs),

    /// Move a goal under a new parent or to the root level
    ///
    /// The goal is detached from every current parent first.
    #[command(visible_alias = "move")]
    Mv(MoveArgs),

    /// Add a parent relation, keeping existing ones
    Link(LinkArgs),

    /// Remove a parent relation
    Unlink(UnlinkArgs),

    /// Show a goal with its parents and children
    Show(ShowArgs),

    /// List goals with an optional completion filter and sort key
    List(ListArgs),

    /// Render the goal outline
    Tree(TreeArgs),

    /// Search goal titles
    Search(SearchArgs),

    /// Show root-level completion progress
    Progress(ProgressArgs),

    /// Audit the goal graph's structural invariants
    Check(CheckArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Init(args)) => execute::execute_init(args).await,
            Some(Commands::Add(args)) => {
                let mut app = open_app().await?;
                execute::execute_add(&mut app, args, output_mode).await
            }
            Some(Commands::Edit(args)) => {
                let mut app = open_app().await?;
                execute::execute_edit(&mut app, args, output_mode).await
            }
            Some(Commands::Rm(args)) => {
                let mut app = open_app().await?;
                execute::execute_remove(&mut app, args, output_mode).await
            }
            Some(Commands::Toggle(args)) => {
                let mut app = open_app().await?;
                execute::execute_toggle(&mut app, args, output_mode).await
            }
            Some(Commands::Mv(args)) => {
                let mut app = open_app().await?;
                execute::execute_move(&mut app, args, output_mode).await
            }
            Some(Commands::Link(args)) => {
                let mut app = open_app().await?;
                execute::execute_link(&mut app, args, output_mode).await
            }
            Some(Commands::Unlink(args)) => {
                let mut app = open_app().await?;
                execute::execute_unlink(&mut app, args, output_mode).await
            }
            Some(Commands::Show(args)) => {
                let app = open_app().await?;
                execute::execute_show(&app, args, output_mode).await
            }
            Some(Commands::List(args)) => {
                let app = open_app().await?;
                execute::execute_list(&app, args, output_mode).await
            }
            Some(Commands::Tree(args)) => {
                let app = open_app().await?;
                execute::execute_tree(&app, args, output_mode).await
            }
            Some(Commands::Search(args)) => {
                let app = open_app().await?;
                execute::execute_search(&app, args, output_mode).await
            }
            Some(Commands::Progress(args)) => {
                let app = open_app().await?;
                execute::execute_progress(&app, args, output_mode).await
            }
            Some(Commands::Check(args)) => {
                let app = open_app().await?;
                execute::execute_check(&app, args, output_mode).await
            }
            None => {
                println!("Goalgraph goal tracker");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}

/// Open the workspace containing the current directory.
///
/// Records skipped while loading are logged by the loader at `warn` level.
async fn open_app() -> Result<crate::app::App> {
    Ok(crate::app::App::from_directory(&std::env::current_dir()?).await?)
}
