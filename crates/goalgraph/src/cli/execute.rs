//! Command execution logic.
//!
//! Mutating commands persist through [`App::persist`] before printing, so a
//! durability failure is reported instead of a success message.

use anyhow::{Result, bail};

use super::args::{
    AddArgs, CheckArgs, EditArgs, InitArgs, LinkArgs, ListArgs, MoveArgs, ProgressArgs,
    RemoveArgs, SearchArgs, ShowArgs, ToggleArgs, TreeArgs, UnlinkArgs,
};
use crate::app::App;
use crate::domain::{GoalId, GoalPatch, MoveRequest, NewGoal, OrderedView};
use crate::error::Error;
use crate::output::{self, OutputMode, OutputConfig};

/// Execute the init command
pub async fn execute_init(args: &InitArgs) -> Result<()> {
    use crate::commands::init;

    let current_dir = std::env::current_dir()?;

    if !args.quiet {
        println!(
            "Initializing goalgraph workspace{}...",
            args.prefix
                .as_ref()
                .map(|p| format!(" with prefix '{p}'"))
                .unwrap_or_default()
        );
    }

    let result = init::init(&current_dir, args.prefix.as_deref()).await?;

    if !args.quiet {
        println!("Initialized goalgraph in {}", result.goalgraph_dir.display());
        println!("  Config: {}", result.config_file.display());
        println!("  Goals:  {}", result.goals_file.display());
        println!("  Goal prefix: {}", result.prefix);
    }

    Ok(())
}

/// Execute the add command
pub async fn execute_add(app: &mut App, args: &AddArgs, output_mode: OutputMode) -> Result<()> {
    let parent = args.parent.as_deref().map(GoalId::from);
    // Refuse before creating anything so a bad parent leaves no stray root
    if let Some(parent) = &parent {
        app.engine().store().require(parent)?;
    }

    let new_goal = NewGoal {
        title: args.title.clone(),
        image_url: args.image.clone(),
        icon_url: args.icon.clone(),
        assignee: args.assignee.clone(),
        deadline: args.deadline.clone(),
    };
    let goal = app.engine_mut().create(new_goal)?;

    if let Some(parent) = parent {
        app.engine_mut()
            .move_goal(MoveRequest::under(goal.id.clone(), parent, args.index))?;
    }
    app.persist().await?;

    match output_mode {
        OutputMode::Json => output::print_goal(&goal, output_mode)?,
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            println!(
                "{} {}",
                output::success("Created goal", &config),
                goal.id
            );
        }
    }
    Ok(())
}

/// Execute the edit command
pub async fn execute_edit(app: &mut App, args: &EditArgs, output_mode: OutputMode) -> Result<()> {
    let id = GoalId::from(args.id.as_str());
    let patch = GoalPatch {
        title: args.title.clone(),
        image_url: clearable(args.image.as_ref(), args.no_image),
        icon_url: clearable(args.icon.as_ref(), args.no_icon),
        assignee: clearable(args.assignee.as_ref(), args.no_assignee),
        deadline: clearable(args.deadline.as_ref(), args.no_deadline),
    };

    if patch.is_empty() && output_mode == OutputMode::Text {
        println!("Nothing to change.");
        return Ok(());
    }

    let goal = app.engine_mut().update(&id, patch)?;
    app.persist().await?;

    output::print_goal(&goal, output_mode)?;
    Ok(())
}

/// `--field value` sets, `--no-field` clears, neither leaves it alone.
fn clearable(value: Option<&String>, clear: bool) -> Option<Option<String>> {
    if clear {
        Some(None)
    } else {
        value.map(|v| Some(v.clone()))
    }
}

/// Execute the rm command
pub async fn execute_remove(
    app: &mut App,
    args: &RemoveArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let id = GoalId::from(args.id.as_str());
    let removed = match args.mode {
        Some(mode) => app.engine_mut().delete_with_mode(&id, mode.into())?,
        None => app.engine_mut().delete(&id)?,
    };
    app.persist().await?;

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({ "removed": removed }))?,
        OutputMode::Text => {
            println!("Deleted {id}");
            if removed.len() > 1 {
                println!("  plus {} descendant(s)", removed.len() - 1);
            }
        }
    }
    Ok(())
}

/// Execute the toggle command
pub async fn execute_toggle(
    app: &mut App,
    args: &ToggleArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let id = GoalId::from(args.id.as_str());
    let affected = app.engine_mut().toggle_completion(&id)?;
    app.persist().await?;

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({ "affected": affected }))?,
        OutputMode::Text => {
            let completed = affected.first().is_some_and(|g| g.completed);
            let state = if completed { "completed" } else { "active" };
            println!("Marked {} goal(s) {state}", affected.len());
        }
    }
    Ok(())
}

/// Execute the mv command
pub async fn execute_move(app: &mut App, args: &MoveArgs, output_mode: OutputMode) -> Result<()> {
    let id = GoalId::from(args.id.as_str());
    let request = match &args.under {
        Some(parent) => MoveRequest::under(id, GoalId::from(parent.as_str()), args.index),
        None => MoveRequest::to_root(id, args.index),
    };

    let view = app.engine_mut().move_goal(request)?;
    app.persist().await?;

    print_ordered_view(&view, output_mode)
}

/// Execute the link command
pub async fn execute_link(app: &mut App, args: &LinkArgs, output_mode: OutputMode) -> Result<()> {
    let parent = GoalId::from(args.parent.as_str());
    let child = GoalId::from(args.child.as_str());

    let view = app.engine_mut().link(&parent, &child, args.index)?;
    app.persist().await?;

    print_ordered_view(&view, output_mode)
}

/// Execute the unlink command
pub async fn execute_unlink(
    app: &mut App,
    args: &UnlinkArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let parent = GoalId::from(args.parent.as_str());
    let child = GoalId::from(args.child.as_str());

    let removed = app.engine_mut().unlink(&parent, &child)?;
    app.persist().await?;

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({ "removed": removed }))?,
        OutputMode::Text if removed => println!("Unlinked {parent} -> {child}"),
        OutputMode::Text => println!("No relation {parent} -> {child}"),
    }
    Ok(())
}

fn print_ordered_view(view: &OrderedView, output_mode: OutputMode) -> Result<()> {
    match output_mode {
        OutputMode::Json => output::print_json(view)?,
        OutputMode::Text => {
            let Some(moved) = view.siblings.get(view.index) else {
                return Ok(());
            };
            match &view.parent {
                Some(parent) => println!("Placed {moved} under {parent} at position {}", view.index),
                None => println!("Placed {moved} at the root level, position {}", view.index),
            }
        }
    }
    Ok(())
}

/// Execute the show command
pub async fn execute_show(app: &App, args: &ShowArgs, output_mode: OutputMode) -> Result<()> {
    let id = GoalId::from(args.id.as_str());
    let view = app.engine().view();

    let goal = view.get(&id).ok_or_else(|| Error::GoalNotFound(id.clone()))?;
    let parents = view.parents(&id)?;
    let children = view.children(&id)?;

    output::print_goal_details(goal, &parents, &children, output_mode)?;
    Ok(())
}

/// Execute the list command
pub async fn execute_list(app: &App, args: &ListArgs, output_mode: OutputMode) -> Result<()> {
    let mut goals = app
        .engine()
        .view()
        .list(args.filter.into(), args.sort.into());
    if let Some(limit) = args.limit {
        goals.truncate(limit);
    }

    output::print_goals(&goals, output_mode)?;
    Ok(())
}

/// Execute the tree command
pub async fn execute_tree(app: &App, args: &TreeArgs, output_mode: OutputMode) -> Result<()> {
    let start = args.id.as_deref().map(GoalId::from);
    let entries = app.engine().view().outline(start.as_ref())?;

    output::print_outline(&entries, output_mode)?;
    Ok(())
}

/// Execute the search command
pub async fn execute_search(app: &App, args: &SearchArgs, output_mode: OutputMode) -> Result<()> {
    let goals = app.engine().view().search(&args.query);

    output::print_goals(&goals, output_mode)?;
    Ok(())
}

/// Execute the progress command
pub async fn execute_progress(
    app: &App,
    _args: &ProgressArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let stats = app.engine().view().stats();

    output::print_stats(&stats, output_mode)?;
    Ok(())
}

/// Execute the check command
///
/// Fails when any structural invariant is broken.
pub async fn execute_check(app: &App, _args: &CheckArgs, output_mode: OutputMode) -> Result<()> {
    let violations = app.engine().store().check_invariants();

    output::print_violations(&violations, output_mode)?;
    if !violations.is_empty() {
        bail!("goal graph failed {} invariant check(s)", violations.len());
    }
    Ok(())
}
