//! Goal outline rendering for `goalgraph tree`.

use std::io::{self, Write};

use super::color::{colorize_id, colorize_title, completion_icon};
use super::{OutputConfig, OutputMode, content_width, truncate};
use crate::view::OutlineEntry;

/// Print a depth-first outline with ASCII/Unicode connectors.
///
/// Renders a tree like:
/// ```text
/// ○ goal-a3f8 Launch
/// ├── ✓ goal-91bc Write copy
/// │   └── ✓ goal-77de Proofread
/// └── ○ goal-0e4f Ship
/// ```
pub fn print_outline(entries: &[OutlineEntry<'_>], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_outline_text(&mut handle, entries, &config, content_width(&config)),
        OutputMode::Json => {
            let json = outline_to_json(entries);
            let output = serde_json::to_string_pretty(&json).map_err(io::Error::other)?;
            writeln!(handle, "{output}")
        }
    }
}

/// Render the outline. Titles are cut to fit `width`.
pub(crate) fn print_outline_text<W: Write>(
    w: &mut W,
    entries: &[OutlineEntry<'_>],
    config: &OutputConfig,
    width: usize,
) -> io::Result<()> {
    if entries.is_empty() {
        return writeln!(w, "No goals yet.");
    }

    let (branch, corner, pipe, space) = if config.use_ascii {
        ("|-- ", "`-- ", "|   ", "    ")
    } else {
        ("├── ", "└── ", "│   ", "    ")
    };

    // open[d] is true while the entry last seen at depth d has siblings below
    let mut open: Vec<bool> = Vec::new();

    for entry in entries {
        let mut prefix = String::new();
        if entry.depth > 0 {
            for &has_more in open.iter().take(entry.depth).skip(1) {
                prefix.push_str(if has_more { pipe } else { space });
            }
            prefix.push_str(if entry.is_last { corner } else { branch });
        }
        open.truncate(entry.depth);
        open.push(!entry.is_last);

        let goal = entry.goal;
        let used = prefix.chars().count()
            + if config.use_ascii { 4 } else { 2 }
            + goal.id.as_str().len()
            + 1;
        let title = truncate(&goal.title, width.saturating_sub(used), config);

        let prefix = super::color::dimmed(&prefix, config);
        writeln!(
            w,
            "{}{} {} {}",
            prefix,
            completion_icon(goal.completed, config),
            colorize_id(goal.id.as_str(), config),
            colorize_title(&title, goal.completed, config)
        )?;
    }

    Ok(())
}

/// Nest flat outline entries back into a JSON tree.
pub(crate) fn outline_to_json(entries: &[OutlineEntry<'_>]) -> serde_json::Value {
    fn attach(stack: &mut Vec<(usize, serde_json::Value)>, top: &mut Vec<serde_json::Value>) {
        let Some((_, node)) = stack.pop() else {
            return;
        };
        match stack.last_mut() {
            Some((_, parent)) => {
                if let Some(children) = parent["children"].as_array_mut() {
                    children.push(node);
                }
            }
            None => top.push(node),
        }
    }

    let mut top = Vec::new();
    let mut stack: Vec<(usize, serde_json::Value)> = Vec::new();

    for entry in entries {
        while stack.last().is_some_and(|(depth, _)| *depth >= entry.depth) {
            attach(&mut stack, &mut top);
        }
        let goal = entry.goal;
        stack.push((
            entry.depth,
            serde_json::json!({
                "id": goal.id,
                "title": goal.title,
                "completed": goal.completed,
                "children": [],
            }),
        ));
    }
    while !stack.is_empty() {
        attach(&mut stack, &mut top);
    }

    serde_json::Value::Array(top)
}
