//! JSONL snapshot persistence and audit log.
//!
//! Loading is resilient: bad lines and records that would break a store
//! invariant are skipped and reported as [`LoadWarning`]s instead of failing
//! the whole load. Saving is atomic.

use super::snapshot::{FORMAT_VERSION, SnapshotRecord, to_records};
use super::LoadedGraph;
use crate::domain::validation::validate_new_goal;
use crate::domain::{Goal, GoalId, NewGoal};
use crate::engine::{MutationEngine, MutationRecord};
use crate::error::{Error, PersistenceError, Result};
use crate::store::GoalGraphStore;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, warn};

/// Non-fatal problems found while loading a snapshot.
///
/// The offending line or record is skipped; everything else loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// A line that is not a valid snapshot record
    MalformedJson {
        /// 1-based file line
        line_number: usize,
        /// Parser message
        error: String,
    },

    /// A goal whose fields fail validation
    InvalidGoal {
        /// Id of the skipped goal
        goal_id: GoalId,
        /// 1-based file line
        line_number: usize,
        /// Validation message
        error: String,
    },

    /// A second goal record with an id already loaded
    DuplicateGoal {
        /// Repeated id
        goal_id: GoalId,
        /// 1-based file line
        line_number: usize,
    },

    /// A relation naming a goal that was not loaded
    OrphanedRelation {
        /// Parent goal
        parent: GoalId,
        /// Child goal
        child: GoalId,
    },

    /// A relation that would close a cycle (including a self-relation)
    CircularRelation {
        /// Parent goal
        parent: GoalId,
        /// Child goal
        child: GoalId,
    },

    /// A relation listed more than once
    DuplicateRelation {
        /// Parent goal
        parent: GoalId,
        /// Child goal
        child: GoalId,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedJson { line_number, error } => {
                write!(f, "line {line_number}: skipped malformed record: {error}")
            }
            Self::InvalidGoal {
                goal_id,
                line_number,
                error,
            } => write!(f, "line {line_number}: skipped invalid goal {goal_id}: {error}"),
            Self::DuplicateGoal {
                goal_id,
                line_number,
            } => write!(f, "line {line_number}: skipped duplicate goal {goal_id}"),
            Self::OrphanedRelation { parent, child } => {
                write!(f, "skipped relation {parent} -> {child}: unknown goal")
            }
            Self::CircularRelation { parent, child } => {
                write!(f, "skipped relation {parent} -> {child}: would create a cycle")
            }
            Self::DuplicateRelation { parent, child } => {
                write!(f, "skipped duplicate relation {parent} -> {child}")
            }
        }
    }
}

/// Load a snapshot file.
///
/// A missing file loads as an empty graph.
///
/// # Passes
///
/// 1. Parse every line, collecting goals, relations, the root order and the
///    header. Malformed lines are skipped.
/// 2. Validate and insert goals. Invalid and duplicate goals are skipped.
/// 3. Add relations in file order, which rebuilds each sibling order. Orphaned,
///    duplicate and cycle-closing relations are skipped.
/// 4. Reconcile the stored root order with the goals that ended up parentless.
///
/// # Errors
///
/// - [`Error::Io`] if the file exists but cannot be read
/// - [`PersistenceError::UnsupportedVersion`] if the header names a newer format
pub async fn load_snapshot(path: &Path) -> Result<LoadedGraph> {
    let file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "No snapshot file, starting empty");
            return Ok(LoadedGraph::default());
        }
        Err(e) => return Err(Error::Io(e)),
    };

    let mut warnings = Vec::new();
    let mut goals: Vec<(usize, Goal)> = Vec::new();
    let mut relations: Vec<(GoalId, GoalId)> = Vec::new();
    let mut root_order: Vec<GoalId> = Vec::new();
    let mut next_sequence = 1;
    let mut retired: Vec<GoalId> = Vec::new();

    // Pass 1: parse
    let mut lines = BufReader::new(file).lines();
    let mut line_number = 0;
    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<SnapshotRecord>(&line) {
            Ok(SnapshotRecord::Meta {
                version,
                next_sequence: stored,
                retired: stored_retired,
            }) => {
                if version > FORMAT_VERSION {
                    return Err(PersistenceError::UnsupportedVersion {
                        found: version,
                        supported: FORMAT_VERSION,
                    }
                    .into());
                }
                next_sequence = stored;
                retired = stored_retired;
            }
            Ok(SnapshotRecord::Goal(goal)) => goals.push((line_number, goal)),
            Ok(SnapshotRecord::Relation { parent, child }) => relations.push((parent, child)),
            Ok(SnapshotRecord::RootOrder { ids }) => root_order = ids,
            Err(e) => warnings.push(LoadWarning::MalformedJson {
                line_number,
                error: e.to_string(),
            }),
        }
    }

    // Pass 2: goals
    let mut store = GoalGraphStore::new();
    for (line_number, goal) in goals {
        if let Err(errors) = validate_stored_goal(&goal) {
            warnings.push(LoadWarning::InvalidGoal {
                goal_id: goal.id.clone(),
                line_number,
                error: errors,
            });
            continue;
        }

        let goal_id = goal.id.clone();
        if store.insert_goal(goal).is_err() {
            warnings.push(LoadWarning::DuplicateGoal {
                goal_id,
                line_number,
            });
        }
    }

    // Pass 3: relations
    for (parent, child) in relations {
        match store.add_edge(&parent, &child) {
            Ok(()) => {}
            Err(Error::GoalNotFound(_)) => {
                warnings.push(LoadWarning::OrphanedRelation { parent, child });
            }
            Err(Error::Cycle { .. }) => {
                warnings.push(LoadWarning::CircularRelation { parent, child });
            }
            Err(Error::DuplicateEdge { .. }) => {
                warnings.push(LoadWarning::DuplicateRelation { parent, child });
            }
            Err(e) => return Err(e),
        }
    }

    // Pass 4: root order
    store.reconcile_root_order(&root_order);

    for warning in &warnings {
        warn!(path = %path.display(), "{}", warning);
    }
    debug!(
        path = %path.display(),
        goals = store.len(),
        relations = store.relation_count(),
        warnings = warnings.len(),
        "Loaded snapshot"
    );

    Ok(LoadedGraph {
        store,
        next_sequence,
        retired,
        warnings,
    })
}

/// Write a full snapshot of `engine` atomically.
///
/// Records go to `<path>.tmp`, which is flushed and then renamed over `path`.
/// If writing fails the temporary file is removed and `path` is untouched.
pub async fn save_snapshot(path: &Path, engine: &MutationEngine) -> Result<()> {
    let temp_path = temp_path_for(path);
    let records = to_records(engine.store(), engine.next_sequence(), engine.retired_ids());

    if let Err(e) = write_records(&temp_path, &records).await {
        // Best-effort cleanup
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e);
    }

    tokio::fs::rename(&temp_path, path).await?;

    debug!(path = %path.display(), records = records.len(), "Saved snapshot");
    Ok(())
}

/// Append mutation records to an audit log, one JSON object per line.
pub async fn append_audit(path: &Path, records: &[MutationRecord]) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    let mut writer = BufWriter::new(file);
    for record in records {
        let json = serde_json::to_string(record).map_err(PersistenceError::Serialization)?;
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }
    writer.flush().await?;
    Ok(())
}

async fn write_records(path: &Path, records: &[SnapshotRecord]) -> Result<()> {
    let file = File::create(path).await?;
    let mut writer = BufWriter::new(file);
    for record in records {
        let json = serde_json::to_string(record).map_err(PersistenceError::Serialization)?;
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }
    writer.flush().await?;
    Ok(())
}

/// `goals.jsonl` -> `goals.jsonl.tmp`
fn temp_path_for(path: &Path) -> PathBuf {
    let mut temp = path.as_os_str().to_os_string();
    temp.push(".tmp");
    PathBuf::from(temp)
}

/// Apply the creation field checks to a stored goal, and require
/// `completed_at` to be present exactly when the goal is completed.
fn validate_stored_goal(goal: &Goal) -> std::result::Result<(), String> {
    match (goal.completed, goal.completed_at.is_some()) {
        (true, false) => return Err("completed goal has no completed_at".to_string()),
        (false, true) => return Err("active goal has a completed_at".to_string()),
        _ => {}
    }

    let fields = NewGoal {
        title: goal.title.clone(),
        image_url: goal.image_url.clone(),
        icon_url: goal.icon_url.clone(),
        assignee: goal.assignee.clone(),
        deadline: None,
    };
    validate_new_goal(&fields)
        .map(|_| ())
        .map_err(|errors| errors.to_string())
}
