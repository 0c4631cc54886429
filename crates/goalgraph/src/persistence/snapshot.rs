//! JSONL snapshot record format.
//!
//! A snapshot is one JSON object per line, tagged by `record`:
//!
//! ```text
//! {"record":"meta","version":1,"next_sequence":4,"retired":["goal-77qz"]}
//! {"record":"goal","id":"goal-a3f8","title":"Plan trip","completed":false,...}
//! {"record":"relation","parent":"goal-a3f8","child":"goal-9k2m"}
//! {"record":"root_order","ids":["goal-a3f8"]}
//! ```
//!
//! Relations are written per parent in sibling order, so line order encodes
//! each parent's child order. `retired` lists ids of deleted goals so they stay
//! reserved across sessions; it is omitted when empty.

use crate::domain::{Goal, GoalId};
use crate::store::GoalGraphStore;
use serde::{Deserialize, Serialize};

/// Current snapshot format version.
pub const FORMAT_VERSION: u32 = 1;

/// One line of a snapshot file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum SnapshotRecord {
    /// File header
    Meta {
        /// Format version
        version: u32,
        /// Sequence number for the next created goal
        next_sequence: u64,
        /// Ids of deleted goals
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        retired: Vec<GoalId>,
    },

    /// A goal
    Goal(Goal),

    /// A parent -> child relation
    Relation {
        /// Parent goal
        parent: GoalId,
        /// Child goal
        child: GoalId,
    },

    /// Root order
    RootOrder {
        /// Root ids in order
        ids: Vec<GoalId>,
    },
}

/// Serialize a store into snapshot records: header, goals in creation order,
/// relations in sibling order, then the root order.
pub fn to_records(
    store: &GoalGraphStore,
    next_sequence: u64,
    retired: &[GoalId],
) -> Vec<SnapshotRecord> {
    let export = store.export();

    let mut records = Vec::with_capacity(export.goals.len() + export.relations.len() + 2);
    records.push(SnapshotRecord::Meta {
        version: FORMAT_VERSION,
        next_sequence,
        retired: retired.to_vec(),
    });
    records.extend(export.goals.into_iter().map(SnapshotRecord::Goal));
    records.extend(
        export
            .relations
            .into_iter()
            .map(|r| SnapshotRecord::Relation {
                parent: r.parent,
                child: r.child,
            }),
    );
    records.push(SnapshotRecord::RootOrder {
        ids: export.root_order,
    });
    records
}
