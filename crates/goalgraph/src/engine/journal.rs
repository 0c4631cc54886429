//! Mutation journal entries.
//!
//! The engine appends one [`MutationRecord`] per successful mutation. The host
//! drains them with [`super::MutationEngine::take_journal`] and hands them to
//! the persistence adapter, which may append them to an audit log.

use crate::domain::{Actor, GoalId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationRecord {
    /// When the mutation was applied
    pub at: DateTime<Utc>,

    /// Acting principal, if the host supplied one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<Actor>,

    /// What changed
    #[serde(flatten)]
    pub kind: MutationKind,
}

/// The kind of mutation and the ids it touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MutationKind {
    /// A goal was created
    Created {
        /// New goal
        id: GoalId,
    },

    /// A goal's fields were updated
    Updated {
        /// Updated goal
        id: GoalId,
    },

    /// A goal (and, in cascade mode, its descendants) was deleted
    Deleted {
        /// Goal the delete was requested for
        id: GoalId,
        /// Every removed goal, including `id`
        removed: Vec<GoalId>,
    },

    /// Completion was toggled and cascaded to descendants
    CompletionToggled {
        /// Goal the toggle was requested for
        id: GoalId,
        /// New completion value
        completed: bool,
        /// Every goal set to `completed`, including `id`
        affected: Vec<GoalId>,
    },

    /// A goal was reparented and/or reordered
    Moved {
        /// Moved goal
        id: GoalId,
        /// New parent, `None` for the root level
        parent: Option<GoalId>,
        /// Final sibling position
        index: usize,
    },

    /// An additional parent relation was added
    Linked {
        /// Parent goal
        parent: GoalId,
        /// Child goal
        child: GoalId,
        /// Final sibling position
        index: usize,
    },

    /// A parent relation was removed
    Unlinked {
        /// Parent goal
        parent: GoalId,
        /// Child goal
        child: GoalId,
    },
}

impl MutationKind {
    /// The goal the mutation was requested for.
    pub fn subject(&self) -> &GoalId {
        match self {
            Self::Created { id }
            | Self::Updated { id }
            | Self::Deleted { id, .. }
            | Self::CompletionToggled { id, .. }
            | Self::Moved { id, .. } => id,
            Self::Linked { child, .. } | Self::Unlinked { child, .. } => child,
        }
    }
}
