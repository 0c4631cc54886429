//! Domain types for goal tracking.
//!
//! A [`Goal`] never stores its own relations: parent/child links live only in
//! the graph index of [`crate::store::GoalGraphStore`] and are exposed as
//! [`Relation`] values when exported.

pub mod validation;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Maximum length of a goal title, in characters.
pub const MAX_TITLE_LENGTH: usize = 255;

/// Unique identifier for a goal.
///
/// Assigned once at creation and never reused or mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalId(pub String);

impl GoalId {
    /// Create a new goal ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string representation of the goal ID
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for GoalId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for GoalId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A trackable goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    /// Unique identifier
    pub id: GoalId,

    /// Goal title (non-empty, at most [`MAX_TITLE_LENGTH`] characters)
    pub title: String,

    /// Image URL (optional, absolute)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Icon URL (optional, absolute)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,

    /// Assignee (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,

    /// Deadline (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,

    /// Whether the goal is completed
    pub completed: bool,

    /// Creation timestamp (immutable)
    pub created_at: DateTime<Utc>,

    /// Completion timestamp, set while `completed` is true
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// Creation ordinal. Views use it as "creation order".
    pub sequence: u64,
}

impl Goal {
    /// Set the completed flag, stamping or clearing `completed_at` to match.
    ///
    /// Returns `true` if the flag changed. An already-completed goal keeps its
    /// original completion timestamp.
    pub fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) -> bool {
        if self.completed == completed {
            return false;
        }
        self.completed = completed;
        self.completed_at = completed.then_some(now);
        true
    }

    /// Creation order: ascending `sequence`, then `id` when sequences tie.
    pub fn cmp_creation(&self, other: &Self) -> Ordering {
        self.sequence
            .cmp(&other.sequence)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Data for creating a new goal.
///
/// `deadline` is raw input; it is parsed by the validator
/// (RFC 3339 timestamp or `YYYY-MM-DD`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewGoal {
    /// Goal title
    pub title: String,

    /// Image URL (optional)
    pub image_url: Option<String>,

    /// Icon URL (optional)
    pub icon_url: Option<String>,

    /// Assignee (optional)
    pub assignee: Option<String>,

    /// Deadline (optional, unparsed)
    pub deadline: Option<String>,
}

impl NewGoal {
    /// A new goal with only a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Partial update of a goal's fields.
///
/// The outer `Option` says whether a field is part of the update at all; for
/// clearable fields the inner `Option` distinguishes "set to this value"
/// (`Some(Some(v))`) from "clear" (`Some(None)`). Fields left as `None` are
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalPatch {
    /// New title (if updating)
    pub title: Option<String>,

    /// New image URL (if updating, `Some(None)` to clear)
    pub image_url: Option<Option<String>>,

    /// New icon URL (if updating, `Some(None)` to clear)
    pub icon_url: Option<Option<String>>,

    /// New assignee (if updating, `Some(None)` to clear)
    pub assignee: Option<Option<String>>,

    /// New deadline, unparsed (if updating, `Some(None)` to clear)
    pub deadline: Option<Option<String>>,
}

impl GoalPatch {
    /// Whether the patch touches no field.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.image_url.is_none()
            && self.icon_url.is_none()
            && self.assignee.is_none()
            && self.deadline.is_none()
    }
}

/// A directed parent -> child relation between two goals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Relation {
    /// The containing goal
    pub parent: GoalId,

    /// The contained goal
    pub child: GoalId,
}

/// A decoded drag-and-drop intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    /// Goal being moved
    pub goal: GoalId,

    /// New parent, or `None` to make the goal a root
    pub new_parent: Option<GoalId>,

    /// Target position among the new siblings (clamped)
    pub index: usize,
}

impl MoveRequest {
    /// Move `goal` under `parent` at `index`.
    pub fn under(goal: GoalId, parent: GoalId, index: usize) -> Self {
        Self {
            goal,
            new_parent: Some(parent),
            index,
        }
    }

    /// Move `goal` to the root level at `index`.
    pub fn to_root(goal: GoalId, index: usize) -> Self {
        Self {
            goal,
            new_parent: None,
            index,
        }
    }
}

/// The sibling sequence a goal ended up in after a move or link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderedView {
    /// Parent whose child order this is, or `None` for the root order
    pub parent: Option<GoalId>,

    /// Sibling ids in order
    pub siblings: Vec<GoalId>,

    /// Position of the moved goal within `siblings`
    pub index: usize,
}

/// Which goals a listing includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionFilter {
    /// Every goal
    #[default]
    All,

    /// Goals not yet completed
    Active,

    /// Completed goals
    Completed,
}

impl CompletionFilter {
    /// Whether `goal` passes the filter.
    pub fn matches(self, goal: &Goal) -> bool {
        match self {
            Self::All => true,
            Self::Active => !goal.completed,
            Self::Completed => goal.completed,
        }
    }
}

impl fmt::Display for CompletionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// Sort key for goal listings. Sorting is stable and ties fall back to
/// creation order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Oldest first
    #[default]
    CreationOrder,

    /// By assignee; unassigned goals last
    Assignee,

    /// Earliest deadline first; goals without a deadline last
    Deadline,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreationOrder => write!(f, "creation_order"),
            Self::Assignee => write!(f, "assignee"),
            Self::Deadline => write!(f, "deadline"),
        }
    }
}

/// What happens to descendants when a goal is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletionMode {
    /// Remove the goal and its relations; orphaned children become roots
    #[default]
    Detach,

    /// Remove the goal and every transitive descendant
    Cascade,
}

impl fmt::Display for DeletionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detach => write!(f, "detach"),
            Self::Cascade => write!(f, "cascade"),
        }
    }
}

/// The acting principal, recorded for audit only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actor(pub String);

impl Actor {
    /// Create a new actor
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
