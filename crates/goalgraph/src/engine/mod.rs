//! State-changing operations over a [`GoalGraphStore`].
//!
//! [`MutationEngine`] owns its store exclusively. Every operation validates
//! first and mutates second, writing only through the store's primitives, so a
//! failed call leaves the graph as it was. Operations are synchronous and run
//! to completion; callers serialize access.

mod journal;
mod reparent;

pub use journal::{MutationKind, MutationRecord};

use crate::domain::validation::{merge_patch, validate_new_goal};
use crate::domain::{Actor, DeletionMode, Goal, GoalId, GoalPatch, NewGoal};
use crate::error::{Error, Result};
use crate::id_generation::{IdGenerator, IdGeneratorConfig};
use crate::store::GoalGraphStore;
use crate::view::ViewEngine;
use chrono::Utc;
use tracing::debug;

/// Default prefix for generated goal ids.
pub const DEFAULT_ID_PREFIX: &str = "goal";

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Prefix for generated ids
    pub id_prefix: String,

    /// Behaviour of [`MutationEngine::delete`]
    pub deletion_mode: DeletionMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            deletion_mode: DeletionMode::default(),
        }
    }
}

/// All state-changing goal operations.
#[derive(Debug)]
pub struct MutationEngine {
    store: GoalGraphStore,
    ids: IdGenerator,
    config: EngineConfig,
    next_sequence: u64,
    journal: Vec<MutationRecord>,
    actor: Option<Actor>,
    retired: Vec<GoalId>,
}

impl MutationEngine {
    /// Create an engine over an empty store.
    pub fn new(config: EngineConfig) -> Self {
        Self::from_store(GoalGraphStore::new(), 1, config)
    }

    /// Create an engine over a loaded store.
    ///
    /// Every stored id is reserved so it is never generated again, and the
    /// sequence counter is advanced past every stored goal.
    pub fn from_store(store: GoalGraphStore, next_sequence: u64, config: EngineConfig) -> Self {
        let mut ids = IdGenerator::new(IdGeneratorConfig {
            prefix: config.id_prefix.clone(),
        });
        let mut next = next_sequence.max(1);
        for goal in store.goals() {
            ids.register_id(goal.id.as_str().to_string());
            next = next.max(goal.sequence + 1);
        }

        Self {
            store,
            ids,
            config,
            next_sequence: next,
            journal: Vec::new(),
            actor: None,
            retired: Vec::new(),
        }
    }

    /// Reserve ids of goals deleted in earlier sessions.
    ///
    /// Retired ids are never generated again and are carried into every
    /// later snapshot. Ids of goals present in the store are ignored.
    #[must_use]
    pub fn with_retired_ids(mut self, ids: impl IntoIterator<Item = GoalId>) -> Self {
        for id in ids {
            if self.store.contains(&id) || self.retired.contains(&id) {
                continue;
            }
            self.ids.register_id(id.as_str().to_string());
            self.retired.push(id);
        }
        self
    }

    /// Ids of deleted goals, in deletion order.
    pub fn retired_ids(&self) -> &[GoalId] {
        &self.retired
    }

    /// Whether `id` belongs to a live or deleted goal and can never be
    /// generated again.
    pub fn is_id_reserved(&self, id: &GoalId) -> bool {
        self.ids.is_reserved(id.as_str())
    }

    /// Set the acting principal stamped on journal entries.
    pub fn set_actor(&mut self, actor: Option<Actor>) {
        self.actor = actor;
    }

    /// The acting principal, if any.
    pub fn actor(&self) -> Option<&Actor> {
        self.actor.as_ref()
    }

    /// Engine settings.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read-only access to the underlying store.
    pub fn store(&self) -> &GoalGraphStore {
        &self.store
    }

    /// Derived read-only views over the current state.
    pub fn view(&self) -> ViewEngine<'_> {
        ViewEngine::new(&self.store)
    }

    /// Sequence number the next created goal will receive.
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Journal entries not yet drained.
    pub fn journal(&self) -> &[MutationRecord] {
        &self.journal
    }

    /// Drain the journal.
    pub fn take_journal(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.journal)
    }

    /// Create a goal with a fresh id, no relations, and `completed = false`.
    ///
    /// The new goal becomes the last root.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] listing every failing field
    /// - [`Error::IdGeneration`] if no unique id could be allocated
    pub fn create(&mut self, new_goal: NewGoal) -> Result<Goal> {
        let validated = validate_new_goal(&new_goal)?;

        let sequence = self.next_sequence;
        let title = new_goal.title.trim().to_string();
        let id = self.ids.generate(&title, sequence, self.store.len())?;

        let goal = Goal {
            id: GoalId::new(id),
            title,
            image_url: new_goal.image_url,
            icon_url: new_goal.icon_url,
            assignee: new_goal.assignee,
            deadline: validated.deadline,
            completed: false,
            created_at: Utc::now(),
            completed_at: None,
            sequence,
        };

        self.store.insert_goal(goal.clone())?;
        self.next_sequence += 1;

        debug!(goal = %goal.id, sequence, "Created goal");
        self.record(MutationKind::Created {
            id: goal.id.clone(),
        });
        Ok(goal)
    }

    /// Apply a partial field update.
    ///
    /// The merged result is validated exactly as creation. An empty patch
    /// returns the goal unchanged and records nothing.
    ///
    /// # Errors
    ///
    /// - [`Error::GoalNotFound`] if the goal is absent
    /// - [`Error::Validation`] if the merged fields are invalid
    pub fn update(&mut self, id: &GoalId, patch: GoalPatch) -> Result<Goal> {
        let current = self.store.require(id)?;
        if patch.is_empty() {
            return Ok(current.clone());
        }

        let merged = merge_patch(current, &patch);
        let validated = validate_new_goal(&merged)?;

        let goal = self.store.goal_mut(id)?;
        goal.title = merged.title.trim().to_string();
        goal.image_url = merged.image_url;
        goal.icon_url = merged.icon_url;
        goal.assignee = merged.assignee;
        goal.deadline = validated.deadline;
        let updated = goal.clone();

        debug!(goal = %id, "Updated goal");
        self.record(MutationKind::Updated { id: id.clone() });
        Ok(updated)
    }

    /// Delete a goal using the configured [`DeletionMode`].
    ///
    /// Returns the ids of every removed goal, `id` first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GoalNotFound`] if the goal is absent.
    pub fn delete(&mut self, id: &GoalId) -> Result<Vec<GoalId>> {
        self.delete_with_mode(id, self.config.deletion_mode)
    }

    /// Delete a goal with an explicit [`DeletionMode`].
    ///
    /// - [`DeletionMode::Detach`] removes the goal and every relation touching
    ///   it; children left without a parent become roots.
    /// - [`DeletionMode::Cascade`] also removes every transitive descendant,
    ///   including descendants that have other parents outside the subtree.
    ///   Surviving goals that lose their last parent become roots.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GoalNotFound`] if the goal is absent.
    pub fn delete_with_mode(&mut self, id: &GoalId, mode: DeletionMode) -> Result<Vec<GoalId>> {
        self.store.require(id)?;

        let mut targets = vec![id.clone()];
        if mode == DeletionMode::Cascade {
            targets.extend(self.store.descendants(id)?);
        }

        for target in &targets {
            self.store.remove_goal(target)?;
        }
        self.retired.extend(targets.iter().cloned());

        debug!(goal = %id, %mode, removed = targets.len(), "Deleted goal");
        self.record(MutationKind::Deleted {
            id: id.clone(),
            removed: targets.clone(),
        });
        Ok(targets)
    }

    /// Flip a goal's completion and assign the new value to every transitive
    /// descendant. Ancestors are never touched.
    ///
    /// Returns every goal set to the new value, `id` first, then descendants
    /// breadth-first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GoalNotFound`] if the goal is absent.
    pub fn toggle_completion(&mut self, id: &GoalId) -> Result<Vec<Goal>> {
        let completed = !self.store.require(id)?.completed;

        let mut targets = vec![id.clone()];
        targets.extend(self.store.descendants(id)?);

        let now = Utc::now();
        let mut affected = Vec::with_capacity(targets.len());
        for target in &targets {
            let goal = self.store.goal_mut(target)?;
            goal.set_completed(completed, now);
            affected.push(goal.clone());
        }

        debug!(goal = %id, completed, affected = affected.len(), "Toggled completion");
        self.record(MutationKind::CompletionToggled {
            id: id.clone(),
            completed,
            affected: targets,
        });
        Ok(affected)
    }

    fn record(&mut self, kind: MutationKind) {
        self.journal.push(MutationRecord {
            at: Utc::now(),
            actor: self.actor.clone(),
            kind,
        });
    }
}
