//! Reparenting: move, link and unlink.
//!
//! A move is detach-all-parents plus attach-one, applied as a single
//! transaction. All checks that can fail run before the first edge is
//! removed; if attaching still fails, the goal's previous placement is
//! restored before the error is returned.

use super::{MutationEngine, MutationKind};
use crate::domain::{GoalId, MoveRequest, OrderedView};
use crate::error::{Error, Result};
use crate::store::GoalGraphStore;
use tracing::{debug, warn};

/// Where a goal sits before a move: each parent with the goal's position in
/// that parent's child order, and its root position if it has no parents.
struct Placement {
    parents: Vec<(GoalId, usize)>,
    root_index: Option<usize>,
}

impl Placement {
    fn capture(store: &GoalGraphStore, id: &GoalId) -> Result<Self> {
        let mut parents = Vec::new();
        for parent in store.parents(id)? {
            let index = store
                .children(&parent)?
                .iter()
                .position(|c| c == id)
                .ok_or_else(|| Error::RelationNotFound {
                    parent: parent.clone(),
                    child: id.clone(),
                })?;
            parents.push((parent, index));
        }
        let root_index = store.roots().iter().position(|r| r == id);
        Ok(Self {
            parents,
            root_index,
        })
    }

    /// Put `id` back where it was. Best effort; failures are logged.
    fn restore(self, store: &mut GoalGraphStore, id: &GoalId) {
        for parent in store.parents(id).unwrap_or_default() {
            store.remove_edge(&parent, id);
        }
        for (parent, index) in &self.parents {
            let restored = store
                .add_edge(parent, id)
                .and_then(|()| store.place_child(parent, id, *index));
            if let Err(e) = restored {
                warn!(goal = %id, parent = %parent, error = %e, "Failed to restore relation");
            }
        }
        if let Some(index) = self.root_index {
            if let Err(e) = store.place_root(id, index) {
                warn!(goal = %id, error = %e, "Failed to restore root position");
            }
        }
    }
}

impl MutationEngine {
    /// Reparent and/or reorder a goal.
    ///
    /// Every existing parent relation of the goal is removed, then the goal is
    /// attached under `new_parent` (or made a root) at `index`, clamped to the
    /// number of new siblings. The goal ends up with at most one parent; use
    /// [`MutationEngine::link`] to add a parent without detaching others.
    ///
    /// Returns the goal's new sibling sequence. The old parents' child orders
    /// (or the root order) close the gap left behind.
    ///
    /// # Errors
    ///
    /// - [`Error::GoalNotFound`] if the goal or the new parent is absent
    /// - [`Error::Cycle`] if the new parent is the goal itself or one of its
    ///   descendants
    ///
    /// The graph is unchanged on error.
    pub fn move_goal(&mut self, request: MoveRequest) -> Result<OrderedView> {
        let MoveRequest {
            goal,
            new_parent,
            index,
        } = request;

        self.store.require(&goal)?;
        if let Some(parent) = &new_parent {
            self.store.require(parent)?;
            // Removing edges into `goal` cannot change what `goal` reaches,
            // so this holds after the detach step too.
            if self.store.reaches(&goal, parent) {
                return Err(Error::Cycle {
                    parent: parent.clone(),
                    child: goal,
                });
            }
        }

        let placement = Placement::capture(&self.store, &goal)?;

        // Detach
        for (parent, _) in &placement.parents {
            self.store.remove_edge(parent, &goal);
        }

        // Attach
        let attached = match &new_parent {
            Some(parent) => self
                .store
                .add_edge(parent, &goal)
                .and_then(|()| self.store.place_child(parent, &goal, index)),
            None => self.store.place_root(&goal, index),
        };
        let position = match attached {
            Ok(position) => position,
            Err(e) => {
                warn!(goal = %goal, error = %e, "Move failed after detach, restoring placement");
                placement.restore(&mut self.store, &goal);
                return Err(e);
            }
        };

        debug!(
            goal = %goal,
            parent = ?new_parent.as_ref().map(GoalId::as_str),
            index = position,
            detached = placement.parents.len(),
            "Moved goal"
        );
        self.record(MutationKind::Moved {
            id: goal.clone(),
            parent: new_parent.clone(),
            index: position,
        });
        self.ordered_view(new_parent, position)
    }

    /// Add `parent -> child` without touching the child's other parents.
    ///
    /// The child is appended to the parent's child order, or placed at
    /// `index` (clamped) when given. Returns the parent's child order.
    ///
    /// # Errors
    ///
    /// - [`Error::GoalNotFound`] if either goal is absent
    /// - [`Error::DuplicateEdge`] if the relation already exists
    /// - [`Error::Cycle`] if `child` is `parent` or one of its ancestors
    pub fn link(
        &mut self,
        parent: &GoalId,
        child: &GoalId,
        index: Option<usize>,
    ) -> Result<OrderedView> {
        self.store.add_edge(parent, child)?;

        let position = match index {
            Some(index) => self.store.place_child(parent, child, index)?,
            None => self.store.children(parent)?.len().saturating_sub(1),
        };

        debug!(parent = %parent, child = %child, index = position, "Linked goals");
        self.record(MutationKind::Linked {
            parent: parent.clone(),
            child: child.clone(),
            index: position,
        });
        self.ordered_view(Some(parent.clone()), position)
    }

    /// Remove `parent -> child`.
    ///
    /// Idempotent: returns `false` if the relation did not exist. A child left
    /// without parents becomes the last root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GoalNotFound`] if either goal is absent.
    pub fn unlink(&mut self, parent: &GoalId, child: &GoalId) -> Result<bool> {
        self.store.require(parent)?;
        self.store.require(child)?;

        let removed = self.store.remove_edge(parent, child);
        if removed {
            debug!(parent = %parent, child = %child, "Unlinked goals");
            self.record(MutationKind::Unlinked {
                parent: parent.clone(),
                child: child.clone(),
            });
        }
        Ok(removed)
    }

    fn ordered_view(&self, parent: Option<GoalId>, index: usize) -> Result<OrderedView> {
        let siblings = match &parent {
            Some(parent) => self.store.children(parent)?.to_vec(),
            None => self.store.roots().to_vec(),
        };
        Ok(OrderedView {
            parent,
            siblings,
            index,
        })
    }
}
