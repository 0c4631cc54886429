//! Canonical goal storage with a bidirectional relation index.
//!
//! [`GoalGraphStore`] holds goal records and the parent -> child relation
//! graph. It has no business logic beyond keeping that representation
//! consistent: each mutating primitive either applies fully or fails before
//! touching anything.
//!
//! # Architecture
//!
//! - `HashMap<GoalId, Goal>` for O(1) goal lookups
//! - `petgraph::StableDiGraph` for relations; edges point **parent -> child**,
//!   so outgoing edges are children and incoming edges are parents
//! - `HashMap<GoalId, NodeIndex>` mapping goals to graph nodes. A stable graph
//!   keeps indices valid when other nodes are removed.
//! - `HashMap<GoalId, Vec<GoalId>>` holding each parent's sibling order, and a
//!   `Vec<GoalId>` holding the root order
//!
//! The graph is the source of truth for *which* relations exist; the order
//! vectors only record *where* each child sits. Every primitive updates both
//! together, and [`GoalGraphStore::check_invariants`] verifies they agree.
//!
//! # Invariants
//!
//! 1. The relation graph is acyclic.
//! 2. Every relation references two stored goals.
//! 3. At most one relation per (parent, child) pair.
//! 4. Sibling orders list exactly the graph's children of each parent, and the
//!    root order lists exactly the goals with no parent.
//! 5. No sibling order lists an id twice.

mod graph;
mod invariants;

pub use invariants::InvariantViolation;

use crate::domain::{Goal, GoalId, Relation};
use crate::error::{Error, Result};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::Direction;
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// Goal records plus the relation graph and sibling orders.
#[derive(Debug, Clone, Default)]
pub struct GoalGraphStore {
    /// Goals indexed by ID
    goals: HashMap<GoalId, Goal>,

    /// Relation graph. Nodes hold `GoalId`s; edges run parent -> child.
    graph: StableDiGraph<GoalId, ()>,

    /// Goal -> graph node. Every goal in `goals` has exactly one entry.
    node_map: HashMap<GoalId, NodeIndex>,

    /// Sibling order per parent. Parents without children have no entry.
    child_order: HashMap<GoalId, Vec<GoalId>>,

    /// Order of goals with no parent
    root_order: Vec<GoalId>,
}

/// A full, ordered copy of the store's contents.
///
/// Goals are in creation order; relations are grouped by parent (parents in
/// creation order) and listed in sibling order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphExport {
    /// All goals, oldest first
    pub goals: Vec<Goal>,

    /// All relations, in sibling order per parent
    pub relations: Vec<Relation>,

    /// Root order
    pub root_order: Vec<GoalId>,
}

impl GoalGraphStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Queries ==========

    /// Number of stored goals.
    pub fn len(&self) -> usize {
        self.goals.len()
    }

    /// Whether the store holds no goals.
    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    /// Number of relations.
    pub fn relation_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether a goal with this id is stored.
    pub fn contains(&self, id: &GoalId) -> bool {
        self.goals.contains_key(id)
    }

    /// Look up a goal.
    pub fn get(&self, id: &GoalId) -> Option<&Goal> {
        self.goals.get(id)
    }

    /// Look up a goal, failing with [`Error::GoalNotFound`].
    pub fn require(&self, id: &GoalId) -> Result<&Goal> {
        self.goals
            .get(id)
            .ok_or_else(|| Error::GoalNotFound(id.clone()))
    }

    /// Mutable access to a goal's fields.
    ///
    /// Relations are not part of [`Goal`], so field edits cannot break any
    /// structural invariant.
    pub(crate) fn goal_mut(&mut self, id: &GoalId) -> Result<&mut Goal> {
        self.goals
            .get_mut(id)
            .ok_or_else(|| Error::GoalNotFound(id.clone()))
    }

    /// All goals in no particular order.
    pub fn goals(&self) -> impl Iterator<Item = &Goal> {
        self.goals.values()
    }

    /// All goals, oldest first.
    pub fn goals_in_creation_order(&self) -> Vec<&Goal> {
        let mut goals: Vec<&Goal> = self.goals.values().collect();
        goals.sort_by(|a, b| a.cmp_creation(b));
        goals
    }

    /// Goals with no parent, in root order.
    pub fn roots(&self) -> &[GoalId] {
        &self.root_order
    }

    /// Whether the goal has no parent.
    pub fn is_root(&self, id: &GoalId) -> bool {
        self.node_map.get(id).is_some_and(|&node| {
            self.graph
                .neighbors_directed(node, Direction::Incoming)
                .next()
                .is_none()
        })
    }

    /// Direct children in sibling order.
    pub fn children(&self, id: &GoalId) -> Result<&[GoalId]> {
        self.require(id)?;
        Ok(self.child_order.get(id).map(Vec::as_slice).unwrap_or_default())
    }

    /// Direct parents, oldest first.
    pub fn parents(&self, id: &GoalId) -> Result<Vec<GoalId>> {
        let node = self.node(id)?;
        let mut parents: Vec<&Goal> = self
            .graph
            .neighbors_directed(node, Direction::Incoming)
            .filter_map(|n| self.goals.get(&self.graph[n]))
            .collect();
        parents.sort_by(|a, b| a.cmp_creation(b));
        Ok(parents.into_iter().map(|g| g.id.clone()).collect())
    }

    /// Whether the relation `parent -> child` exists.
    pub fn has_edge(&self, parent: &GoalId, child: &GoalId) -> bool {
        match (self.node_map.get(parent), self.node_map.get(child)) {
            (Some(&p), Some(&c)) => self.graph.find_edge(p, c).is_some(),
            _ => false,
        }
    }

    /// Whether `to` is reachable from `from` along child relations.
    ///
    /// A goal reaches itself. Unknown ids reach nothing.
    pub fn reaches(&self, from: &GoalId, to: &GoalId) -> bool {
        graph::reaches(&self.graph, &self.node_map, from, to)
    }

    /// Every transitive descendant of `id`, breadth-first, each listed once.
    pub fn descendants(&self, id: &GoalId) -> Result<Vec<GoalId>> {
        self.require(id)?;
        Ok(graph::descendants(&self.child_order, id))
    }

    /// All relations, grouped by parent in creation order, then sibling order.
    pub fn relations(&self) -> Vec<Relation> {
        self.goals_in_creation_order()
            .into_iter()
            .flat_map(|parent| {
                self.child_order
                    .get(&parent.id)
                    .into_iter()
                    .flatten()
                    .map(|child| Relation {
                        parent: parent.id.clone(),
                        child: child.clone(),
                    })
            })
            .collect()
    }

    /// An ordered copy of everything in the store.
    pub fn export(&self) -> GraphExport {
        GraphExport {
            goals: self
                .goals_in_creation_order()
                .into_iter()
                .cloned()
                .collect(),
            relations: self.relations(),
            root_order: self.root_order.clone(),
        }
    }

    /// Check whether `parent -> child` could be added, without adding it.
    ///
    /// # Errors
    ///
    /// - [`Error::GoalNotFound`] if either goal is absent
    /// - [`Error::DuplicateEdge`] if the relation already exists
    /// - [`Error::Cycle`] if `child` is `parent` or an ancestor of it
    pub fn check_edge(&self, parent: &GoalId, child: &GoalId) -> Result<()> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;

        // Duplicate check first: an existing edge would otherwise read as a path
        if self.graph.find_edge(parent_node, child_node).is_some() {
            return Err(Error::DuplicateEdge {
                parent: parent.clone(),
                child: child.clone(),
            });
        }

        if graph::reaches(&self.graph, &self.node_map, child, parent) {
            return Err(Error::Cycle {
                parent: parent.clone(),
                child: child.clone(),
            });
        }

        Ok(())
    }

    // ========== Primitives ==========

    /// Insert a new goal with no relations. It becomes the last root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateGoal`] if the id is already stored.
    pub fn insert_goal(&mut self, goal: Goal) -> Result<()> {
        if self.goals.contains_key(&goal.id) {
            return Err(Error::DuplicateGoal(goal.id));
        }

        let id = goal.id.clone();
        let node = self.graph.add_node(id.clone());
        self.node_map.insert(id.clone(), node);
        self.root_order.push(id.clone());
        self.goals.insert(id.clone(), goal);

        trace!(goal = %id, "Inserted goal");
        Ok(())
    }

    /// Remove a goal and every relation touching it.
    ///
    /// Former children left without any parent are appended to the root order
    /// in their previous sibling order. Returns the removed goal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GoalNotFound`] if the goal is absent.
    pub fn remove_goal(&mut self, id: &GoalId) -> Result<Goal> {
        let node = self.node(id)?;

        let parents: Vec<GoalId> = self
            .graph
            .neighbors_directed(node, Direction::Incoming)
            .map(|n| self.graph[n].clone())
            .collect();
        let children = self.child_order.remove(id).unwrap_or_default();

        for parent in &parents {
            self.detach_from_order(parent, id);
        }
        self.root_order.retain(|root| root != id);

        self.graph.remove_node(node);
        self.node_map.remove(id);
        let goal = self
            .goals
            .remove(id)
            .ok_or_else(|| Error::GoalNotFound(id.clone()))?;

        for child in children {
            if self.is_root(&child) {
                self.root_order.push(child);
            }
        }

        debug!(
            goal = %id,
            parents = parents.len(),
            "Removed goal and its relations"
        );
        Ok(goal)
    }

    /// Add the relation `parent -> child`, appending `child` to the parent's
    /// sibling order. A child that was a root leaves the root order.
    ///
    /// # Errors
    ///
    /// See [`GoalGraphStore::check_edge`]. Nothing is modified on error.
    pub fn add_edge(&mut self, parent: &GoalId, child: &GoalId) -> Result<()> {
        self.check_edge(parent, child)?;

        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;
        let was_root = self.is_root(child);

        self.graph.add_edge(parent_node, child_node, ());
        self.child_order
            .entry(parent.clone())
            .or_default()
            .push(child.clone());
        if was_root {
            self.root_order.retain(|root| root != child);
        }

        trace!(parent = %parent, child = %child, "Added relation");
        Ok(())
    }

    /// Remove the relation `parent -> child`.
    ///
    /// Idempotent: returns `false` without changing anything if the relation
    /// (or either goal) does not exist. A child left without parents is
    /// appended to the root order.
    pub fn remove_edge(&mut self, parent: &GoalId, child: &GoalId) -> bool {
        let (Some(&parent_node), Some(&child_node)) =
            (self.node_map.get(parent), self.node_map.get(child))
        else {
            return false;
        };
        let Some(edge) = self.graph.find_edge(parent_node, child_node) else {
            return false;
        };

        self.graph.remove_edge(edge);
        self.detach_from_order(parent, child);
        if self.is_root(child) {
            self.root_order.push(child.clone());
        }

        trace!(parent = %parent, child = %child, "Removed relation");
        true
    }

    /// Move an existing child to `index` in its parent's sibling order.
    ///
    /// `index` is clamped to the number of other siblings. Returns the final
    /// position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RelationNotFound`] if `child` is not a child of `parent`.
    pub fn place_child(&mut self, parent: &GoalId, child: &GoalId, index: usize) -> Result<usize> {
        self.child_order
            .get_mut(parent)
            .and_then(|siblings| reposition(siblings, child, index))
            .ok_or_else(|| Error::RelationNotFound {
                parent: parent.clone(),
                child: child.clone(),
            })
    }

    /// Move a root to `index` in the root order.
    ///
    /// `index` is clamped to the number of other roots. Returns the final
    /// position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GoalNotFound`] if the goal is absent or is not a root.
    pub fn place_root(&mut self, id: &GoalId, index: usize) -> Result<usize> {
        reposition(&mut self.root_order, id, index).ok_or_else(|| Error::GoalNotFound(id.clone()))
    }

    /// Rebuild the root order from a preferred sequence.
    ///
    /// Keeps the preferred order for ids that are currently roots (first
    /// occurrence wins), drops everything else, then appends the remaining
    /// roots oldest first. Applying it twice gives the same order.
    pub fn reconcile_root_order(&mut self, preferred: &[GoalId]) {
        let mut seen = HashSet::new();
        let mut order: Vec<GoalId> = preferred
            .iter()
            .filter(|id| self.is_root(id) && seen.insert((*id).clone()))
            .cloned()
            .collect();

        let mut missing: Vec<&Goal> = self
            .goals
            .values()
            .filter(|g| !seen.contains(&g.id) && self.is_root(&g.id))
            .collect();
        missing.sort_by(|a, b| a.cmp_creation(b));
        order.extend(missing.into_iter().map(|g| g.id.clone()));

        if order != self.root_order {
            debug!(roots = order.len(), "Reconciled root order");
        }
        self.root_order = order;
    }

    // ========== Helpers ==========

    fn node(&self, id: &GoalId) -> Result<NodeIndex> {
        self.node_map
            .get(id)
            .copied()
            .ok_or_else(|| Error::GoalNotFound(id.clone()))
    }

    /// Drop `child` from `parent`'s sibling order, removing the entry once empty.
    fn detach_from_order(&mut self, parent: &GoalId, child: &GoalId) {
        if let Some(siblings) = self.child_order.get_mut(parent) {
            siblings.retain(|c| c != child);
            if siblings.is_empty() {
                self.child_order.remove(parent);
            }
        }
    }
}

/// Move `id` to a clamped `index` within `order`, returning the final
/// position. `None` if `id` is not listed.
fn reposition(order: &mut Vec<GoalId>, id: &GoalId, index: usize) -> Option<usize> {
    let current = order.iter().position(|x| x == id)?;
    let moved = order.remove(current);
    let index = index.min(order.len());
    order.insert(index, moved);
    Some(index)
}
