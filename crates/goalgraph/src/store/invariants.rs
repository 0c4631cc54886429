//! Structural self-check for [`GoalGraphStore`].
//!
//! Used by tests and by `goalgraph check` to confirm the relation graph,
//! sibling orders and root order still agree after a sequence of mutations.

use super::GoalGraphStore;
use crate::domain::GoalId;
use petgraph::algo;
use petgraph::Direction;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// A single broken structural invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// The relation graph contains a cycle.
    #[error("relation graph contains a cycle")]
    Cycle,

    /// A goal record and its graph node are out of step.
    #[error("goal {0} is not indexed consistently")]
    UnindexedGoal(GoalId),

    /// The same relation is stored more than once.
    #[error("relation {parent} -> {child} is stored {count} times")]
    DuplicateRelation {
        /// Parent goal
        parent: GoalId,
        /// Child goal
        child: GoalId,
        /// Number of copies
        count: usize,
    },

    /// A parent's sibling order does not list exactly its children.
    #[error("child order of {0} does not match its relations")]
    ChildOrderMismatch(GoalId),

    /// The root order does not list exactly the goals without parents.
    #[error("root order does not match the set of parentless goals")]
    RootOrderMismatch,
}

impl GoalGraphStore {
    /// Check every structural invariant, returning each violation found.
    ///
    /// An empty result means the store is consistent.
    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();

        if algo::is_cyclic_directed(&self.graph) {
            violations.push(InvariantViolation::Cycle);
        }

        for id in self.goals.keys() {
            let indexed = self
                .node_map
                .get(id)
                .and_then(|&node| self.graph.node_weight(node))
                .is_some_and(|weight| weight == id);
            if !indexed {
                violations.push(InvariantViolation::UnindexedGoal(id.clone()));
            }
        }
        for id in self.node_map.keys() {
            if !self.goals.contains_key(id) {
                violations.push(InvariantViolation::UnindexedGoal(id.clone()));
            }
        }

        let mut edge_counts: HashMap<(&GoalId, &GoalId), usize> = HashMap::new();
        for edge in self.graph.edge_indices() {
            if let Some((source, target)) = self.graph.edge_endpoints(edge) {
                *edge_counts
                    .entry((&self.graph[source], &self.graph[target]))
                    .or_default() += 1;
            }
        }
        let mut duplicates: Vec<_> = edge_counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .collect();
        duplicates.sort();
        violations.extend(duplicates.into_iter().map(|((parent, child), count)| {
            InvariantViolation::DuplicateRelation {
                parent: parent.clone(),
                child: child.clone(),
                count,
            }
        }));

        let mut mismatched: Vec<&GoalId> = self
            .node_map
            .iter()
            .filter(|(id, node)| {
                let children: HashSet<&GoalId> = self
                    .graph
                    .neighbors_directed(**node, Direction::Outgoing)
                    .map(|n| &self.graph[n])
                    .collect();
                let ordered = self.child_order.get(*id).map_or(&[][..], Vec::as_slice);
                !same_members(ordered, &children)
            })
            .map(|(id, _)| id)
            .collect();
        // Order entries for goals that no longer exist
        mismatched.extend(
            self.child_order
                .keys()
                .filter(|id| !self.node_map.contains_key(*id)),
        );
        mismatched.sort();
        violations.extend(
            mismatched
                .into_iter()
                .map(|id| InvariantViolation::ChildOrderMismatch(id.clone())),
        );

        let roots: HashSet<&GoalId> = self.goals.keys().filter(|id| self.is_root(id)).collect();
        if !same_members(&self.root_order, &roots) {
            violations.push(InvariantViolation::RootOrderMismatch);
        }

        violations
    }
}

/// Whether `ordered` lists every member of `expected` exactly once and nothing else.
fn same_members(ordered: &[GoalId], expected: &HashSet<&GoalId>) -> bool {
    let listed: HashSet<&GoalId> = ordered.iter().collect();
    listed.len() == ordered.len() && listed == *expected
}
