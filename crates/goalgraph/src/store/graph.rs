//! Relation graph traversal.
//!
//! Edges point **parent -> child**: outgoing neighbours are children,
//! incoming neighbours are parents.

use crate::domain::GoalId;
use petgraph::algo;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use std::collections::{HashMap, HashSet, VecDeque};

/// Whether `to` is reachable from `from`.
///
/// Uses petgraph's `has_path_connecting`. Adding `parent -> child` creates a
/// cycle exactly when `parent` is reachable from `child`, so this is the cycle
/// check for every new relation. A node always reaches itself, which also
/// rejects self-parenting.
pub(super) fn reaches(
    graph: &StableDiGraph<GoalId, ()>,
    node_map: &HashMap<GoalId, NodeIndex>,
    from: &GoalId,
    to: &GoalId,
) -> bool {
    match (node_map.get(from), node_map.get(to)) {
        (Some(&from_node), Some(&to_node)) => {
            algo::has_path_connecting(graph, from_node, to_node, None)
        }
        _ => false,
    }
}

/// Breadth-first walk over descendants of `start`, in sibling order.
///
/// Uses an explicit worklist and a visited set, so arbitrarily deep
/// hierarchies never grow the call stack and a goal reachable along several
/// paths is listed once. `start` itself is not included.
pub(super) fn descendants(
    child_order: &HashMap<GoalId, Vec<GoalId>>,
    start: &GoalId,
) -> Vec<GoalId> {
    let mut result = Vec::new();
    let mut visited: HashSet<&GoalId> = HashSet::from([start]);
    let mut queue: VecDeque<&GoalId> = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        for child in child_order.get(current).into_iter().flatten() {
            if visited.insert(child) {
                result.push(child.clone());
                queue.push_back(child);
            }
        }
    }

    result
}
