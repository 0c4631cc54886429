//! Read-only derived views.
//!
//! [`ViewEngine`] borrows a [`GoalGraphStore`] and never mutates it. Listings
//! return goals in creation order unless a sort key says otherwise.

mod sorting;

use crate::domain::{CompletionFilter, Goal, GoalId, SortKey};
use crate::error::Result;
use crate::store::GoalGraphStore;
use serde::Serialize;

/// Derived views over a store snapshot.
#[derive(Debug, Clone, Copy)]
pub struct ViewEngine<'a> {
    store: &'a GoalGraphStore,
}

/// One row of a depth-first outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlineEntry<'a> {
    /// The goal on this row
    pub goal: &'a Goal,

    /// Distance from the outline's top level (0 for top-level rows)
    pub depth: usize,

    /// Whether this is the last sibling under its parent
    pub is_last: bool,
}

/// Summary counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GoalStats {
    /// Number of goals
    pub total: usize,

    /// Completed goals
    pub completed: usize,

    /// Goals not yet completed
    pub active: usize,

    /// Goals without a parent
    pub roots: usize,

    /// Number of parent -> child relations
    pub relations: usize,

    /// Root-level completion percentage
    pub progress: u8,
}

impl<'a> ViewEngine<'a> {
    /// Create a view over `store`.
    pub fn new(store: &'a GoalGraphStore) -> Self {
        Self { store }
    }

    /// Look up a goal.
    pub fn get(&self, id: &GoalId) -> Option<&'a Goal> {
        self.store.get(id)
    }

    /// Goals with no parent, in root order.
    pub fn roots(&self) -> Vec<&'a Goal> {
        self.resolve(self.store.roots())
    }

    /// Direct children in sibling order.
    pub fn children(&self, id: &GoalId) -> Result<Vec<&'a Goal>> {
        Ok(self.resolve(self.store.children(id)?))
    }

    /// Direct parents, oldest first.
    pub fn parents(&self, id: &GoalId) -> Result<Vec<&'a Goal>> {
        Ok(self.resolve(&self.store.parents(id)?))
    }

    /// Case-insensitive substring search on titles, in creation order.
    ///
    /// A query that is empty after trimming matches nothing.
    pub fn search(&self, query: &str) -> Vec<&'a Goal> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.store
            .goals_in_creation_order()
            .into_iter()
            .filter(|g| g.title.to_lowercase().contains(&needle))
            .collect()
    }

    /// Goals passing `filter`, in creation order.
    pub fn filter(&self, filter: CompletionFilter) -> Vec<&'a Goal> {
        self.store
            .goals_in_creation_order()
            .into_iter()
            .filter(|g| filter.matches(g))
            .collect()
    }

    /// Sort `goals` by `key`. Stable; ties fall back to creation order.
    pub fn sort(&self, mut goals: Vec<&'a Goal>, key: SortKey) -> Vec<&'a Goal> {
        sorting::sort_by_key(&mut goals, key);
        goals
    }

    /// Filter, then sort.
    pub fn list(&self, filter: CompletionFilter, key: SortKey) -> Vec<&'a Goal> {
        self.sort(self.filter(filter), key)
    }

    /// Completion percentage over root goals only, rounded half up.
    ///
    /// Returns 0 when there are no roots.
    pub fn progress(&self) -> u8 {
        let roots = self.store.roots();
        let total = roots.len();
        if total == 0 {
            return 0;
        }
        let completed = roots
            .iter()
            .filter_map(|id| self.store.get(id))
            .filter(|g| g.completed)
            .count();

        let percent = (200 * completed + total) / (2 * total);
        u8::try_from(percent).unwrap_or(100)
    }

    /// Depth-first pre-order walk for tree rendering.
    ///
    /// Starts from every root in root order, or from `start` alone. A goal with
    /// several parents appears once under each of them.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::GoalNotFound`] if `start` is absent.
    pub fn outline(&self, start: Option<&GoalId>) -> Result<Vec<OutlineEntry<'a>>> {
        let top: Vec<&GoalId> = match start {
            Some(id) => {
                self.store.require(id)?;
                vec![id]
            }
            None => self.store.roots().iter().collect(),
        };

        // Explicit stack, pushed in reverse so pops come out in sibling order
        let mut stack: Vec<(&GoalId, usize, bool)> = Vec::new();
        push_siblings(&mut stack, &top, 0);

        let mut entries = Vec::new();
        while let Some((id, depth, is_last)) = stack.pop() {
            let Some(goal) = self.store.get(id) else {
                continue;
            };
            entries.push(OutlineEntry {
                goal,
                depth,
                is_last,
            });

            let children: Vec<&GoalId> = self.store.children(id)?.iter().collect();
            push_siblings(&mut stack, &children, depth + 1);
        }

        Ok(entries)
    }

    /// Summary counts and progress.
    pub fn stats(&self) -> GoalStats {
        let total = self.store.len();
        let completed = self.store.goals().filter(|g| g.completed).count();
        GoalStats {
            total,
            completed,
            active: total - completed,
            roots: self.store.roots().len(),
            relations: self.store.relation_count(),
            progress: self.progress(),
        }
    }

    fn resolve(&self, ids: &[GoalId]) -> Vec<&'a Goal> {
        ids.iter().filter_map(|id| self.store.get(id)).collect()
    }
}

fn push_siblings<'s>(
    stack: &mut Vec<(&'s GoalId, usize, bool)>,
    siblings: &[&'s GoalId],
    depth: usize,
) {
    let last = siblings.len().saturating_sub(1);
    for (i, id) in siblings.iter().enumerate().rev() {
        stack.push((id, depth, i == last));
    }
}
