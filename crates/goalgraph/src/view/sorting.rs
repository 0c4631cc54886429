//! Sort key implementations for goal listings.

use crate::domain::{Goal, SortKey};
use std::cmp::Ordering;

/// Sort goals by `key`.
///
/// # Sort Keys
///
/// - `CreationOrder`: ascending creation sequence
/// - `Assignee`: case-insensitive assignee name; unassigned goals last
/// - `Deadline`: earliest deadline first; goals without a deadline last
///
/// A missing value acts as a sentinel greater than any real value. Ties fall
/// back to creation order, and the sort is stable.
pub(super) fn sort_by_key(goals: &mut [&Goal], key: SortKey) {
    match key {
        SortKey::CreationOrder => goals.sort_by(|a, b| a.cmp_creation(b)),
        SortKey::Assignee => goals.sort_by(|a, b| {
            missing_last(
                a.assignee.as_deref().map(str::to_lowercase),
                b.assignee.as_deref().map(str::to_lowercase),
            )
            .then_with(|| a.cmp_creation(b))
        }),
        SortKey::Deadline => goals.sort_by(|a, b| {
            missing_last(a.deadline, b.deadline).then_with(|| a.cmp_creation(b))
        }),
    }
}

/// Order present values ascending, with `None` after every `Some`.
fn missing_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GoalId;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn goal(sequence: u64, assignee: Option<&str>, deadline_day: Option<u32>) -> Goal {
        Goal {
            id: GoalId::new(format!("goal-{sequence}")),
            title: format!("Goal {sequence}"),
            image_url: None,
            icon_url: None,
            assignee: assignee.map(str::to_string),
            deadline: deadline_day.map(|d| Utc.with_ymd_and_hms(2026, 5, d, 0, 0, 0).unwrap()),
            completed: false,
            created_at: Utc::now(),
            completed_at: None,
            sequence,
        }
    }

    fn sequences(goals: &[&Goal]) -> Vec<u64> {
        goals.iter().map(|g| g.sequence).collect()
    }

    #[rstest]
    #[case::creation(SortKey::CreationOrder, vec![1, 2, 3, 4])]
    #[case::assignee(SortKey::Assignee, vec![3, 2, 4, 1])]
    #[case::deadline(SortKey::Deadline, vec![4, 2, 1, 3])]
    fn test_sort_keys(#[case] key: SortKey, #[case] expected: Vec<u64>) {
        let goals = [
            goal(1, None, Some(20)),
            goal(2, Some("bob"), Some(10)),
            goal(3, Some("Alice"), None),
            goal(4, Some("bob"), Some(1)),
        ];
        let mut refs: Vec<&Goal> = goals.iter().rev().collect();

        sort_by_key(&mut refs, key);
        assert_eq!(sequences(&refs), expected);
    }

    #[test]
    fn test_missing_values_tie_by_creation_order() {
        let goals = [goal(3, None, None), goal(1, None, None), goal(2, None, None)];
        let mut refs: Vec<&Goal> = goals.iter().collect();

        sort_by_key(&mut refs, SortKey::Deadline);
        assert_eq!(sequences(&refs), vec![1, 2, 3]);

        sort_by_key(&mut refs, SortKey::Assignee);
        assert_eq!(sequences(&refs), vec![1, 2, 3]);
    }
}
