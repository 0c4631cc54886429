//! CLI value enums and domain type conversions.

use clap::ValueEnum;

use crate::domain::{CompletionFilter, DeletionMode, SortKey};

/// Completion filter for the `list` command
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompletionFilterArg {
    /// Every goal
    #[default]
    All,
    /// Goals not yet completed
    Active,
    /// Completed goals
    Completed,
}

impl std::fmt::Display for CompletionFilterArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        CompletionFilter::from(*self).fmt(f)
    }
}

impl From<CompletionFilterArg> for CompletionFilter {
    fn from(arg: CompletionFilterArg) -> Self {
        match arg {
            CompletionFilterArg::All => CompletionFilter::All,
            CompletionFilterArg::Active => CompletionFilter::Active,
            CompletionFilterArg::Completed => CompletionFilter::Completed,
        }
    }
}

/// Sort key for the `list` command
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKeyArg {
    /// Oldest first
    #[default]
    #[value(name = "created", alias = "creation")]
    Created,
    /// By assignee, unassigned last
    Assignee,
    /// Earliest deadline first, undated last
    Deadline,
}

impl std::fmt::Display for SortKeyArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Assignee => write!(f, "assignee"),
            Self::Deadline => write!(f, "deadline"),
        }
    }
}

impl From<SortKeyArg> for SortKey {
    fn from(arg: SortKeyArg) -> Self {
        match arg {
            SortKeyArg::Created => SortKey::CreationOrder,
            SortKeyArg::Assignee => SortKey::Assignee,
            SortKeyArg::Deadline => SortKey::Deadline,
        }
    }
}

/// Deletion mode override for the `rm` command
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionModeArg {
    /// Remove only the goal; orphaned children become roots
    Detach,
    /// Remove the goal and every descendant
    Cascade,
}

impl std::fmt::Display for DeletionModeArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        DeletionMode::from(*self).fmt(f)
    }
}

impl From<DeletionModeArg> for DeletionMode {
    fn from(arg: DeletionModeArg) -> Self {
        match arg {
            DeletionModeArg::Detach => DeletionMode::Detach,
            DeletionModeArg::Cascade => DeletionMode::Cascade,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_conversion() {
        assert_eq!(SortKey::from(SortKeyArg::Created), SortKey::CreationOrder);
        assert_eq!(SortKey::from(SortKeyArg::Deadline), SortKey::Deadline);
    }

    #[test]
    fn test_display_matches_value_names() {
        assert_eq!(CompletionFilterArg::Active.to_string(), "active");
        assert_eq!(SortKeyArg::Created.to_string(), "created");
        assert_eq!(DeletionModeArg::Cascade.to_string(), "cascade");
    }
}
