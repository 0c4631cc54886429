//! Error types for goalgraph operations.
//!
//! Every fallible engine, store and persistence operation returns
//! [`Result<T>`]. Structural errors ([`Error::Cycle`], [`Error::DuplicateEdge`],
//! [`Error::GoalNotFound`]) and [`Error::Validation`] are raised before any
//! state is touched, so a failed call leaves the graph exactly as it was.

use crate::domain::validation::ValidationErrors;
use crate::domain::GoalId;
use crate::id_generation::IdGenerationError;
use std::io;
use thiserror::Error;

/// The error type for goalgraph operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Input failed field-level validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// A referenced goal does not exist.
    #[error("Goal not found: {0}")]
    GoalNotFound(GoalId),

    /// A goal with this id is already stored.
    #[error("Goal already exists: {0}")]
    DuplicateGoal(GoalId),

    /// Adding the relation would create a cycle (including a self-parent).
    #[error("Relation {parent} -> {child} would create a cycle")]
    Cycle {
        /// Prospective parent
        parent: GoalId,
        /// Prospective child
        child: GoalId,
    },

    /// The relation already exists.
    #[error("Relation already exists: {parent} -> {child}")]
    DuplicateEdge {
        /// Parent of the existing relation
        parent: GoalId,
        /// Child of the existing relation
        child: GoalId,
    },

    /// The relation does not exist.
    #[error("Relation not found: {parent} -> {child}")]
    RelationNotFound {
        /// Parent of the missing relation
        parent: GoalId,
        /// Child of the missing relation
        child: GoalId,
    },

    /// Goal id allocation failed.
    #[error("ID generation failed: {0}")]
    IdGeneration(#[from] IdGenerationError),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Persistence adapter error.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised while locating or reading workspace configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No `.goalgraph/` directory in the current directory or any parent.
    #[error("Not a goalgraph workspace (run 'goalgraph init' first)")]
    NotInitialized,

    /// `.goalgraph/` already exists.
    #[error("Goalgraph is already initialized in {0}")]
    AlreadyInitialized(String),

    /// The configuration file could not be parsed or holds an invalid value.
    #[error("Configuration error: {0}")]
    Invalid(String),
}

/// Errors raised by persistence backends.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// A record could not be serialized.
    #[error("Serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The snapshot was written by a newer format version.
    #[error("Unsupported snapshot version {found} (supported up to {supported})")]
    UnsupportedVersion {
        /// Version found in the file
        found: u32,
        /// Highest version this build reads
        supported: u32,
    },
}

/// A specialized Result type for goalgraph operations.
pub type Result<T> = std::result::Result<T, Error>;
