//! Goalgraph - a goal tracker built on a multi-parent goal graph.
//!
//! Goals form a directed acyclic graph: a goal may have several parents and
//! several children. The crate provides the graph engine (storage, mutations
//! and derived views), a persistence adapter with JSONL snapshots, and a CLI.
//!
//! The engine is synchronous and single-writer. Callers own a
//! [`engine::MutationEngine`] and serialize access to it; read-only views are
//! obtained from [`engine::MutationEngine::view`].
//!
//! ```
//! use goalgraph::domain::{MoveRequest, NewGoal};
//! use goalgraph::engine::{EngineConfig, MutationEngine};
//!
//! let mut engine = MutationEngine::new(EngineConfig::default());
//! let plan = engine.create(NewGoal::titled("Project plan")).unwrap();
//! let draft = engine.create(NewGoal::titled("Write draft")).unwrap();
//!
//! engine
//!     .move_goal(MoveRequest::under(draft.id.clone(), plan.id.clone(), 0))
//!     .unwrap();
//! engine.toggle_completion(&plan.id).unwrap();
//!
//! let view = engine.view();
//! assert_eq!(view.roots().len(), 1);
//! assert!(view.get(&draft.id).unwrap().completed);
//! assert_eq!(view.progress(), 100);
//! ```

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod domain;
pub mod engine;
pub mod error;
pub mod id_generation;
pub mod persistence;
pub mod store;
pub mod view;

// Host session and command-line surface
pub mod app;
pub mod cli;
pub mod commands;
pub mod output;
