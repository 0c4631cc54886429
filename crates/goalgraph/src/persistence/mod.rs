//! Persistence adapters.
//!
//! The engine itself is purely in-memory. A [`GoalRepository`] supplies the
//! full goal and relation set at startup and is asked to durably record each
//! batch of successful mutations afterwards. Durability failures are reported
//! to the host and never roll back in-memory state.
//!
//! # Backends
//!
//! - **In-memory**: nothing is read or written
//! - **JSONL**: full snapshot rewritten atomically after each batch, plus an
//!   optional append-only audit log of [`MutationRecord`]s
//!
//! # Example
//!
//! ```no_run
//! use goalgraph::domain::NewGoal;
//! use goalgraph::engine::EngineConfig;
//! use goalgraph::persistence::{RepositoryBackend, open_repository};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let repository = open_repository(RepositoryBackend::Jsonl {
//!         data: ".goalgraph/goals.jsonl".into(),
//!         audit_log: None,
//!     });
//!
//!     let mut engine = repository.load().await?.into_engine(EngineConfig::default());
//!     engine.create(NewGoal::titled("Write the report"))?;
//!
//!     let journal = engine.take_journal();
//!     repository.record(&engine, &journal).await?;
//!     Ok(())
//! }
//! ```

pub mod jsonl;
pub mod snapshot;

pub use jsonl::LoadWarning;

use crate::domain::GoalId;
use crate::engine::{EngineConfig, MutationEngine, MutationRecord};
use crate::error::Result;
use crate::store::GoalGraphStore;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Result of loading a persisted graph.
#[derive(Debug, Clone)]
pub struct LoadedGraph {
    /// Reconstructed store
    pub store: GoalGraphStore,

    /// Sequence number for the next created goal
    pub next_sequence: u64,

    /// Ids of goals deleted in earlier sessions
    pub retired: Vec<GoalId>,

    /// Records skipped while loading
    pub warnings: Vec<LoadWarning>,
}

impl Default for LoadedGraph {
    fn default() -> Self {
        Self {
            store: GoalGraphStore::new(),
            next_sequence: 1,
            retired: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl LoadedGraph {
    /// Build an engine over the loaded store, keeping retired ids reserved.
    pub fn into_engine(self, config: EngineConfig) -> MutationEngine {
        MutationEngine::from_store(self.store, self.next_sequence, config)
            .with_retired_ids(self.retired)
    }
}

/// Durable storage for the goal graph.
#[async_trait]
pub trait GoalRepository: Send + Sync {
    /// Load the full goal and relation set.
    async fn load(&self) -> Result<LoadedGraph>;

    /// Durably record a batch of successful mutations.
    ///
    /// `engine` reflects the state after every mutation in `records`.
    async fn record(&self, engine: &MutationEngine, records: &[MutationRecord]) -> Result<()>;

    /// The backend this repository was opened with.
    fn backend(&self) -> &RepositoryBackend;
}

/// Repository backend selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryBackend {
    /// Ephemeral, nothing persisted
    InMemory,

    /// JSONL snapshot file with an optional audit log
    Jsonl {
        /// Snapshot file
        data: PathBuf,
        /// Append-only audit log
        audit_log: Option<PathBuf>,
    },
}

impl RepositoryBackend {
    /// The snapshot file, for file-backed backends.
    pub fn data_path(&self) -> Option<&Path> {
        match self {
            Self::Jsonl { data, .. } => Some(data),
            Self::InMemory => None,
        }
    }
}

/// Open a repository for `backend`.
pub fn open_repository(backend: RepositoryBackend) -> Box<dyn GoalRepository> {
    Box::new(Repository { backend })
}

struct Repository {
    backend: RepositoryBackend,
}

#[async_trait]
impl GoalRepository for Repository {
    async fn load(&self) -> Result<LoadedGraph> {
        match &self.backend {
            RepositoryBackend::InMemory => Ok(LoadedGraph::default()),
            RepositoryBackend::Jsonl { data, .. } => jsonl::load_snapshot(data).await,
        }
    }

    async fn record(&self, engine: &MutationEngine, records: &[MutationRecord]) -> Result<()> {
        let RepositoryBackend::Jsonl { data, audit_log } = &self.backend else {
            return Ok(());
        };
        if records.is_empty() {
            return Ok(());
        }

        jsonl::save_snapshot(data, engine).await?;
        if let Some(audit_log) = audit_log {
            jsonl::append_audit(audit_log, records).await?;
        }
        Ok(())
    }

    fn backend(&self) -> &RepositoryBackend {
        &self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewGoal;

    #[tokio::test]
    async fn test_in_memory_repository_round_trip_is_empty() {
        let repository = open_repository(RepositoryBackend::InMemory);
        let mut engine = repository.load().await.unwrap().into_engine(EngineConfig::default());

        engine.create(NewGoal::titled("Ephemeral")).unwrap();
        let journal = engine.take_journal();
        repository.record(&engine, &journal).await.unwrap();

        assert!(repository.load().await.unwrap().store.is_empty());
        assert!(repository.backend().data_path().is_none());
    }

    #[test]
    fn test_empty_batch_writes_nothing() {
        let temp = tempfile::TempDir::new().unwrap();
        let data = temp.path().join("goals.jsonl");
        let repository = open_repository(RepositoryBackend::Jsonl {
            data: data.clone(),
            audit_log: None,
        });
        let engine = MutationEngine::new(EngineConfig::default());

        tokio_test::block_on(repository.record(&engine, &[])).unwrap();
        assert!(!data.exists());
        assert_eq!(repository.backend().data_path(), Some(data.as_path()));
    }
}
