//! Application context for CLI command execution.
//!
//! [`App`] binds one [`MutationEngine`] to the repository it was loaded from
//! and to the acting principal. Commands mutate through [`App::engine_mut`]
//! and then call [`App::persist`] to hand the drained journal to the
//! repository.
//!
//! # Example
//!
//! ```no_run
//! use goalgraph::app::App;
//! use goalgraph::domain::NewGoal;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let mut app = App::from_directory(Path::new(".")).await?;
//!     app.engine_mut().create(NewGoal::titled("Plan the week"))?;
//!     app.persist().await?;
//!     Ok(())
//! }
//! ```

use crate::commands::init::{
    CONFIG_FILE_NAME, GOALGRAPH_DIR_NAME, GoalgraphConfig, find_goalgraph_root,
};
use crate::domain::Actor;
use crate::engine::MutationEngine;
use crate::error::{ConfigError, Result};
use crate::persistence::{GoalRepository, LoadWarning, open_repository};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming the acting principal
pub const ACTOR_ENV: &str = "GOALGRAPH_ACTOR";

/// Application context for CLI operations.
pub struct App {
    engine: MutationEngine,
    repository: Box<dyn GoalRepository>,
    goalgraph_dir: PathBuf,
    config: GoalgraphConfig,
    load_warnings: Vec<LoadWarning>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("goalgraph_dir", &self.goalgraph_dir)
            .field("config", &self.config)
            .field("repository", &"<dyn GoalRepository>")
            .finish()
    }
}

impl App {
    /// Create an App instance from the given working directory.
    ///
    /// Searches up the directory tree for `.goalgraph/`, loads configuration,
    /// opens the configured repository and loads the graph. The acting
    /// principal comes from `GOALGRAPH_ACTOR`, falling back to `USER`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No workspace is found in the directory tree
    /// - Configuration cannot be loaded
    /// - The repository cannot be loaded
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let root_dir = find_goalgraph_root(working_dir).ok_or(ConfigError::NotInitialized)?;

        let goalgraph_dir = root_dir.join(GOALGRAPH_DIR_NAME);
        let config = GoalgraphConfig::load(&goalgraph_dir.join(CONFIG_FILE_NAME)).await?;

        let repository = open_repository(config.backend(&root_dir)?);
        let loaded = repository.load().await?;
        let load_warnings = loaded.warnings.clone();

        let mut engine = loaded.into_engine(config.engine_config());
        engine.set_actor(actor_from_env());

        debug!(
            root = %root_dir.display(),
            goals = engine.store().len(),
            "Opened goalgraph workspace"
        );

        Ok(Self {
            engine,
            repository,
            goalgraph_dir,
            config,
            load_warnings,
        })
    }

    /// The engine, for queries.
    pub fn engine(&self) -> &MutationEngine {
        &self.engine
    }

    /// The engine, for mutations. Call [`App::persist`] afterwards.
    pub fn engine_mut(&mut self) -> &mut MutationEngine {
        &mut self.engine
    }

    /// Workspace configuration.
    pub fn config(&self) -> &GoalgraphConfig {
        &self.config
    }

    /// Path to the `.goalgraph` directory.
    pub fn goalgraph_dir(&self) -> &Path {
        &self.goalgraph_dir
    }

    /// Problems found while loading the graph.
    pub fn load_warnings(&self) -> &[LoadWarning] {
        &self.load_warnings
    }

    /// Record every mutation since the last call.
    ///
    /// The journal is drained either way: a durability failure is logged and
    /// returned, but in-memory state is never rolled back.
    pub async fn persist(&mut self) -> Result<()> {
        let journal = self.engine.take_journal();
        if journal.is_empty() {
            return Ok(());
        }

        let result = self.repository.record(&self.engine, &journal).await;
        match &result {
            Ok(()) => debug!(mutations = journal.len(), "Persisted mutations"),
            Err(e) => warn!(mutations = journal.len(), error = %e, "Failed to persist mutations"),
        }
        result
    }
}

fn actor_from_env() -> Option<Actor> {
    std::env::var(ACTOR_ENV)
        .or_else(|_| std::env::var("USER"))
        .ok()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .map(Actor::new)
}
