//! Implementation of the `init` command and the workspace configuration file.
//!
//! `goalgraph init` creates a `.goalgraph/` directory holding `config.yaml`,
//! an empty `goals.jsonl` snapshot and a `.gitignore`.

use crate::domain::DeletionMode;
use crate::engine::{DEFAULT_ID_PREFIX, EngineConfig};
use crate::error::{ConfigError, Result};
use crate::persistence::RepositoryBackend;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the workspace directory
pub const GOALGRAPH_DIR_NAME: &str = ".goalgraph";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Name of the goals snapshot file
pub const GOALS_FILE_NAME: &str = "goals.jsonl";

/// Name of the gitignore file within .goalgraph
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Minimum prefix length
pub const MIN_PREFIX_LENGTH: usize = 2;

/// Maximum prefix length
pub const MAX_PREFIX_LENGTH: usize = 20;

/// Maximum directory depth to traverse when searching for the workspace root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Backend name for the JSONL snapshot store
pub const BACKEND_JSONL: &str = "jsonl";

/// Backend name for the ephemeral in-memory store
pub const BACKEND_MEMORY: &str = "memory";

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GoalgraphConfig {
    /// Goal ID prefix (e.g., "goal" for "goal-a3f8")
    #[serde(rename = "id-prefix")]
    pub id_prefix: String,

    /// Storage configuration
    pub storage: StorageConfig,

    /// What `rm` does with descendants
    #[serde(rename = "delete-mode", default)]
    pub delete_mode: DeletionMode,

    /// Append-only audit log, relative to the workspace root
    #[serde(
        rename = "audit-log",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub audit_log: Option<String>,
}

/// Storage configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// Storage backend type (`jsonl` or `memory`)
    pub backend: String,

    /// Path to the snapshot file, relative to the workspace root
    pub data_file: String,
}

impl GoalgraphConfig {
    /// Create a new configuration with the given prefix
    pub fn new(prefix: &str) -> Self {
        Self {
            id_prefix: prefix.to_string(),
            storage: StorageConfig {
                backend: BACKEND_JSONL.to_string(),
                data_file: format!("{}/{}", GOALGRAPH_DIR_NAME, GOALS_FILE_NAME),
            },
            delete_mode: DeletionMode::default(),
            audit_log: None,
        }
    }

    /// Load and validate configuration from a file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: Self =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        validate_prefix(&config.id_prefix)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Invalid(format!("YAML error: {}", e)))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Resolve the configured backend against the workspace root.
    pub fn backend(&self, root_dir: &Path) -> Result<RepositoryBackend> {
        match self.storage.backend.as_str() {
            BACKEND_JSONL => Ok(RepositoryBackend::Jsonl {
                data: root_dir.join(&self.storage.data_file),
                audit_log: self.audit_log.as_ref().map(|p| root_dir.join(p)),
            }),
            BACKEND_MEMORY => Ok(RepositoryBackend::InMemory),
            other => Err(ConfigError::Invalid(format!(
                "Unknown storage backend '{}' (expected '{}' or '{}')",
                other, BACKEND_JSONL, BACKEND_MEMORY
            ))
            .into()),
        }
    }

    /// Engine settings derived from this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            id_prefix: self.id_prefix.clone(),
            deletion_mode: self.delete_mode,
        }
    }
}

impl Default for GoalgraphConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ID_PREFIX)
    }
}

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created workspace directory
    pub goalgraph_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Path to the created goals file
    pub goals_file: PathBuf,
    /// Path to the created gitignore file
    pub gitignore_file: PathBuf,
    /// The prefix used for goal IDs
    pub prefix: String,
}

/// Validate goal ID prefix format.
///
/// Requirements:
/// - 2-20 characters
/// - Alphanumeric only (letters and digits)
///
/// Expects pre-trimmed input.
pub fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.len() < MIN_PREFIX_LENGTH {
        return Err(ConfigError::Invalid(format!(
            "Prefix must be at least {} characters",
            MIN_PREFIX_LENGTH
        ))
        .into());
    }

    if prefix.len() > MAX_PREFIX_LENGTH {
        return Err(ConfigError::Invalid(format!(
            "Prefix cannot exceed {} characters",
            MAX_PREFIX_LENGTH
        ))
        .into());
    }

    if !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::Invalid(
            "Prefix must contain only alphanumeric characters".to_string(),
        )
        .into());
    }

    Ok(())
}

/// Initialize a new goalgraph workspace in the given directory.
///
/// # Errors
///
/// Returns an error if:
/// - The `.goalgraph/` directory already exists
/// - The prefix is invalid
/// - File system operations fail
pub async fn init(base_dir: &Path, prefix: Option<&str>) -> Result<InitResult> {
    let prefix = prefix.unwrap_or(DEFAULT_ID_PREFIX).trim();
    validate_prefix(prefix)?;

    let goalgraph_dir = base_dir.join(GOALGRAPH_DIR_NAME);
    if goalgraph_dir.exists() {
        return Err(ConfigError::AlreadyInitialized(base_dir.display().to_string()).into());
    }

    fs::create_dir_all(&goalgraph_dir).await?;

    let config_file = goalgraph_dir.join(CONFIG_FILE_NAME);
    GoalgraphConfig::new(prefix).save(&config_file).await?;

    let goals_file = goalgraph_dir.join(GOALS_FILE_NAME);
    fs::write(&goals_file, "").await?;

    let gitignore_file = goalgraph_dir.join(GITIGNORE_FILE_NAME);
    let gitignore_content = "\
# Goalgraph scratch files
# goals.jsonl should be tracked
*.tmp
";
    fs::write(&gitignore_file, gitignore_content).await?;

    Ok(InitResult {
        goalgraph_dir,
        config_file,
        goals_file,
        gitignore_file,
        prefix: prefix.to_string(),
    })
}

/// Check if a directory has been initialized.
pub fn is_initialized(base_dir: &Path) -> bool {
    base_dir.join(GOALGRAPH_DIR_NAME).exists()
}

/// Find the workspace root by searching up the directory tree.
///
/// Returns the directory containing `.goalgraph/`, or `None` if none is found
/// within [`MAX_TRAVERSAL_DEPTH`] levels.
pub fn find_goalgraph_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if current.join(GOALGRAPH_DIR_NAME).exists() {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    // ========== Prefix Validation Tests ==========

    #[rstest]
    #[case::valid_short("ab")]
    #[case::valid_default("goal")]
    #[case::valid_alphanumeric("okr2026")]
    #[case::valid_max_length("a1b2c3d4e5f6g7h8i9j0")]
    fn test_validate_prefix_valid(#[case] prefix: &str) {
        assert!(validate_prefix(prefix).is_ok());
    }

    #[rstest]
    #[case::too_short_single("a", "at least 2")]
    #[case::too_short_empty("", "at least 2")]
    #[case::too_long("a".repeat(21), "cannot exceed 20")]
    #[case::hyphen("my-goals", "alphanumeric")]
    #[case::space("my goals", "alphanumeric")]
    fn test_validate_prefix_invalid(#[case] prefix: impl AsRef<str>, #[case] expected_error: &str) {
        let err_msg = validate_prefix(prefix.as_ref())
            .unwrap_err()
            .to_string()
            .to_lowercase();
        assert!(
            err_msg.contains(expected_error),
            "Expected error to contain '{}', got: '{}'",
            expected_error,
            err_msg
        );
    }

    // ========== Config Tests ==========

    #[test]
    fn test_config_new() {
        let config = GoalgraphConfig::new("okr");
        assert_eq!(config.id_prefix, "okr");
        assert_eq!(config.storage.backend, "jsonl");
        assert_eq!(config.storage.data_file, ".goalgraph/goals.jsonl");
        assert_eq!(config.delete_mode, DeletionMode::Detach);
        assert!(config.audit_log.is_none());
    }

    #[tokio::test]
    async fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut original = GoalgraphConfig::new("test123");
        original.delete_mode = DeletionMode::Cascade;
        original.audit_log = Some(".goalgraph/audit.jsonl".to_string());
        original.save(&config_path).await.unwrap();

        let loaded = GoalgraphConfig::load(&config_path).await.unwrap();
        assert_eq!(original, loaded);

        let content = tokio::fs::read_to_string(&config_path).await.unwrap();
        assert!(content.contains("id-prefix: test123"));
        assert!(content.contains("delete-mode: cascade"));
        assert!(content.contains("audit-log: .goalgraph/audit.jsonl"));
    }

    #[tokio::test]
    async fn test_config_without_optional_keys_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        tokio::fs::write(
            &config_path,
            "id-prefix: goal\nstorage:\n  backend: memory\n  data_file: x.jsonl\n",
        )
        .await
        .unwrap();

        let config = GoalgraphConfig::load(&config_path).await.unwrap();
        assert_eq!(config.delete_mode, DeletionMode::Detach);
        assert_eq!(
            config.backend(temp_dir.path()).unwrap(),
            RepositoryBackend::InMemory
        );
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let mut config = GoalgraphConfig::default();
        config.storage.backend = "postgres".to_string();
        let err = config.backend(Path::new("/tmp")).unwrap_err();
        assert!(err.to_string().contains("Unknown storage backend"));
    }

    #[test]
    fn test_jsonl_backend_paths_resolve_against_root() {
        let mut config = GoalgraphConfig::default();
        config.audit_log = Some("audit.jsonl".to_string());

        let backend = config.backend(Path::new("/work")).unwrap();
        assert_eq!(
            backend,
            RepositoryBackend::Jsonl {
                data: PathBuf::from("/work/.goalgraph/goals.jsonl"),
                audit_log: Some(PathBuf::from("/work/audit.jsonl")),
            }
        );
    }

    // ========== Init Command Tests ==========

    #[tokio::test]
    async fn test_init_creates_directory_structure() {
        let temp_dir = TempDir::new().unwrap();

        let result = init(temp_dir.path(), None).await.unwrap();

        assert!(result.goalgraph_dir.exists());
        assert!(result.config_file.exists());
        assert!(result.goals_file.exists());
        assert!(result.gitignore_file.exists());
        assert_eq!(result.prefix, DEFAULT_ID_PREFIX);
        assert!(is_initialized(temp_dir.path()));
    }

    #[tokio::test]
    async fn test_init_fails_if_already_initialized() {
        let temp_dir = TempDir::new().unwrap();
        init(temp_dir.path(), None).await.unwrap();

        let err_msg = init(temp_dir.path(), None)
            .await
            .unwrap_err()
            .to_string()
            .to_lowercase();
        assert!(err_msg.contains("already initialized"));
    }

    #[tokio::test]
    async fn test_init_trims_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let result = init(temp_dir.path(), Some("  okr  ")).await.unwrap();

        let config = GoalgraphConfig::load(&result.config_file).await.unwrap();
        assert_eq!(config.id_prefix, "okr");
    }

    // ========== Root Discovery Tests ==========

    #[test]
    fn test_find_root_in_parent_dir() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join(GOALGRAPH_DIR_NAME)).unwrap();
        let sub_dir = temp_dir.path().join("sub").join("nested");
        std::fs::create_dir_all(&sub_dir).unwrap();

        assert_eq!(
            find_goalgraph_root(&sub_dir),
            Some(temp_dir.path().to_path_buf())
        );
    }

    #[test]
    fn test_find_root_not_found() {
        let temp_dir = TempDir::new().unwrap();
        assert!(find_goalgraph_root(temp_dir.path()).is_none());
    }
}
