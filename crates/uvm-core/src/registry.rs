// UVM Core - Config repositories
//
// Repositories supply immutable lender configs by ID or by directory scope.
// Each repository provides:
// - Scope loading (every config below a path)
// - ID lookup
// A single unreadable document never fails a scan; it is skipped with a warning.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::config::LenderConfig;
use crate::error::{UvmError, UvmResult};

/// Read-only source of lender configs
#[async_trait]
pub trait ConfigRepository: Send + Sync {
    /// Load every config in a scope, in traversal order
    async fn load_configs(&self, scope: &str) -> UvmResult<Vec<LenderConfig>>;

    /// Load a single config by ID.
    ///
    /// When several documents carry the same ID the first in traversal order
    /// is returned and a warning is logged.
    async fn load_config(&self, id: i64) -> UvmResult<LenderConfig>;
}

// ============================================================================
// Directory Repository
// ============================================================================

/// Repository backed by JSON files below a root directory
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    root: PathBuf,
}

impl DirectoryRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn scope_path(&self, scope: &str) -> PathBuf {
        let scope = scope.trim();
        if scope.is_empty() {
            self.root.clone()
        } else if Path::new(scope).is_absolute() {
            PathBuf::from(scope)
        } else {
            self.root.join(scope)
        }
    }

    async fn load_files(&self, files: &[PathBuf]) -> Vec<LenderConfig> {
        let mut configs = Vec::with_capacity(files.len());
        for file in files {
            match load_json_file(file).await {
                Ok(config) => {
                    tracing::debug!("Loaded config {} from {:?}", config.id, file);
                    configs.push(config);
                }
                Err(e) => {
                    tracing::warn!("Skipping {:?}: {}", file, e);
                }
            }
        }
        configs
    }
}

#[async_trait]
impl ConfigRepository for DirectoryRepository {
    async fn load_configs(&self, scope: &str) -> UvmResult<Vec<LenderConfig>> {
        let dir = self.scope_path(scope);
        let files = scan_blocking(dir.clone()).await?;
        let configs = self.load_files(&files).await;

        tracing::info!("Found {} configs in {}", configs.len(), dir.display());
        Ok(configs)
    }

    async fn load_config(&self, id: i64) -> UvmResult<LenderConfig> {
        let files = scan_blocking(self.root.clone()).await?;
        let needle = id.to_string();

        // File names usually carry the ID; only fall back to a full scan when
        // none of them does.
        let (named, rest): (Vec<PathBuf>, Vec<PathBuf>) = files.into_iter().partition(|f| {
            f.file_name()
                .map_or(false, |n| n.to_string_lossy().contains(&needle))
        });

        let mut found: Vec<LenderConfig> = self
            .load_files(&named)
            .await
            .into_iter()
            .filter(|c| c.id == id)
            .collect();

        if found.is_empty() {
            found = self
                .load_files(&rest)
                .await
                .into_iter()
                .filter(|c| c.id == id)
                .collect();
        }

        first_of(id, found)
    }
}

/// Directory walk on the blocking pool so a caller's deadline can fire mid-scan
async fn scan_blocking(dir: PathBuf) -> UvmResult<Vec<PathBuf>> {
    let root = dir.clone();
    tokio::task::spawn_blocking(move || scan_json_files(&dir))
        .await
        .map_err(|e| UvmError::scope(root, e))?
}

/// List `.json` files below `dir` in sorted traversal order, skipping any
/// directory whose name contains "archive".
pub fn scan_json_files(dir: &Path) -> UvmResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(UvmError::scope(dir, "directory does not exist"));
    }

    let pattern = format!(
        "{}/**/*.json",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    let entries = glob::glob(&pattern).map_err(|e| UvmError::scope(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => {
                if path.is_file() && !in_archive(dir, &path) {
                    files.push(path);
                }
            }
            Err(e) => {
                tracing::warn!("Unreadable entry under {}: {}", dir.display(), e);
            }
        }
    }

    Ok(files)
}

fn in_archive(root: &Path, path: &Path) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .parent()
        .map(|parent| {
            parent.components().any(|c| {
                c.as_os_str()
                    .to_string_lossy()
                    .to_lowercase()
                    .contains("archive")
            })
        })
        .unwrap_or(false)
}

/// Read and parse a single config document
pub async fn load_json_file(path: &Path) -> UvmResult<LenderConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| UvmError::load(path, e))?;
    serde_json::from_str(&content).map_err(|e| UvmError::load(path, e))
}

fn first_of(id: i64, mut found: Vec<LenderConfig>) -> UvmResult<LenderConfig> {
    if found.len() > 1 {
        tracing::warn!(
            "Multiple documents found for lender config {}, using the first match",
            id
        );
    }
    if found.is_empty() {
        return Err(UvmError::NotFound { id });
    }
    Ok(found.swap_remove(0))
}

// ============================================================================
// In-Memory Repository
// ============================================================================

/// Repository over an already loaded snapshot. Scopes are ignored: every
/// config belongs to every scope.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    configs: Vec<LenderConfig>,
}

impl InMemoryRepository {
    pub fn new(configs: Vec<LenderConfig>) -> Self {
        Self { configs }
    }

    pub fn register(&mut self, config: LenderConfig) {
        self.configs.push(config);
    }

    pub fn count(&self) -> usize {
        self.configs.len()
    }
}

#[async_trait]
impl ConfigRepository for InMemoryRepository {
    async fn load_configs(&self, _scope: &str) -> UvmResult<Vec<LenderConfig>> {
        Ok(self.configs.clone())
    }

    async fn load_config(&self, id: i64) -> UvmResult<LenderConfig> {
        let found: Vec<LenderConfig> = self
            .configs
            .iter()
            .filter(|c| c.id == id)
            .take(2)
            .cloned()
            .collect();
        first_of(id, found)
    }
}
