//! Target persistence.
//!
//! Handles saving, loading, and deleting the single active target. The
//! store is the one shared mutable resource in the client: a log stream
//! invalidating an expired session can race an explicit logout, so all
//! access goes through a single writer lock and both paths converge to
//! "no target".

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use contrail_types::Target;

use crate::error::{Result, StoreError};

/// Default target file name within the contrail data directory.
pub const TARGET_FILE: &str = "target.json";

// ============================================================================
// TargetStore Trait
// ============================================================================

/// Trait for persisting the single active target.
///
/// At most one target is stored; `save` overwrites unconditionally, `load`
/// returns `None` (not an error) when nothing is stored, and `delete` is
/// idempotent.
#[async_trait]
pub trait TargetStore: Send + Sync + std::fmt::Debug {
    /// Persist a target, replacing any prior one.
    async fn save(&self, target: &Target) -> Result<()>;

    /// Load the stored target, if any.
    async fn load(&self) -> Result<Option<Target>>;

    /// Delete the stored target. A no-op when nothing is stored.
    async fn delete(&self) -> Result<()>;
}

/// Shared target store for use across async contexts.
pub type SharedTargetStore = Arc<dyn TargetStore>;

/// Create a shared file-based target store.
pub fn create_target_store(data_dir: &Path) -> SharedTargetStore {
    Arc::new(FileTargetStore::new(data_dir))
}

/// Create a shared in-memory target store (ephemeral sessions, tests).
pub fn create_memory_target_store() -> SharedTargetStore {
    Arc::new(InMemoryTargetStore::new())
}

// ============================================================================
// FileTargetStore
// ============================================================================

/// File-based target store for durable ("stay logged in") sessions.
#[derive(Debug)]
pub struct FileTargetStore {
    target_path: PathBuf,
    cached: RwLock<Option<Target>>,
}

impl FileTargetStore {
    /// Create a store rooted at a data directory.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            target_path: data_dir.join(TARGET_FILE),
            cached: RwLock::new(None),
        }
    }

    /// Create with a custom target file path.
    pub fn with_path(target_path: PathBuf) -> Self {
        Self {
            target_path,
            cached: RwLock::new(None),
        }
    }

    /// Get the target file path.
    pub fn target_path(&self) -> &Path {
        &self.target_path
    }
}

#[async_trait]
impl TargetStore for FileTargetStore {
    async fn save(&self, target: &Target) -> Result<()> {
        // Hold the write lock across the file write so a concurrent delete
        // cannot interleave.
        let mut cache = self.cached.write().await;

        if let Some(parent) = self.target_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Storage(format!("Failed to create target directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(target)
            .map_err(|e| StoreError::Serialization(format!("Failed to serialize target: {}", e)))?;

        std::fs::write(&self.target_path, json)
            .map_err(|e| StoreError::Storage(format!("Failed to write target file: {}", e)))?;

        *cache = Some(target.clone());

        tracing::info!("Target saved to {}", self.target_path.display());
        Ok(())
    }

    async fn load(&self) -> Result<Option<Target>> {
        {
            let cache = self.cached.read().await;
            if cache.is_some() {
                return Ok(cache.clone());
            }
        }

        if !self.target_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.target_path)
            .map_err(|e| StoreError::Storage(format!("Failed to read target file: {}", e)))?;

        let target: Target = serde_json::from_str(&content)
            .map_err(|e| StoreError::Serialization(format!("Failed to parse target file: {}", e)))?;

        let mut cache = self.cached.write().await;
        *cache = Some(target.clone());

        Ok(Some(target))
    }

    async fn delete(&self) -> Result<()> {
        let mut cache = self.cached.write().await;

        if self.target_path.exists() {
            std::fs::remove_file(&self.target_path)
                .map_err(|e| StoreError::Storage(format!("Failed to delete target file: {}", e)))?;
            tracing::info!("Target deleted from {}", self.target_path.display());
        }

        *cache = None;
        Ok(())
    }
}

// ============================================================================
// InMemoryTargetStore
// ============================================================================

/// In-memory target store for ephemeral sessions and tests.
#[derive(Debug)]
pub struct InMemoryTargetStore {
    target: RwLock<Option<Target>>,
}

impl InMemoryTargetStore {
    pub fn new() -> Self {
        Self {
            target: RwLock::new(None),
        }
    }

    pub fn with_target(target: Target) -> Self {
        Self {
            target: RwLock::new(Some(target)),
        }
    }
}

impl Default for InMemoryTargetStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TargetStore for InMemoryTargetStore {
    async fn save(&self, target: &Target) -> Result<()> {
        let mut cache = self.target.write().await;
        *cache = Some(target.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<Target>> {
        let cache = self.target.read().await;
        Ok(cache.clone())
    }

    async fn delete(&self) -> Result<()> {
        let mut cache = self.target.write().await;
        *cache = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contrail_types::Token;
    use tempfile::tempdir;

    fn sample_target() -> Target {
        Target::new(
            "prod",
            "https://ci.example.com",
            "main",
            Token::new("abc123"),
        )
    }

    #[tokio::test]
    async fn test_file_store_empty_load() {
        let temp = tempdir().unwrap();
        let store = FileTargetStore::new(temp.path());
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_save_and_load_round_trips_all_fields() {
        let temp = tempdir().unwrap();
        let store = FileTargetStore::new(temp.path());

        store.save(&sample_target()).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.name, "prod");
        assert_eq!(loaded.api_url, "https://ci.example.com");
        assert_eq!(loaded.team_name, "main");
        assert_eq!(loaded.token.value, "abc123");
    }

    #[tokio::test]
    async fn test_file_load_survives_cold_cache() {
        let temp = tempdir().unwrap();
        {
            let store = FileTargetStore::new(temp.path());
            store.save(&sample_target()).await.unwrap();
        }

        // Fresh store over the same directory reads from disk.
        let store = FileTargetStore::new(temp.path());
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, sample_target());
    }

    #[tokio::test]
    async fn test_file_save_overwrites() {
        let temp = tempdir().unwrap();
        let store = FileTargetStore::new(temp.path());

        store.save(&sample_target()).await.unwrap();

        let replacement = Target::new(
            "staging",
            "https://staging.example.com",
            "qa",
            Token::new("xyz789"),
        );
        store.save(&replacement).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, replacement);
    }

    #[tokio::test]
    async fn test_file_delete_then_load_is_none() {
        let temp = tempdir().unwrap();
        let store = FileTargetStore::new(temp.path());

        store.save(&sample_target()).await.unwrap();
        store.delete().await.unwrap();

        assert!(store.load().await.unwrap().is_none());
        assert!(!store.target_path().exists());
    }

    #[tokio::test]
    async fn test_file_delete_is_idempotent() {
        let temp = tempdir().unwrap();
        let store = FileTargetStore::new(temp.path());

        store.delete().await.unwrap();
        store.delete().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = InMemoryTargetStore::new();
        assert!(store.load().await.unwrap().is_none());

        store.save(&sample_target()).await.unwrap();
        assert_eq!(store.load().await.unwrap().unwrap(), sample_target());

        store.delete().await.unwrap();
        store.delete().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_delete_converges_to_no_target() {
        let store: SharedTargetStore = Arc::new(InMemoryTargetStore::with_target(sample_target()));

        // Invalidation racing an explicit logout.
        let a = store.clone();
        let b = store.clone();
        let (ra, rb) = tokio::join!(a.delete(), b.delete());
        ra.unwrap();
        rb.unwrap();

        assert!(store.load().await.unwrap().is_none());
    }
}
