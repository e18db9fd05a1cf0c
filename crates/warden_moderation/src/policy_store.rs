//! Single-slot store for the active policy snapshot.

use arc_swap::ArcSwap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use warden_core::{PluginPolicy, WardenConfig};
use warden_error::ConfigError;

/// Holds the current [`PluginPolicy`].
///
/// Readers take a consistent `Arc` snapshot; a reload publishes a new snapshot
/// atomically. In-flight handlers keep whichever snapshot they loaded.
#[derive(Debug)]
pub struct PolicyStore {
    current: ArcSwap<PluginPolicy>,
    source: Option<PathBuf>,
}

impl PolicyStore {
    /// Store with a fixed initial policy and no backing file.
    pub fn new(policy: PluginPolicy) -> Self {
        Self {
            current: ArcSwap::from_pointee(policy),
            source: None,
        }
    }

    /// Store whose reloads re-read `path`.
    pub fn with_source(policy: PluginPolicy, path: impl Into<PathBuf>) -> Self {
        Self {
            current: ArcSwap::from_pointee(policy),
            source: Some(path.into()),
        }
    }

    /// Load the policy section of a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = WardenConfig::from_file(path)?;
        Ok(Self::with_source(config.policy().clone(), path))
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<PluginPolicy> {
        self.current.load_full()
    }

    /// Publish a new snapshot.
    pub fn replace(&self, policy: PluginPolicy) {
        self.current.store(Arc::new(policy));
    }

    /// Backing file, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Re-read the backing file and publish its policy.
    ///
    /// The file is read on the blocking pool. On failure the previous
    /// snapshot stays active.
    pub async fn reload(&self) -> Result<Arc<PluginPolicy>, ConfigError> {
        let path = self
            .source
            .clone()
            .ok_or_else(|| ConfigError::new("No config file path set"))?;

        let read_path = path.clone();
        let loaded = tokio::task::spawn_blocking(move || WardenConfig::from_file(&read_path))
            .await
            .map_err(|e| ConfigError::new(format!("Policy reload task failed: {}", e)))
            .and_then(|result| result);
        let config = loaded.inspect_err(|e| {
            warn!(
                path = %path.display(),
                error = %e,
                "Policy reload failed, keeping previous policy"
            );
        })?;
        let policy = Arc::new(config.policy().clone());
        self.current.store(policy.clone());

        info!(
            path = %path.display(),
            enabled = policy.enabled(),
            mode = %policy.mode(),
            watched = policy.watched_groups().len(),
            "Policy reloaded"
        );
        Ok(policy)
    }
}
