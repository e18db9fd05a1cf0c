//! Configuration file layout.

use crate::{PeerId, PluginPolicy};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use warden_error::ConfigError;

/// Top-level configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, Getters)]
pub struct WardenConfig {
    /// Moderation policy.
    policy: PluginPolicy,
    /// Audit trail settings.
    #[serde(default)]
    ledger: LedgerConfig,
    /// Webhook server settings.
    #[serde(default)]
    server: ServerConfig,
    /// API endpoints of the bot peers this process may act as.
    #[serde(default)]
    peers: Vec<PeerEndpoint>,
}

impl WardenConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::new(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.policy = config.policy.sanitized();
        Ok(config)
    }

    /// Endpoint configured for `peer`.
    pub fn peer(&self, peer: &PeerId) -> Option<&PeerEndpoint> {
        self.peers.iter().find(|endpoint| &endpoint.id == peer)
    }
}

/// Audit trail settings.
#[derive(Debug, Clone, Serialize, Deserialize, Getters)]
pub struct LedgerConfig {
    /// Append-only ledger file.
    #[serde(default = "default_ledger_path")]
    path: PathBuf,
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("invitation_logs.txt")
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: default_ledger_path(),
        }
    }
}

/// Webhook server settings.
#[derive(Debug, Clone, Serialize, Deserialize, Getters)]
pub struct ServerConfig {
    /// Address the event webhook listens on.
    #[serde(default = "default_bind")]
    bind: SocketAddr,
    /// Shared secret peers must present when posting events.
    #[serde(default)]
    secret: Option<String>,
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            secret: None,
        }
    }
}

/// How to reach one bot peer's action API.
#[derive(Debug, Clone, Serialize, Deserialize, Getters)]
pub struct PeerEndpoint {
    /// Peer account id.
    id: PeerId,
    /// Base URL of the action API.
    api_base: String,
    /// Bearer token for the action API.
    #[serde(default)]
    access_token: Option<String>,
    /// Per-call timeout.
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl PeerEndpoint {
    /// Create an endpoint with the default timeout.
    pub fn new(id: PeerId, api_base: impl Into<String>, access_token: Option<String>) -> Self {
        Self {
            id,
            api_base: api_base.into(),
            access_token,
            timeout_secs: default_timeout_secs(),
        }
    }
}
