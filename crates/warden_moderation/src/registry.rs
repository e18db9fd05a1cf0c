//! Registry of connected bot peers.
//!
//! Entries are added and removed only in response to the transport's own
//! connect/disconnect signals; there is no health checking here.

use chrono::{DateTime, Local};
use dashmap::DashMap;
use derive_getters::Getters;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};
use warden_core::{DeploymentMode, PeerId, PluginPolicy, Role};
use warden_error::IdentityError;
use warden_interface::GroupTransport;

/// A live, connected peer that can act on groups.
#[derive(Clone)]
pub struct PeerHandle {
    id: PeerId,
    transport: Arc<dyn GroupTransport>,
    connected_at: DateTime<Local>,
}

impl PeerHandle {
    /// Wrap a transport for `id`, stamped with the current time.
    pub fn new(id: PeerId, transport: Arc<dyn GroupTransport>) -> Self {
        Self {
            id,
            transport,
            connected_at: Local::now(),
        }
    }

    /// Peer identifier.
    pub fn id(&self) -> &PeerId {
        &self.id
    }

    /// Actions available as this peer.
    pub fn transport(&self) -> &dyn GroupTransport {
        self.transport.as_ref()
    }

    /// When the peer was registered.
    pub fn connected_at(&self) -> &DateTime<Local> {
        &self.connected_at
    }
}

impl fmt::Debug for PeerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerHandle")
            .field("id", &self.id)
            .field("connected_at", &self.connected_at)
            .finish_non_exhaustive()
    }
}

/// Process-wide map from peer id to live handle.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: DashMap<PeerId, PeerHandle>,
}

impl PeerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a peer, replacing any previous handle for the same id.
    pub fn connect(&self, handle: PeerHandle) -> Option<PeerHandle> {
        info!(peer = %handle.id(), "Peer connected");
        self.peers.insert(handle.id().clone(), handle)
    }

    /// Forget a peer. Returns whether it was registered.
    pub fn disconnect(&self, id: &PeerId) -> bool {
        let removed = self.peers.remove(id).is_some();
        if removed {
            info!(peer = %id, "Peer disconnected");
        } else {
            debug!(peer = %id, "Disconnect for unknown peer");
        }
        removed
    }

    /// Live handle for a peer.
    pub fn lookup(&self, id: &PeerId) -> Option<PeerHandle> {
        self.peers.get(id).map(|entry| entry.value().clone())
    }

    /// Whether a peer is currently registered.
    pub fn is_connected(&self, id: &PeerId) -> bool {
        self.peers.contains_key(id)
    }

    /// Live handle for the peer configured for `role`.
    pub fn lookup_role(
        &self,
        role: Role,
        policy: &PluginPolicy,
    ) -> Result<PeerHandle, IdentityError> {
        let id = policy.identity(role);
        self.lookup(id)
            .ok_or_else(|| IdentityError::unreachable(role.to_string(), id.as_str()))
    }

    /// Ids of all registered peers, sorted.
    pub fn connected(&self) -> Vec<PeerId> {
        let mut ids: Vec<PeerId> = self.peers.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Which configured identities are present.
    pub fn status(&self, policy: &PluginPolicy) -> IdentityStatus {
        IdentityStatus {
            mode: policy.mode(),
            detector: policy.detector_identity().clone(),
            detector_online: self.is_connected(policy.detector_identity()),
            enforcer: policy.enforcer_identity().clone(),
            enforcer_online: self.is_connected(policy.enforcer_identity()),
        }
    }
}

/// Connection state of the configured identities.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct IdentityStatus {
    mode: DeploymentMode,
    detector: PeerId,
    detector_online: bool,
    enforcer: PeerId,
    enforcer_online: bool,
}

impl fmt::Display for IdentityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = |online: bool| if online { "online" } else { "offline" };
        write!(
            f,
            "mode: {}\ndetector {}: {}\nenforcer {}: {}",
            self.mode,
            self.detector,
            state(self.detector_online),
            self.enforcer,
            state(self.enforcer_online),
        )
    }
}
