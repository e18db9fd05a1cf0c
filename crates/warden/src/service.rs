//! Builds the running service from a configuration file.

use crate::{ApiState, create_router};
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use warden_core::{PeerId, WardenConfig};
use warden_error::WardenResult;
use warden_moderation::{
    EnforcementCoordinator, EventDispatcher, EventRouter, FileLedger, OperatorConsole, PeerRegistry,
    PolicyStore, TransportFactory, WardenMetrics,
};
use warden_onebot::OneBotTransportFactory;

/// The assembled pipeline: shared state plus the event dispatcher.
#[derive(Debug)]
pub struct Warden {
    config: WardenConfig,
    policy: Arc<PolicyStore>,
    registry: Arc<PeerRegistry>,
    metrics: WardenMetrics,
    dispatcher: Arc<EventDispatcher>,
}

impl Warden {
    /// Load `path` and assemble the pipeline around OneBot peers.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> WardenResult<Self> {
        let path = path.as_ref();
        let config = WardenConfig::from_file(path)?;
        let policy = PolicyStore::with_source(config.policy().clone(), path);
        let factory = OneBotTransportFactory::new(config.peers());
        Ok(Self::assemble(config, policy, Arc::new(factory)))
    }

    /// Assemble the pipeline with a custom transport factory.
    pub fn assemble(
        config: WardenConfig,
        policy: PolicyStore,
        factory: Arc<dyn TransportFactory>,
    ) -> Self {
        let policy = Arc::new(policy);
        let registry = Arc::new(PeerRegistry::new());
        let metrics = WardenMetrics::new();
        let ledger = Arc::new(FileLedger::new(config.ledger().path()));

        let coordinator =
            EnforcementCoordinator::new(policy.clone(), registry.clone(), ledger, metrics.clone());
        let console = OperatorConsole::new(policy.clone(), registry.clone(), metrics.clone());
        let dispatcher = EventDispatcher::new(
            EventRouter::new(coordinator, console),
            registry.clone(),
            factory,
        );

        let snapshot = policy.snapshot();
        info!(
            mode = %snapshot.mode(),
            enabled = snapshot.enabled(),
            detector = %snapshot.detector_identity(),
            enforcer = %snapshot.enforcer_identity(),
            watched = snapshot.watched_groups().len(),
            "Warden assembled"
        );
        for role_peer in [snapshot.detector_identity(), snapshot.enforcer_identity()] {
            if config.peer(role_peer).is_none() {
                warn!(peer = %role_peer, "No [[peers]] entry, this identity cannot act");
            }
        }

        Self {
            config,
            policy,
            registry,
            metrics,
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Loaded configuration.
    pub fn config(&self) -> &WardenConfig {
        &self.config
    }

    /// Live policy store.
    pub fn policy(&self) -> &Arc<PolicyStore> {
        &self.policy
    }

    /// Connected peers.
    pub fn registry(&self) -> &Arc<PeerRegistry> {
        &self.registry
    }

    /// Outcome counters.
    pub fn metrics(&self) -> &WardenMetrics {
        &self.metrics
    }

    /// Whether `peer` is currently registered.
    pub fn is_connected(&self, peer: &PeerId) -> bool {
        self.registry.is_connected(peer)
    }

    /// Webhook and status routes.
    pub fn router(&self) -> Router {
        create_router(ApiState::new(
            self.dispatcher.clone(),
            self.registry.clone(),
            self.metrics.clone(),
            self.config.server().secret().clone(),
        ))
    }

    /// Drain queued events and stop the workers.
    pub async fn shutdown(&self) {
        self.dispatcher.shutdown().await;
    }
}
