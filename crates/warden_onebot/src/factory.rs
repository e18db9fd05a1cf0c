//! Builds OneBot clients for peers as they connect.

use crate::OneBotClient;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use warden_core::{PeerEndpoint, PeerId};
use warden_error::ConfigError;
use warden_interface::GroupTransport;
use warden_moderation::TransportFactory;

/// Creates an [`OneBotClient`] from the configured endpoint of each peer.
#[derive(Debug, Clone, Default)]
pub struct OneBotTransportFactory {
    endpoints: HashMap<PeerId, PeerEndpoint>,
}

impl OneBotTransportFactory {
    /// Factory over the `[[peers]]` section of the configuration.
    pub fn new(endpoints: &[PeerEndpoint]) -> Self {
        Self {
            endpoints: endpoints
                .iter()
                .map(|endpoint| (endpoint.id().clone(), endpoint.clone()))
                .collect(),
        }
    }

    /// Whether `peer` has an endpoint.
    pub fn knows(&self, peer: &PeerId) -> bool {
        self.endpoints.contains_key(peer)
    }
}

impl TransportFactory for OneBotTransportFactory {
    fn create(&self, peer: &PeerId) -> Result<Arc<dyn GroupTransport>, ConfigError> {
        let endpoint = self
            .endpoints
            .get(peer)
            .ok_or_else(|| ConfigError::new(format!("No [[peers]] entry for {}", peer)))?;
        let client = OneBotClient::new(endpoint.clone())
            .map_err(|e| ConfigError::new(format!("Cannot create client for {}: {}", peer, e)))?;
        debug!(peer = %peer, api_base = %endpoint.api_base(), "OneBot transport created");
        Ok(Arc::new(client) as Arc<dyn GroupTransport>)
    }
}
