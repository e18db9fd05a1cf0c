//! Group-chat operator commands.

use crate::{PeerRegistry, PolicyStore, WardenMetrics};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use warden_core::{GroupMessage, PluginPolicy};

const COMMAND_PREFIX: &str = "/warden";

/// Commands a superuser can post in any group a peer sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum OperatorCommand {
    /// Re-read the policy from its configuration file.
    #[display("reload")]
    Reload,
    /// Report mode, identities and counters.
    #[display("status")]
    Status,
}

impl OperatorCommand {
    /// Parse `/warden reload` or `/warden status`; anything else is `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let mut words = text.split_whitespace();
        if words.next()? != COMMAND_PREFIX {
            return None;
        }
        let command = match words.next()? {
            "reload" => Self::Reload,
            "status" => Self::Status,
            _ => return None,
        };
        words.next().is_none().then_some(command)
    }
}

/// Executes operator commands and replies in the originating group.
#[derive(Debug, Clone)]
pub struct OperatorConsole {
    policy: Arc<PolicyStore>,
    registry: Arc<PeerRegistry>,
    metrics: WardenMetrics,
}

impl OperatorConsole {
    /// Console over the shared pipeline state.
    pub fn new(
        policy: Arc<PolicyStore>,
        registry: Arc<PeerRegistry>,
        metrics: WardenMetrics,
    ) -> Self {
        Self {
            policy,
            registry,
            metrics,
        }
    }

    /// Run the command in `message`, if any, and post the reply.
    ///
    /// Returns the reply text when a command was executed. Only one peer
    /// answers: the enforcer, or the detector while the enforcer is offline.
    #[instrument(
        skip(self, message),
        fields(
            peer = %message.self_id(),
            group = %message.group_id(),
            sender = %message.sender()
        )
    )]
    pub async fn handle_message(&self, message: &GroupMessage) -> Option<String> {
        let command = OperatorCommand::parse(message.text())?;
        let policy = self.policy.snapshot();

        if !policy.superusers().contains(message.sender()) {
            debug!(command = %command, "Ignoring command from non-superuser");
            return None;
        }
        if !self.is_responder(&policy, message) {
            debug!(command = %command, "Another peer answers commands");
            return None;
        }

        info!(command = %command, "Operator command received");
        let reply = match command {
            OperatorCommand::Reload => self.reload().await,
            OperatorCommand::Status => self.status(),
        };

        match self.registry.lookup(message.self_id()) {
            Some(peer) => {
                if let Err(e) = peer
                    .transport()
                    .send_group_message(*message.group_id(), &reply)
                    .await
                {
                    warn!(error = %e, "Command reply not sent");
                }
            }
            None => warn!("Replying peer is not connected"),
        }
        Some(reply)
    }

    fn is_responder(&self, policy: &PluginPolicy, message: &GroupMessage) -> bool {
        let receiver = message.self_id();
        if receiver == policy.enforcer_identity() {
            return true;
        }
        receiver == policy.detector_identity()
            && !self.registry.is_connected(policy.enforcer_identity())
    }

    async fn reload(&self) -> String {
        match self.policy.reload().await {
            Ok(policy) => format!(
                "Policy reloaded.\nenabled: {}\nmode: {}\nwatched groups: {}",
                policy.enabled(),
                policy.mode(),
                policy.watched_groups().len()
            ),
            Err(e) => format!("Reload failed, previous policy kept: {}", e),
        }
    }

    fn status(&self) -> String {
        let policy = self.policy.snapshot();
        let identities = self.registry.status(&policy);
        let counters = self.metrics.snapshot();
        let groups = policy
            .watched_groups()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "{}\nenabled: {}\nwatched groups: [{}]\n\
             enforced: {} failed: {} dropped: {} published: {}",
            identities,
            policy.enabled(),
            groups,
            counters.enforced,
            counters.failed,
            counters.dropped,
            counters.published
        )
    }
}
