//! Moderation policy snapshot.

use crate::{GroupId, PeerId, Role, UserId};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;
use warden_error::ConfigError;

/// How detection is handed to enforcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
pub enum DeploymentMode {
    /// Detection and enforcement happen in this process, no bus traffic.
    #[display("single")]
    Single,
    /// The detector publishes records on the bus group for a remote enforcer.
    #[display("dual")]
    Dual,
}

/// Immutable moderation policy.
///
/// A snapshot is never mutated after loading; reloading replaces it whole.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct PluginPolicy {
    /// Peer that observes invite events.
    detector_identity: PeerId,
    /// Peer that removes offending members.
    enforcer_identity: PeerId,
    /// Protected groups, probed in this order.
    #[serde(default)]
    #[builder(default)]
    watched_groups: Vec<GroupId>,
    /// Group used as the detector-to-enforcer message channel.
    #[serde(default)]
    #[builder(default)]
    bus_group: Option<GroupId>,
    /// Master switch.
    #[serde(default)]
    #[builder(default)]
    enabled: bool,
    /// Reject the pending invite request after a detection.
    #[serde(default)]
    #[builder(default)]
    reject_on_detect: bool,
    /// Accounts allowed to run operator commands.
    #[serde(default)]
    #[builder(default)]
    superusers: HashSet<UserId>,
    /// Replacement for the caution line of the warning notice.
    #[serde(default)]
    #[builder(default)]
    notice: Option<String>,
}

impl PluginPolicy {
    /// Start building a policy.
    pub fn builder() -> PluginPolicyBuilder {
        PluginPolicyBuilder::default()
    }

    /// Deployment mode derived from the identities and bus group.
    pub fn mode(&self) -> DeploymentMode {
        match self.bus_group {
            Some(_) if self.detector_identity != self.enforcer_identity => DeploymentMode::Dual,
            _ => DeploymentMode::Single,
        }
    }

    /// Whether `group` is protected by this policy.
    pub fn is_watched(&self, group: GroupId) -> bool {
        self.watched_groups.contains(&group)
    }

    /// Configured peer for a role.
    pub fn identity(&self, role: Role) -> &PeerId {
        match role {
            Role::Detector => &self.detector_identity,
            Role::Enforcer => &self.enforcer_identity,
        }
    }

    /// Check the policy has everything the pipeline needs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.detector_identity.as_str().trim().is_empty() {
            return Err(ConfigError::new("detector_identity is not set"));
        }
        if self.enforcer_identity.as_str().trim().is_empty() {
            return Err(ConfigError::new("enforcer_identity is not set"));
        }
        if self.watched_groups.is_empty() {
            return Err(ConfigError::new("watched_groups is empty"));
        }
        Ok(())
    }

    /// Normalize a freshly loaded policy.
    ///
    /// Duplicate watched groups are dropped, keeping first occurrence order.
    /// An incomplete policy is disabled with a warning instead of failing.
    pub fn sanitized(mut self) -> Self {
        let mut seen = HashSet::new();
        self.watched_groups.retain(|group| seen.insert(*group));

        if self.enabled {
            if let Err(e) = self.validate() {
                warn!(error = %e, "Policy incomplete, invitation monitoring disabled");
                self.enabled = false;
            }
        }
        self
    }
}
