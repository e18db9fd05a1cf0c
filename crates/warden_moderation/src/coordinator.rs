//! Enforcement state machine.
//!
//! ```text
//! Detected -> Resolved -> Published ............ (dual, detector side)
//!                      -> LocalEnforce -> Enforced -> Logged
//! bus message -> decode -> revalidate -> Enforced -> Logged (dual, enforcer side)
//! ```
//!
//! Every handler returns an [`Outcome`]; errors never escape a handler.
//!
//! In dual mode the detector's pending request is held until the enforcer's
//! kick for the same group and inviter succeeds, and only then refused.

use crate::filter::{self, Eligibility, RejectReason};
use crate::{MembershipResolver, PeerHandle, PeerRegistry, PolicyStore, WardenMetrics};
use chrono::Local;
use dashmap::DashMap;
use derive_getters::Getters;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use warden_core::{
    DeploymentMode, DetectionRecord, EnforcementAction, GroupId, GroupMessage, InviteEvent,
    LedgerEntry, PluginPolicy, Role, UserId, wire,
};
use warden_error::{DecodeError, IdentityError, WardenError};
use warden_interface::LedgerSink;

/// Reason passed to the platform when a pending request is refused.
pub const REJECT_REASON: &str = "Unauthorized group invitation";

const DEFAULT_CAUTION: &str =
    "Please do not invite members to other groups. Beware of advertising and scams.";

/// Pipeline stage an outcome refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Stage {
    /// Event accepted for evaluation.
    #[display("detected")]
    Detected,
    /// Home group and record assembled.
    #[display("resolved")]
    Resolved,
    /// Record sent on the bus.
    #[display("published")]
    Published,
    /// Enforcing in the detecting process.
    #[display("local_enforce")]
    LocalEnforce,
    /// Member removed.
    #[display("enforced")]
    Enforced,
    /// Follow-up side effects attempted.
    #[display("logged")]
    Logged,
}

/// Why an event or bus message was ignored.
#[derive(Debug, Clone, derive_more::Display)]
pub enum DropReason {
    /// The eligibility filter said no.
    #[display("filtered: {}", _0)]
    Filtered(RejectReason),
    /// A peer needed for the next step is not connected.
    #[display("{}", _0)]
    Unreachable(IdentityError),
    /// The bus message did not decode.
    #[display("{}", _0)]
    Decode(DecodeError),
    /// Group message that is not detection traffic for this peer.
    #[display("not bus traffic")]
    NotBusTraffic,
    /// Detection message posted by someone other than the detector.
    #[display("sender {} is not the detector", _0)]
    UntrustedSender(UserId),
    /// Decoded record names a group that is no longer watched.
    #[display("group {} is no longer watched", _0)]
    NoLongerWatched(GroupId),
    /// The enforcer sees the inviter as an administrator of the monitor group.
    #[display("user {} administers group {}", user, group)]
    Administrator {
        /// Inviter
        user: UserId,
        /// Monitor group
        group: GroupId,
    },
}

/// What happened after a member was removed.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct EnforcementReport {
    record: DetectionRecord,
    ledger_written: bool,
    notice_sent: bool,
    /// `None` when no reject was attempted.
    request_rejected: Option<bool>,
}

/// Terminal result of handling one event or bus message.
#[derive(Debug)]
pub enum Outcome {
    /// Ignored; nothing was called that changes group state.
    Dropped(DropReason),
    /// Handed to the enforcer over the bus.
    Published {
        /// Published record
        record: DetectionRecord,
        /// Whether a pending request now waits on the enforcer's kick
        request_held: bool,
    },
    /// Member removed and follow-ups attempted.
    Logged(EnforcementReport),
    /// An upstream call stopped the pipeline.
    Failed {
        /// Step that could not complete
        stage: Stage,
        /// Cause
        error: WardenError,
    },
}

impl Outcome {
    /// Whether the inviter was removed.
    pub fn is_enforced(&self) -> bool {
        matches!(self, Self::Logged(_))
    }
}

/// A pending request that may be refused after enforcement.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    peer: PeerHandle,
    token: String,
}

impl PendingRequest {
    /// Request `token` answerable by `peer`.
    pub fn new(peer: PeerHandle, token: impl Into<String>) -> Self {
        Self {
            peer,
            token: token.into(),
        }
    }
}

/// Warning posted to the monitor group after a removal.
pub fn compose_notice(policy: &PluginPolicy, record: &DetectionRecord) -> String {
    let caution = policy
        .notice()
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or(DEFAULT_CAUTION);
    format!(
        "Unauthorized group invitation detected!\n\
         Member: {} ({})\n\
         Invited group: {} ({})\n\
         The member has been removed from this group. {}",
        record.display_card(),
        record.user_id(),
        record.target_group_name(),
        record.target_group_id(),
        caution
    )
}

type HeldKey = (GroupId, UserId);

/// Drives events through detection, handoff and enforcement.
#[derive(Clone)]
pub struct EnforcementCoordinator {
    policy: Arc<PolicyStore>,
    registry: Arc<PeerRegistry>,
    ledger: Arc<dyn LedgerSink>,
    metrics: WardenMetrics,
    held: Arc<DashMap<HeldKey, PendingRequest>>,
}

impl std::fmt::Debug for EnforcementCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnforcementCoordinator")
            .field("policy", &self.policy)
            .field("registry", &self.registry)
            .field("metrics", &self.metrics)
            .field("held", &self.held.len())
            .finish_non_exhaustive()
    }
}

impl EnforcementCoordinator {
    /// Create a coordinator over shared state.
    pub fn new(
        policy: Arc<PolicyStore>,
        registry: Arc<PeerRegistry>,
        ledger: Arc<dyn LedgerSink>,
        metrics: WardenMetrics,
    ) -> Self {
        Self {
            policy,
            registry,
            ledger,
            metrics,
            held: Arc::new(DashMap::new()),
        }
    }

    /// Policy store consulted per event.
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

    /// Published requests still waiting on the enforcer.
    pub fn held_requests(&self) -> usize {
        self.held.len()
    }

    /// Handle an invite-class request or notice.
    #[instrument(
        skip(self, event),
        fields(
            peer = %event.self_id(),
            class = %event.class(),
            group = %event.group_id(),
            user = %event.user_id()
        )
    )]
    pub async fn handle_invite(&self, event: &InviteEvent) -> Outcome {
        self.metrics.record_invite();
        let policy = self.policy.snapshot();

        let mode = match filter::screen(&policy, event) {
            Ok(mode) => mode,
            Err(reason) => return self.dropped(DropReason::Filtered(reason)),
        };

        let receiver = match self.registry.lookup(event.self_id()) {
            Some(handle) => handle,
            None => {
                let role = match mode {
                    DeploymentMode::Dual => Role::Detector.to_string(),
                    DeploymentMode::Single => "receiving".to_string(),
                };
                return self.dropped(DropReason::Unreachable(IdentityError::unreachable(
                    role,
                    event.self_id().as_str(),
                )));
            }
        };

        let resolver = MembershipResolver::new(receiver.transport());
        let home = match filter::evaluate(&policy, event, &resolver).await {
            Eligibility::Eligible { home, .. } => home,
            Eligibility::Rejected(reason) => return self.dropped(DropReason::Filtered(reason)),
        };

        let target = event.effective_target();
        let target_name = match event.target_group_name() {
            Some(name) if !name.trim().is_empty() => Some(name.clone()),
            _ => match receiver.transport().get_group_info(target).await {
                Ok(info) => Some(info.name().clone()),
                Err(e) => {
                    warn!(
                        target = %target,
                        error = %e,
                        "Target group name unavailable, using placeholder"
                    );
                    None
                }
            },
        };

        let member = home.member();
        let record = DetectionRecord::new(
            *home.group_id(),
            *event.user_id(),
            Some(member.card().as_str()),
            Some(member.nickname().as_str()),
            target,
            target_name.as_deref(),
            Local::now().naive_local(),
        );
        info!(
            stage = %Stage::Resolved,
            monitor_group = %record.monitor_group_id(),
            target = %record.target_group_id(),
            "Unauthorized invitation detected"
        );

        let pending = if *policy.reject_on_detect() {
            event
                .request_token()
                .as_ref()
                .map(|token| PendingRequest::new(receiver.clone(), token.clone()))
        } else {
            None
        };

        match mode {
            DeploymentMode::Dual => self.publish(&policy, &receiver, record, pending).await,
            DeploymentMode::Single => {
                let enforcer = match self.registry.lookup_role(Role::Enforcer, &policy) {
                    Ok(handle) => handle,
                    Err(e) => return self.dropped(DropReason::Unreachable(e)),
                };
                debug!(
                    stage = %Stage::LocalEnforce,
                    enforcer = %enforcer.id(),
                    "Enforcing locally"
                );
                self.enforce(&policy, &enforcer, record, pending).await
            }
        }
    }

    /// Send a record to the enforcer over the bus group.
    ///
    /// A pending request is held, not refused, until the enforcer removes the
    /// inviter.
    async fn publish(
        &self,
        policy: &PluginPolicy,
        detector: &PeerHandle,
        record: DetectionRecord,
        pending: Option<PendingRequest>,
    ) -> Outcome {
        let Some(bus) = *policy.bus_group() else {
            return self.failed(
                Stage::Published,
                warden_error::ConfigError::new("dual mode without bus_group").into(),
            );
        };

        let line = wire::encode(&record);
        if let Err(e) = detector.transport().send_group_message(bus, &line).await {
            return self.failed(Stage::Published, e.into());
        }
        self.metrics.record_published();
        info!(stage = %Stage::Published, bus = %bus, "Detection published to enforcer");

        let request_held = match pending {
            Some(pending) => {
                let key = (*record.monitor_group_id(), *record.user_id());
                if self.held.insert(key, pending).is_some() {
                    debug!("Replaced an older held request for the same inviter");
                }
                true
            }
            None => false,
        };
        Outcome::Published {
            record,
            request_held,
        }
    }

    /// Handle a group message that may carry a detection record.
    #[instrument(
        skip(self, message),
        fields(peer = %message.self_id(), group = %message.group_id(), sender = %message.sender())
    )]
    pub async fn handle_bus_message(&self, message: &GroupMessage) -> Outcome {
        let policy = self.policy.snapshot();

        let is_bus_traffic = policy.mode() == DeploymentMode::Dual
            && policy.bus_group().as_ref() == Some(message.group_id())
            && message.self_id() == policy.enforcer_identity()
            && wire::is_detection_message(message.text());
        if !is_bus_traffic {
            return Outcome::Dropped(DropReason::NotBusTraffic);
        }
        if !policy.enabled() {
            return self.dropped(DropReason::Filtered(RejectReason::Disabled));
        }
        if !policy.detector_identity().is_user(*message.sender()) {
            return self.dropped(DropReason::UntrustedSender(*message.sender()));
        }

        let record = match wire::decode(message.text()) {
            Ok(record) => record,
            Err(e) => {
                self.metrics.record_decode_failure();
                return self.dropped(DropReason::Decode(e));
            }
        };
        // Taken now so a drop below leaves the request untouched.
        let pending = self
            .held
            .remove(&(*record.monitor_group_id(), *record.user_id()))
            .map(|(_, pending)| pending);

        let enforcer = match self.registry.lookup_role(Role::Enforcer, &policy) {
            Ok(handle) => handle,
            Err(e) => return self.dropped(DropReason::Unreachable(e)),
        };

        let monitor = *record.monitor_group_id();
        let user = *record.user_id();
        if !policy.is_watched(monitor) {
            return self.dropped(DropReason::NoLongerWatched(monitor));
        }
        let resolver = MembershipResolver::new(enforcer.transport());
        if resolver.is_administrator(monitor, user).await {
            return self.dropped(DropReason::Administrator { user, group: monitor });
        }

        self.enforce(&policy, &enforcer, record, pending).await
    }

    /// Remove the inviter, then record, warn and optionally refuse the request.
    ///
    /// Only the removal can stop the sequence. The follow-ups run regardless of
    /// each other and are reported in the returned [`EnforcementReport`].
    #[instrument(
        skip(self, policy, enforcer, record, pending),
        fields(
            enforcer = %enforcer.id(),
            group = %record.monitor_group_id(),
            user = %record.user_id()
        )
    )]
    pub async fn enforce(
        &self,
        policy: &PluginPolicy,
        enforcer: &PeerHandle,
        record: DetectionRecord,
        pending: Option<PendingRequest>,
    ) -> Outcome {
        let group = *record.monitor_group_id();
        let user = *record.user_id();

        if let Err(e) = enforcer.transport().kick_member(group, user, false).await {
            return self.failed(Stage::Enforced, e.into());
        }
        self.metrics.record_enforced();
        info!(stage = %Stage::Enforced, "Inviter removed from group");

        let entry = LedgerEntry::from_record(&record, EnforcementAction::Kicked, Local::now());
        let ledger_written = match self.ledger.append(&entry).await {
            Ok(()) => true,
            Err(e) => {
                self.metrics.record_ledger_failure();
                warn!(error = %e, "Ledger append failed, removal stands");
                false
            }
        };

        let notice = compose_notice(policy, &record);
        let notice_sent = match enforcer.transport().send_group_message(group, &notice).await {
            Ok(()) => true,
            Err(e) => {
                self.metrics.record_notice_failure();
                warn!(error = %e, "Warning notice not sent");
                false
            }
        };

        let request_rejected = match pending {
            Some(pending) => Some(self.reject(&pending).await),
            None => None,
        };

        info!(
            stage = %Stage::Logged,
            ledger_written,
            notice_sent,
            request_rejected = ?request_rejected,
            "Enforcement complete"
        );
        Outcome::Logged(EnforcementReport {
            record,
            ledger_written,
            notice_sent,
            request_rejected,
        })
    }

    async fn reject(&self, pending: &PendingRequest) -> bool {
        match pending
            .peer
            .transport()
            .reject_request(&pending.token, REJECT_REASON)
            .await
        {
            Ok(()) => {
                debug!(peer = %pending.peer.id(), "Pending request rejected");
                true
            }
            Err(e) => {
                warn!(peer = %pending.peer.id(), error = %e, "Could not reject pending request");
                false
            }
        }
    }

    fn dropped(&self, reason: DropReason) -> Outcome {
        self.metrics.record_dropped();
        match &reason {
            DropReason::Filtered(_) | DropReason::NotBusTraffic => {
                debug!(reason = %reason, "Event dropped")
            }
            _ => warn!(reason = %reason, "Event dropped"),
        }
        Outcome::Dropped(reason)
    }

    fn failed(&self, stage: Stage, error: WardenError) -> Outcome {
        self.metrics.record_failed();
        error!(stage = %stage, error = %error, "Enforcement pipeline failed");
        Outcome::Failed { stage, error }
    }
}
