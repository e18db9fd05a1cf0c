//! Shared mocks for moderation integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use warden_core::{
    EventClass, GroupId, GroupInfo, InviteEvent, LedgerEntry, MemberInfo, MemberRole, PeerId,
    PluginPolicy, UserId,
};
use warden_error::{LedgerError, LedgerErrorKind, TransportError, TransportErrorKind};
use warden_interface::{GroupTransport, LedgerSink};
use warden_moderation::{
    EnforcementCoordinator, PeerHandle, PeerRegistry, PolicyStore, WardenMetrics,
};

/// One call made against a [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Send { group: GroupId, text: String },
    Kick { group: GroupId, user: UserId },
    Reject { token: String, reason: String },
    MemberInfo { group: GroupId, user: UserId },
    GroupInfo { group: GroupId },
}

/// Transport that answers from fixed tables and records every call.
#[derive(Default)]
pub struct MockTransport {
    members: HashMap<(GroupId, UserId), MemberInfo>,
    groups: HashMap<GroupId, String>,
    fail_send: bool,
    fail_kick: bool,
    fail_reject: bool,
    calls: Mutex<Vec<Call>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(mut self, group: i64, user: i64, role: MemberRole, card: &str) -> Self {
        self.members.insert(
            (GroupId(group), UserId(user)),
            MemberInfo::new(role, card, format!("{}-nick", card)),
        );
        self
    }

    pub fn with_group(mut self, group: i64, name: &str) -> Self {
        self.groups.insert(GroupId(group), name.to_string());
        self
    }

    pub fn failing_send(mut self) -> Self {
        self.fail_send = true;
        self
    }

    pub fn failing_kick(mut self) -> Self {
        self.fail_kick = true;
        self
    }

    pub fn failing_reject(mut self) -> Self {
        self.fail_reject = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn kicks(&self) -> Vec<(GroupId, UserId)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Kick { group, user } => Some((group, user)),
                _ => None,
            })
            .collect()
    }

    pub fn messages(&self) -> Vec<(GroupId, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Send { group, text } => Some((group, text)),
                _ => None,
            })
            .collect()
    }

    pub fn rejects(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Reject { token, .. } => Some(token),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn refuse(action: &str) -> TransportError {
        TransportError::new(TransportErrorKind::Api {
            action: action.to_string(),
            retcode: 100,
            message: "refused by mock".to_string(),
        })
    }
}

#[async_trait]
impl GroupTransport for MockTransport {
    async fn send_group_message(&self, group: GroupId, text: &str) -> Result<(), TransportError> {
        self.record(Call::Send {
            group,
            text: text.to_string(),
        });
        if self.fail_send {
            return Err(Self::refuse("send_group_msg"));
        }
        Ok(())
    }

    async fn kick_member(
        &self,
        group: GroupId,
        user: UserId,
        _reject_add_request: bool,
    ) -> Result<(), TransportError> {
        self.record(Call::Kick { group, user });
        if self.fail_kick {
            return Err(Self::refuse("set_group_kick"));
        }
        Ok(())
    }

    async fn reject_request(
        &self,
        request_token: &str,
        reason: &str,
    ) -> Result<(), TransportError> {
        self.record(Call::Reject {
            token: request_token.to_string(),
            reason: reason.to_string(),
        });
        if self.fail_reject {
            return Err(Self::refuse("set_group_add_request"));
        }
        Ok(())
    }

    async fn get_member_info(
        &self,
        group: GroupId,
        user: UserId,
    ) -> Result<MemberInfo, TransportError> {
        self.record(Call::MemberInfo { group, user });
        self.members
            .get(&(group, user))
            .cloned()
            .ok_or_else(|| Self::refuse("get_group_member_info"))
    }

    async fn get_group_info(&self, group: GroupId) -> Result<GroupInfo, TransportError> {
        self.record(Call::GroupInfo { group });
        self.groups
            .get(&group)
            .map(GroupInfo::new)
            .ok_or_else(|| Self::refuse("get_group_info"))
    }
}

/// In-memory ledger that can be told to fail.
#[derive(Default)]
pub struct MemoryLedger {
    entries: Mutex<Vec<LedgerEntry>>,
    fail: bool,
}

impl MemoryLedger {
    pub fn failing() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl LedgerSink for MemoryLedger {
    async fn append(&self, entry: &LedgerEntry) -> Result<(), LedgerError> {
        if self.fail {
            return Err(LedgerError::new(LedgerErrorKind::Write(
                "disk full".to_string(),
            )));
        }
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

/// Coordinator wired to in-memory collaborators.
pub struct Harness {
    pub coordinator: EnforcementCoordinator,
    pub registry: Arc<PeerRegistry>,
    pub ledger: Arc<MemoryLedger>,
    pub metrics: WardenMetrics,
}

impl Harness {
    pub fn new(policy: PluginPolicy) -> Self {
        Self::with_ledger(policy, MemoryLedger::default())
    }

    pub fn with_ledger(policy: PluginPolicy, ledger: MemoryLedger) -> Self {
        let registry = Arc::new(PeerRegistry::new());
        let ledger = Arc::new(ledger);
        let metrics = WardenMetrics::new();
        let coordinator = EnforcementCoordinator::new(
            Arc::new(PolicyStore::new(policy)),
            registry.clone(),
            ledger.clone(),
            metrics.clone(),
        );
        Self {
            coordinator,
            registry,
            ledger,
            metrics,
        }
    }

    /// Register `transport` as peer `id` and hand it back for inspection.
    pub fn connect(&self, id: &str, transport: MockTransport) -> Arc<MockTransport> {
        let transport = Arc::new(transport);
        self.registry
            .connect(PeerHandle::new(PeerId::new(id), transport.clone()));
        transport
    }
}

pub const DETECTOR: &str = "10001";
pub const ENFORCER: &str = "10002";
pub const BUS_GROUP: i64 = 999;

/// Same-identity policy watching group 100.
pub fn single_policy() -> PluginPolicy {
    PluginPolicy::builder()
        .detector_identity(DETECTOR)
        .enforcer_identity(DETECTOR)
        .watched_groups(vec![GroupId(100)])
        .enabled(true)
        .build()
        .unwrap()
}

/// Split-identity policy watching group 100 with bus group 999.
pub fn dual_policy() -> PluginPolicy {
    PluginPolicy::builder()
        .detector_identity(DETECTOR)
        .enforcer_identity(ENFORCER)
        .watched_groups(vec![GroupId(100)])
        .bus_group(Some(GroupId(BUS_GROUP)))
        .enabled(true)
        .reject_on_detect(true)
        .build()
        .unwrap()
}

/// Invite request from user 42 pulling the receiving peer into group 200.
pub fn invite(receiver: &str) -> InviteEvent {
    InviteEvent::builder()
        .self_id(receiver)
        .class(EventClass::InviteRequest)
        .group_id(GroupId(200))
        .user_id(UserId(42))
        .target_group(Some(GroupId(200)))
        .request_token(Some("flag-1".to_string()))
        .build()
        .unwrap()
}

/// User 42 invites others from group 100 into group 200.
pub fn notice(receiver: &str) -> InviteEvent {
    InviteEvent::builder()
        .self_id(receiver)
        .class(EventClass::InviteNotice)
        .group_id(GroupId(100))
        .user_id(UserId(42))
        .target_group(Some(GroupId(200)))
        .build()
        .unwrap()
}
