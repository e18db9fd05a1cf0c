//! Platform-neutral inbound events.

use crate::{GroupId, PeerId, UserId};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Classification of a group request or notice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum EventClass {
    /// Someone invited the receiving peer into a group.
    #[display("invite_request")]
    InviteRequest,
    /// A member shared an invitation to another group.
    #[display("invite_notice")]
    InviteNotice,
    /// Someone asked to join a group.
    #[display("join_request")]
    JoinRequest,
    /// Any other request or notice sub-type.
    #[display("other({})", _0)]
    Other(String),
}

impl EventClass {
    /// Only invitation-class events are considered for enforcement.
    pub fn is_invitation(&self) -> bool {
        matches!(self, Self::InviteRequest | Self::InviteNotice)
    }
}

/// An invite-class request or notice observed by a peer.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct InviteEvent {
    /// Peer that received the event.
    self_id: PeerId,
    /// Request/notice classification.
    class: EventClass,
    /// Group the event was observed for.
    group_id: GroupId,
    /// The inviter.
    user_id: UserId,
    /// Group the inviter tried to pull others into, when known.
    #[builder(default)]
    target_group: Option<GroupId>,
    /// Display name of the target group, when the platform supplied one.
    #[builder(default)]
    target_group_name: Option<String>,
    /// Token needed to answer a pending request.
    #[builder(default)]
    request_token: Option<String>,
}

impl InviteEvent {
    /// Start building an event.
    pub fn builder() -> InviteEventBuilder {
        InviteEventBuilder::default()
    }

    /// Target group, falling back to the observed group.
    pub fn effective_target(&self) -> GroupId {
        self.target_group.unwrap_or(self.group_id)
    }
}

/// Connection state change reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum LifecycleKind {
    /// Peer came online.
    #[display("connect")]
    Connect,
    /// Peer went offline.
    #[display("disconnect")]
    Disconnect,
}

/// A chat message posted in a group.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GroupMessage {
    self_id: PeerId,
    group_id: GroupId,
    sender: UserId,
    text: String,
}

impl GroupMessage {
    /// Create a group message.
    pub fn new(
        self_id: PeerId,
        group_id: GroupId,
        sender: UserId,
        text: impl Into<String>,
    ) -> Self {
        Self {
            self_id,
            group_id,
            sender,
            text: text.into(),
        }
    }
}

/// Every event the pipeline reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InboundEvent {
    /// Invitation-class request or notice.
    Invite(InviteEvent),
    /// Group chat message (bus traffic and operator commands).
    GroupMessage(GroupMessage),
    /// Peer connect/disconnect.
    Lifecycle {
        /// Peer whose state changed.
        self_id: PeerId,
        /// New state.
        kind: LifecycleKind,
    },
    /// Anything the pipeline does not handle.
    Ignored,
}

impl InboundEvent {
    /// Peer the event was delivered to, if any.
    pub fn self_id(&self) -> Option<&PeerId> {
        match self {
            Self::Invite(event) => Some(event.self_id()),
            Self::GroupMessage(message) => Some(message.self_id()),
            Self::Lifecycle { self_id, .. } => Some(self_id),
            Self::Ignored => None,
        }
    }
}
