//! Collaborator traits.

use async_trait::async_trait;
use warden_core::{GroupId, GroupInfo, LedgerEntry, MemberInfo, UserId};
use warden_error::{LedgerError, TransportError};

/// Actions a connected bot peer can perform on chat groups.
///
/// Every call may fail independently; callers decide which failures stop the
/// work at hand. Implementations never retry.
///
/// # Tracing
///
/// Implementations should instrument each call with the group and user ids
/// and emit an error event with context when the peer refuses.
#[async_trait]
pub trait GroupTransport: Send + Sync {
    /// Post a text message to a group.
    async fn send_group_message(&self, group: GroupId, text: &str) -> Result<(), TransportError>;

    /// Remove a member from a group.
    ///
    /// # Arguments
    ///
    /// * `reject_add_request` - also refuse future join requests from the user
    async fn kick_member(
        &self,
        group: GroupId,
        user: UserId,
        reject_add_request: bool,
    ) -> Result<(), TransportError>;

    /// Refuse a pending group request identified by `request_token`.
    async fn reject_request(&self, request_token: &str, reason: &str)
    -> Result<(), TransportError>;

    /// Fetch a member's role, card and nickname.
    ///
    /// Fails when the user is not a current member of `group`.
    async fn get_member_info(
        &self,
        group: GroupId,
        user: UserId,
    ) -> Result<MemberInfo, TransportError>;

    /// Fetch group details.
    async fn get_group_info(&self, group: GroupId) -> Result<GroupInfo, TransportError>;
}

/// Append-only store for enforcement records.
#[async_trait]
pub trait LedgerSink: Send + Sync {
    /// Append one entry.
    async fn append(&self, entry: &LedgerEntry) -> Result<(), LedgerError>;
}
