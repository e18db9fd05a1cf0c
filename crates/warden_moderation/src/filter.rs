//! Eligibility checks for inbound invite events.
//!
//! Checks run in a fixed order, cheapest and most decisive first:
//!
//! 1. the policy is enabled
//! 2. the event is invitation-class
//! 3. the right peer received it (dual mode) or, for a single mode invite
//!    notice, it was observed in a watched group
//! 4. the inviter has a home group
//! 5. the inviter is not an administrator there
//!
//! An invite request names the group the peer is being pulled into, so its
//! home group is always searched across the watched groups. An invite notice
//! in single mode is observed in the home group itself; when the inviter's
//! details cannot be fetched there, they count as a plain member.
//!
//! Steps 1-3 need no network and are exposed separately as [`screen`] so the
//! caller can pick the resolving peer before paying for steps 4-5.

use crate::{HomeGroup, MembershipResolver};
use tracing::{debug, warn};
use warden_core::{
    DeploymentMode, EventClass, GroupId, InviteEvent, MemberInfo, MemberRole, PeerId, PluginPolicy,
    UserId,
};

/// Why an event was not acted on.
#[derive(Debug, Clone, derive_more::Display)]
pub enum RejectReason {
    /// Monitoring is switched off.
    #[display("policy disabled")]
    Disabled,
    /// Not an invitation request or notice.
    #[display("not an invitation: {}", _0)]
    NotInvitation(EventClass),
    /// Dual mode event delivered to a peer other than the detector.
    #[display("received by {} instead of detector {}", actual, expected)]
    WrongReceiver {
        /// Configured detector
        expected: PeerId,
        /// Receiving peer
        actual: PeerId,
    },
    /// Single mode invite notice from a group outside the policy.
    #[display("group {} is not watched", _0)]
    UnwatchedGroup(GroupId),
    /// Inviter is not a member of any watched group.
    #[display("user {} has no home group", _0)]
    NoHomeGroup(UserId),
    /// Inviter is an owner or administrator of the home group.
    #[display("user {} is {} of group {}", user, role, group)]
    Exempt {
        /// Inviter
        user: UserId,
        /// Home group
        group: GroupId,
        /// Exempting role
        role: MemberRole,
    },
}

/// Result of a full evaluation.
#[derive(Debug, Clone)]
pub enum Eligibility {
    /// Hand to the coordinator.
    Eligible {
        /// Mode the policy was in when evaluated.
        mode: DeploymentMode,
        /// Where the inviter was found.
        home: HomeGroup,
    },
    /// Drop the event.
    Rejected(RejectReason),
}

/// Steps 1-3: decide without network calls whether an event is in scope.
pub fn screen(policy: &PluginPolicy, event: &InviteEvent) -> Result<DeploymentMode, RejectReason> {
    if !policy.enabled() {
        return Err(RejectReason::Disabled);
    }

    if !event.class().is_invitation() {
        return Err(RejectReason::NotInvitation(event.class().clone()));
    }

    let mode = policy.mode();
    match mode {
        DeploymentMode::Dual => {
            if event.self_id() != policy.detector_identity() {
                return Err(RejectReason::WrongReceiver {
                    expected: policy.detector_identity().clone(),
                    actual: event.self_id().clone(),
                });
            }
        }
        DeploymentMode::Single => {
            let observed_in_home = *event.class() == EventClass::InviteNotice;
            if observed_in_home && !policy.is_watched(*event.group_id()) {
                return Err(RejectReason::UnwatchedGroup(*event.group_id()));
            }
        }
    }
    Ok(mode)
}

/// All five steps, resolving membership through `resolver`.
pub async fn evaluate(
    policy: &PluginPolicy,
    event: &InviteEvent,
    resolver: &MembershipResolver<'_>,
) -> Eligibility {
    let mode = match screen(policy, event) {
        Ok(mode) => mode,
        Err(reason) => return Eligibility::Rejected(reason),
    };

    let user = *event.user_id();
    let home = match (mode, event.class()) {
        (DeploymentMode::Single, EventClass::InviteNotice) => {
            let group = *event.group_id();
            let member = match resolver.member_in(group, user).await {
                Ok(member) => member,
                Err(e) => {
                    warn!(error = %e, "Inviter details unavailable, treating as plain member");
                    MemberInfo::new(MemberRole::Member, "", "")
                }
            };
            HomeGroup::new(group, member)
        }
        _ => match resolver.resolve_home_group(user, policy.watched_groups()).await {
            Some(home) => home,
            None => return Eligibility::Rejected(RejectReason::NoHomeGroup(user)),
        },
    };

    let role = *home.member().role();
    if role.is_exempt() {
        return Eligibility::Rejected(RejectReason::Exempt {
            user,
            group: *home.group_id(),
            role,
        });
    }

    debug!(user = %user, home = %home.group_id(), mode = %mode, "Invite eligible for enforcement");
    Eligibility::Eligible { mode, home }
}
