//! Membership and administrator lookups across watched groups.

use derive_getters::Getters;
use tracing::{debug, instrument, warn};
use warden_core::{GroupId, MemberInfo, UserId};
use warden_error::{LookupError, LookupErrorKind};
use warden_interface::GroupTransport;

/// The watched group an inviter was found in, with their member details there.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct HomeGroup {
    group_id: GroupId,
    member: MemberInfo,
}

impl HomeGroup {
    /// Pair a group with the member details found in it.
    pub fn new(group_id: GroupId, member: MemberInfo) -> Self {
        Self { group_id, member }
    }
}

/// Resolves group membership through one peer's transport.
pub struct MembershipResolver<'a> {
    transport: &'a dyn GroupTransport,
}

impl<'a> MembershipResolver<'a> {
    /// Resolver acting as the peer behind `transport`.
    pub fn new(transport: &'a dyn GroupTransport) -> Self {
        Self { transport }
    }

    /// First watched group, in the given order, where `user` is a current member.
    ///
    /// A failed probe means "not in this group" and the search moves on;
    /// absence from every group is `None`, never an error.
    #[instrument(skip(self, watched), fields(user = %user, groups = watched.len()))]
    pub async fn resolve_home_group(&self, user: UserId, watched: &[GroupId]) -> Option<HomeGroup> {
        for group in watched {
            match self.transport.get_member_info(*group, user).await {
                Ok(member) => {
                    debug!(group = %group, role = %member.role(), "Found home group");
                    return Some(HomeGroup::new(*group, member));
                }
                Err(e) => {
                    debug!(group = %group, error = %e, "User not resolved in group");
                }
            }
        }
        debug!("User not found in any watched group");
        None
    }

    /// Member details of `user` in `group`.
    pub async fn member_in(&self, group: GroupId, user: UserId) -> Result<MemberInfo, LookupError> {
        self.transport
            .get_member_info(group, user)
            .await
            .map_err(|e| {
                LookupError::new(LookupErrorKind::MemberUnavailable {
                    group_id: group.0,
                    user_id: user.0,
                    reason: e.to_string(),
                })
            })
    }

    /// Whether `user` is an owner or administrator of `group`.
    ///
    /// A failed lookup counts as not an administrator, so enforcement still
    /// proceeds when the role cannot be determined.
    #[instrument(skip(self), fields(group = %group, user = %user))]
    pub async fn is_administrator(&self, group: GroupId, user: UserId) -> bool {
        match self.transport.get_member_info(group, user).await {
            Ok(member) => member.role().is_exempt(),
            Err(e) => {
                warn!(error = %e, "Role lookup failed, treating as non-administrator");
                false
            }
        }
    }
}
