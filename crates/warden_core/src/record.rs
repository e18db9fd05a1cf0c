//! The detection record handed from detector to enforcer.

use crate::{GroupId, UserId};
use chrono::{NaiveDateTime, SubsecRound};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Name used when the target group's display name could not be fetched.
pub const UNKNOWN_GROUP_NAME: &str = "unknown";

/// One detected unauthorized invitation.
///
/// Built once per detected event by the detector and consumed by the enforcer.
/// Text fields are normalized at construction so they never contain `'|'` or
/// line breaks, which keeps the wire encoding lossless.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct DetectionRecord {
    /// Watched group the inviter belongs to.
    monitor_group_id: GroupId,
    /// The inviter.
    user_id: UserId,
    /// Group card, falling back to nickname, then to the user id.
    display_card: String,
    /// Account nickname, possibly empty.
    nickname: String,
    /// Group the inviter tried to pull others into.
    target_group_id: GroupId,
    /// Display name of the target group, or [`UNKNOWN_GROUP_NAME`].
    target_group_name: String,
    /// Capture time, whole seconds.
    timestamp: NaiveDateTime,
}

impl DetectionRecord {
    /// Create a record, applying the card and group-name fallbacks.
    pub fn new(
        monitor_group_id: GroupId,
        user_id: UserId,
        display_card: Option<&str>,
        nickname: Option<&str>,
        target_group_id: GroupId,
        target_group_name: Option<&str>,
        timestamp: NaiveDateTime,
    ) -> Self {
        let nickname = nickname.map(sanitize).unwrap_or_default();
        let display_card = display_card
            .map(sanitize)
            .filter(|card| !card.is_empty())
            .or_else(|| Some(nickname.clone()).filter(|nick| !nick.is_empty()))
            .unwrap_or_else(|| user_id.to_string());
        let target_group_name = target_group_name
            .map(sanitize)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_GROUP_NAME.to_string());

        Self {
            monitor_group_id,
            user_id,
            display_card,
            nickname,
            target_group_id,
            target_group_name,
            timestamp: timestamp.trunc_subsecs(0),
        }
    }
}

/// Strip characters that would break a single-line, pipe-delimited message.
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '|' => '/',
            '\r' | '\n' => ' ',
            other => other,
        })
        .collect()
}
