//! Audit trail entry and its line format.
//!
//! The ledger line is tab separated and deliberately unrelated to the wire
//! format of [`crate::wire`]:
//!
//! ```text
//! <unix-seconds>\t<YYYY-mm-dd HH:MM:SS>\t<group>\t<user>\t<card>\t<nickname>\t<target>\t<action>
//! ```

use crate::{DetectionRecord, GroupId, UserId};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use warden_error::{LedgerError, LedgerErrorKind};

const FIELD_COUNT: usize = 8;
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Moderation action recorded in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum EnforcementAction {
    /// Member removed from the group.
    #[display("kicked")]
    Kicked,
}

impl EnforcementAction {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "kicked" => Some(Self::Kicked),
            _ => None,
        }
    }
}

/// One enforcement action actually carried out.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct LedgerEntry {
    recorded_at: DateTime<Local>,
    group_id: GroupId,
    user_id: UserId,
    card: String,
    nickname: String,
    target_group_id: GroupId,
    action: EnforcementAction,
}

impl LedgerEntry {
    /// Entry for an action taken on `record` at `recorded_at`.
    pub fn from_record(
        record: &DetectionRecord,
        action: EnforcementAction,
        recorded_at: DateTime<Local>,
    ) -> Self {
        Self {
            recorded_at,
            group_id: *record.monitor_group_id(),
            user_id: *record.user_id(),
            card: record.display_card().clone(),
            nickname: record.nickname().clone(),
            target_group_id: *record.target_group_id(),
            action,
        }
    }

    /// Render as one ledger line, without the trailing newline.
    pub fn to_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.recorded_at.timestamp(),
            self.recorded_at.format(DATE_FORMAT),
            self.group_id,
            self.user_id,
            flatten(&self.card),
            flatten(&self.nickname),
            self.target_group_id,
            self.action,
        )
    }

    /// Parse a line previously produced by [`LedgerEntry::to_line`].
    pub fn parse_line(line: &str) -> Result<Self, LedgerError> {
        let malformed = || LedgerError::new(LedgerErrorKind::Malformed(line.to_string()));
        let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
        if fields.len() != FIELD_COUNT {
            return Err(malformed());
        }

        let recorded_at = match fields[0].parse::<i64>() {
            Ok(secs) => Local.timestamp_opt(secs, 0).single(),
            Err(_) => NaiveDateTime::parse_from_str(fields[1], DATE_FORMAT)
                .ok()
                .and_then(|naive| Local.from_local_datetime(&naive).earliest()),
        }
        .ok_or_else(malformed)?;
        let integer = |raw: &str| raw.parse::<i64>().map_err(|_| malformed());

        Ok(Self {
            recorded_at,
            group_id: GroupId(integer(fields[2])?),
            user_id: UserId(integer(fields[3])?),
            card: fields[4].to_string(),
            nickname: fields[5].to_string(),
            target_group_id: GroupId(integer(fields[6])?),
            action: EnforcementAction::parse(fields[7]).ok_or_else(malformed)?,
        })
    }
}

fn flatten(text: &str) -> String {
    text.replace(['\t', '\r', '\n'], " ")
}
