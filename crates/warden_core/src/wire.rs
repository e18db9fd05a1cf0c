//! Single-line wire format for detection records posted on the bus group.
//!
//! ```text
//! InvalidGroupInvitationDetect | Time: 2024-01-01 00:00:00 | MonitorGroup: 100 | User: 42 | Card: alice | Nickname: alice | TargetGroup: 200 | TargetGroupName: ads
//! ```
//!
//! Key names are a contract between detector and enforcer deployments and must
//! not change. Decoding is position-independent except for the sentinel, which
//! must be the first segment.

use crate::{DetectionRecord, GroupId, UserId};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use warden_error::{DecodeError, DecodeErrorKind};

/// First segment of every detection message.
pub const SENTINEL: &str = "InvalidGroupInvitationDetect";

/// Separator between segments.
pub const SEGMENT_DELIMITER: &str = " | ";

/// Separator between a key and its value inside a segment.
pub const KEY_DELIMITER: &str = ": ";

/// Timestamp layout of the `Time` key.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const KEY_TIME: &str = "Time";
const KEY_MONITOR_GROUP: &str = "MonitorGroup";
const KEY_USER: &str = "User";
const KEY_CARD: &str = "Card";
const KEY_NICKNAME: &str = "Nickname";
const KEY_TARGET_GROUP: &str = "TargetGroup";
const KEY_TARGET_GROUP_NAME: &str = "TargetGroupName";

const REQUIRED_KEYS: [&str; 6] = [
    KEY_TIME,
    KEY_MONITOR_GROUP,
    KEY_USER,
    KEY_CARD,
    KEY_NICKNAME,
    KEY_TARGET_GROUP,
];

/// Cheap check for whether a chat line is meant to be a detection message.
pub fn is_detection_message(text: &str) -> bool {
    text.starts_with(SENTINEL)
}

/// Encode a record as one wire line.
pub fn encode(record: &DetectionRecord) -> String {
    let segments = [
        SENTINEL.to_string(),
        format!(
            "{KEY_TIME}{KEY_DELIMITER}{}",
            record.timestamp().format(TIME_FORMAT)
        ),
        format!("{KEY_MONITOR_GROUP}{KEY_DELIMITER}{}", record.monitor_group_id()),
        format!("{KEY_USER}{KEY_DELIMITER}{}", record.user_id()),
        format!("{KEY_CARD}{KEY_DELIMITER}{}", record.display_card()),
        format!("{KEY_NICKNAME}{KEY_DELIMITER}{}", record.nickname()),
        format!("{KEY_TARGET_GROUP}{KEY_DELIMITER}{}", record.target_group_id()),
        format!(
            "{KEY_TARGET_GROUP_NAME}{KEY_DELIMITER}{}",
            record.target_group_name()
        ),
    ];
    segments.join(SEGMENT_DELIMITER)
}

/// Decode one wire line.
///
/// Any violation yields a [`DecodeError`]; a partial record is never returned.
pub fn decode(line: &str) -> Result<DetectionRecord, DecodeError> {
    let mut segments = line.split(SEGMENT_DELIMITER);

    let first = segments.next().unwrap_or_default();
    if first != SENTINEL {
        return Err(DecodeError::new(DecodeErrorKind::MissingSentinel(
            first.to_string(),
        )));
    }

    let mut fields: HashMap<&str, &str> = HashMap::new();
    for segment in segments {
        let (key, value) = segment.split_once(KEY_DELIMITER).ok_or_else(|| {
            DecodeError::new(DecodeErrorKind::MalformedSegment(segment.to_string()))
        })?;
        if fields.insert(key, value).is_some() {
            return Err(DecodeError::new(DecodeErrorKind::DuplicateKey(
                key.to_string(),
            )));
        }
    }

    if let Some(missing) = REQUIRED_KEYS.iter().find(|key| !fields.contains_key(*key)) {
        return Err(DecodeError::new(DecodeErrorKind::MissingKey(*missing)));
    }

    let raw_time = fields[KEY_TIME];
    let timestamp = NaiveDateTime::parse_from_str(raw_time, TIME_FORMAT).map_err(|_| {
        DecodeError::new(DecodeErrorKind::InvalidTimestamp(raw_time.to_string()))
    })?;

    Ok(DetectionRecord::new(
        GroupId(parse_integer(&fields, KEY_MONITOR_GROUP)?),
        UserId(parse_integer(&fields, KEY_USER)?),
        Some(fields[KEY_CARD]),
        Some(fields[KEY_NICKNAME]),
        GroupId(parse_integer(&fields, KEY_TARGET_GROUP)?),
        fields.get(KEY_TARGET_GROUP_NAME).copied(),
        timestamp,
    ))
}

fn parse_integer(fields: &HashMap<&str, &str>, key: &'static str) -> Result<i64, DecodeError> {
    let raw = fields[key];
    raw.parse::<i64>().map_err(|_| {
        DecodeError::new(DecodeErrorKind::InvalidInteger {
            key,
            value: raw.to_string(),
        })
    })
}
