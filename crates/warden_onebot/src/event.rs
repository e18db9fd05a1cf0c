//! Decoding of OneBot v11 event posts.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use warden_core::{
    EventClass, GroupId, GroupMessage, InboundEvent, InviteEvent, LifecycleKind, PeerId, UserId,
};

/// Fields of a OneBot post that the warden looks at. Everything is optional
/// so unknown post shapes decode and fall through to `Ignored`.
#[derive(Debug, Default, Deserialize)]
struct RawEvent {
    #[serde(default)]
    post_type: String,
    #[serde(default)]
    self_id: Option<i64>,
    #[serde(default)]
    request_type: Option<String>,
    #[serde(default)]
    notice_type: Option<String>,
    #[serde(default)]
    message_type: Option<String>,
    #[serde(default)]
    meta_event_type: Option<String>,
    #[serde(default)]
    sub_type: Option<String>,
    #[serde(default)]
    group_id: Option<i64>,
    #[serde(default)]
    user_id: Option<i64>,
    #[serde(default)]
    flag: Option<String>,
    #[serde(default)]
    target_group_id: Option<i64>,
    #[serde(default)]
    target_group_name: Option<String>,
    #[serde(default)]
    raw_message: Option<String>,
    #[serde(default)]
    message: Value,
    #[serde(default)]
    status: Value,
}

/// Map one OneBot event post to an [`InboundEvent`].
///
/// Posts the pipeline does not handle, including malformed ones, become
/// [`InboundEvent::Ignored`].
pub fn parse_event(payload: &Value) -> InboundEvent {
    let raw = match RawEvent::deserialize(payload) {
        Ok(raw) => raw,
        Err(e) => {
            debug!(error = %e, "Unreadable event post");
            return InboundEvent::Ignored;
        }
    };
    let Some(self_id) = raw.self_id.map(|id| PeerId::new(id.to_string())) else {
        debug!(post_type = %raw.post_type, "Event post without self_id");
        return InboundEvent::Ignored;
    };

    match raw.post_type.as_str() {
        "request" => parse_request(self_id, &raw),
        "notice" => parse_notice(self_id, &raw),
        "message" => parse_message(self_id, &raw),
        "meta_event" => parse_meta(self_id, &raw),
        _ => InboundEvent::Ignored,
    }
}

fn parse_request(self_id: PeerId, raw: &RawEvent) -> InboundEvent {
    if raw.request_type.as_deref() != Some("group") {
        return InboundEvent::Ignored;
    }
    let class = match raw.sub_type.as_deref() {
        Some("invite") => EventClass::InviteRequest,
        Some("add") => EventClass::JoinRequest,
        Some(other) => EventClass::Other(other.to_string()),
        None => return InboundEvent::Ignored,
    };
    // For an invite request the group is the one the bot is being pulled into.
    let target = (class == EventClass::InviteRequest)
        .then_some(raw.group_id)
        .flatten();
    invite(self_id, class, raw, target)
}

fn parse_notice(self_id: PeerId, raw: &RawEvent) -> InboundEvent {
    let is_invite_notice = match raw.notice_type.as_deref() {
        Some("group_invite") => true,
        Some("notify") => raw.sub_type.as_deref() == Some("invite"),
        _ => false,
    };
    if !is_invite_notice {
        return InboundEvent::Ignored;
    }
    invite(self_id, EventClass::InviteNotice, raw, raw.target_group_id)
}

fn invite(
    self_id: PeerId,
    class: EventClass,
    raw: &RawEvent,
    target: Option<i64>,
) -> InboundEvent {
    let (Some(group), Some(user)) = (raw.group_id, raw.user_id) else {
        debug!(class = %class, "Invite post missing group or user");
        return InboundEvent::Ignored;
    };
    let built = InviteEvent::builder()
        .self_id(self_id)
        .class(class)
        .group_id(GroupId(group))
        .user_id(UserId(user))
        .target_group(target.map(GroupId))
        .target_group_name(raw.target_group_name.clone())
        .request_token(raw.flag.clone())
        .build();
    match built {
        Ok(event) => InboundEvent::Invite(event),
        Err(e) => {
            debug!(error = %e, "Incomplete invite post");
            InboundEvent::Ignored
        }
    }
}

fn parse_message(self_id: PeerId, raw: &RawEvent) -> InboundEvent {
    if raw.message_type.as_deref() != Some("group") {
        return InboundEvent::Ignored;
    }
    let (Some(group), Some(sender)) = (raw.group_id, raw.user_id) else {
        return InboundEvent::Ignored;
    };
    InboundEvent::GroupMessage(GroupMessage::new(
        self_id,
        GroupId(group),
        UserId(sender),
        message_text(raw),
    ))
}

/// Plain text of a message, from `raw_message` or the text segments.
fn message_text(raw: &RawEvent) -> String {
    if let Some(text) = &raw.raw_message {
        return text.clone();
    }
    match &raw.message {
        Value::String(text) => text.clone(),
        Value::Array(segments) => segments
            .iter()
            .filter(|segment| segment["type"] == "text")
            .filter_map(|segment| segment["data"]["text"].as_str())
            .collect(),
        _ => String::new(),
    }
}

fn parse_meta(self_id: PeerId, raw: &RawEvent) -> InboundEvent {
    let kind = match raw.meta_event_type.as_deref() {
        Some("lifecycle") => match raw.sub_type.as_deref() {
            Some("connect") | Some("enable") => LifecycleKind::Connect,
            Some("disable") => LifecycleKind::Disconnect,
            _ => return InboundEvent::Ignored,
        },
        // Heartbeats re-announce a peer that was online before a restart.
        Some("heartbeat") if raw.status["online"] == Value::Bool(true) => LifecycleKind::Connect,
        _ => return InboundEvent::Ignored,
    };
    InboundEvent::Lifecycle { self_id, kind }
}
