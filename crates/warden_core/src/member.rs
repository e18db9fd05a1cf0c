//! Group member and group information returned by a transport.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Role a member holds inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    /// Group owner.
    #[display("owner")]
    Owner,
    /// Group administrator.
    #[display("admin")]
    Admin,
    /// Plain member.
    #[display("member")]
    Member,
}

impl MemberRole {
    /// Parse a role string as reported by the platform.
    ///
    /// Unknown strings are plain members.
    pub fn parse(role: &str) -> Self {
        match role.trim().to_ascii_lowercase().as_str() {
            "owner" => Self::Owner,
            "admin" | "administrator" => Self::Admin,
            _ => Self::Member,
        }
    }

    /// Owners and administrators are exempt from invitation enforcement.
    pub fn is_exempt(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }
}

/// Member details used for exemption checks and notices.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct MemberInfo {
    role: MemberRole,
    card: String,
    nickname: String,
}

impl MemberInfo {
    /// Create member info.
    pub fn new(role: MemberRole, card: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            role,
            card: card.into(),
            nickname: nickname.into(),
        }
    }
}

/// Group details; only the display name is used.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GroupInfo {
    name: String,
}

impl GroupInfo {
    /// Create group info.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
