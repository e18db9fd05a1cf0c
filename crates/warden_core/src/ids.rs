//! Identifier newtypes.

use serde::{Deserialize, Serialize};

/// Chat group identifier.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
#[display("{}", _0)]
pub struct GroupId(pub i64);

/// Chat user identifier.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
#[display("{}", _0)]
pub struct UserId(pub i64);

/// Opaque identifier of a connected bot peer (its account id as text).
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(transparent)]
#[display("{}", _0)]
pub struct PeerId(pub String);

impl PeerId {
    /// Create a peer id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this peer is the chat account `user`.
    ///
    /// Bot accounts are ordinary users on the wire, so a bus message can be
    /// attributed to a peer by comparing the sender's user id.
    pub fn is_user(&self, user: UserId) -> bool {
        self.0.trim() == user.0.to_string()
    }
}

impl From<&str> for PeerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Logical role a connected peer plays in a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Role {
    /// Observes invite events.
    #[display("detector")]
    Detector,
    /// Performs removals.
    #[display("enforcer")]
    Enforcer,
}
