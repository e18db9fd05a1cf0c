//! Core data types for the invite warden.
//!
//! This crate holds the platform-neutral model shared by every other crate:
//! - identifiers ([`GroupId`], [`UserId`], [`PeerId`]) and roles
//! - the [`PluginPolicy`] snapshot and the configuration file layout
//! - normalized inbound events
//! - the [`DetectionRecord`] and its single-line [`wire`] codec
//! - the [`LedgerEntry`] audit line

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod event;
mod ids;
mod ledger;
mod member;
mod policy;
mod record;
pub mod wire;

pub use config::{LedgerConfig, PeerEndpoint, ServerConfig, WardenConfig};
pub use event::{
    EventClass, GroupMessage, InboundEvent, InviteEvent, InviteEventBuilder, LifecycleKind,
};
pub use ids::{GroupId, PeerId, Role, UserId};
pub use ledger::{EnforcementAction, LedgerEntry};
pub use member::{GroupInfo, MemberInfo, MemberRole};
pub use policy::{DeploymentMode, PluginPolicy, PluginPolicyBuilder};
pub use record::{DetectionRecord, UNKNOWN_GROUP_NAME};
