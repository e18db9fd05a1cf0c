//! Invitation moderation pipeline.
//!
//! This crate turns inbound invite events into enforcement:
//!
//! - [`filter`] decides whether an event is in scope
//! - [`MembershipResolver`] finds the inviter's home group and role
//! - [`EnforcementCoordinator`] runs the detect / hand off / enforce sequence
//! - [`PeerRegistry`] tracks which bot identities are connected
//! - [`FileLedger`] keeps the audit trail
//! - [`EventDispatcher`] serializes work per receiving peer
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use warden_moderation::{
//!     EnforcementCoordinator, FileLedger, PeerRegistry, PolicyStore, WardenMetrics,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let policy = Arc::new(PolicyStore::from_file("warden.toml")?);
//! let coordinator = EnforcementCoordinator::new(
//!     policy,
//!     Arc::new(PeerRegistry::new()),
//!     Arc::new(FileLedger::new("invitation_logs.txt")),
//!     WardenMetrics::new(),
//! );
//! # let _ = coordinator;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod coordinator;
mod dispatch;
pub mod filter;
mod ledger;
mod metrics;
mod operator;
mod policy_store;
mod registry;
mod resolver;

pub use coordinator::{
    DropReason, EnforcementCoordinator, EnforcementReport, Outcome, PendingRequest, REJECT_REASON,
    Stage, compose_notice,
};
pub use dispatch::{EventDispatcher, EventRouter, TransportFactory};
pub use filter::{Eligibility, RejectReason};
pub use ledger::FileLedger;
pub use metrics::{MetricsSnapshot, WardenMetrics};
pub use operator::{OperatorCommand, OperatorConsole};
pub use policy_store::PolicyStore;
pub use registry::{IdentityStatus, PeerHandle, PeerRegistry};
pub use resolver::{HomeGroup, MembershipResolver};
