//! Invite warden service assembly.
//!
//! Wires the moderation pipeline to the OneBot adapter and exposes the event
//! webhook used by the `warden` binary.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod api;
mod service;

pub use api::{ApiState, SELF_ID_HEADER, create_router};
pub use service::Warden;
