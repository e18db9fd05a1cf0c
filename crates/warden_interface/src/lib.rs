//! Trait definitions for the invite warden.
//!
//! The moderation pipeline only ever talks to the outside world through the
//! traits in this crate:
//! - [`GroupTransport`] - actions a connected bot peer can perform
//! - [`LedgerSink`] - the append-only audit trail

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::{GroupTransport, LedgerSink};
