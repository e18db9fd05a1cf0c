//! Error types for the invite warden.
//!
//! This crate provides the foundation error types used throughout the warden workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! The top-level [`WardenError`] mirrors the moderation taxonomy:
//! configuration problems, membership lookups, wire decoding, transport calls,
//! unreachable identities and ledger writes.
//!
//! # Examples
//!
//! ```
//! use warden_error::{TransportError, TransportErrorKind, WardenResult};
//!
//! fn kick() -> WardenResult<()> {
//!     Err(TransportError::new(TransportErrorKind::Http("connection refused".into())))?
//! }
//!
//! assert!(kick().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod decode;
mod error;
mod identity;
mod ledger;
mod lookup;
mod transport;

pub use config::ConfigError;
pub use decode::{DecodeError, DecodeErrorKind};
pub use error::{WardenError, WardenErrorKind, WardenResult};
pub use identity::{IdentityError, IdentityErrorKind};
pub use ledger::{LedgerError, LedgerErrorKind};
pub use lookup::{LookupError, LookupErrorKind};
pub use transport::{TransportError, TransportErrorKind};
