//! Top-level error wrapper types.

use crate::{ConfigError, DecodeError, IdentityError, LedgerError, LookupError, TransportError};

/// Every failure the moderation pipeline can surface.
///
/// # Examples
///
/// ```
/// use warden_error::{ConfigError, WardenError};
///
/// let err: WardenError = ConfigError::new("missing detector_identity").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum WardenErrorKind {
    /// Configuration missing, unreadable or incomplete
    #[from(ConfigError)]
    Config(ConfigError),
    /// Membership or role resolution failed
    #[from(LookupError)]
    Lookup(LookupError),
    /// Malformed wire message
    #[from(DecodeError)]
    Decode(DecodeError),
    /// A send/kick/reject/info call failed
    #[from(TransportError)]
    Transport(TransportError),
    /// A configured identity is not connected
    #[from(IdentityError)]
    Identity(IdentityError),
    /// Ledger write or read failed
    #[from(LedgerError)]
    Ledger(LedgerError),
}

/// Warden error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Warden Error: {}", _0)]
pub struct WardenError(Box<WardenErrorKind>);

impl WardenError {
    /// Create a new error from a kind.
    pub fn new(kind: WardenErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &WardenErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to WardenErrorKind
impl<T> From<T> for WardenError
where
    T: Into<WardenErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for warden operations.
pub type WardenResult<T> = std::result::Result<T, WardenError>;
