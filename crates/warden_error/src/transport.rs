//! Group transport errors.

/// Error kinds for calls made against a connected bot peer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum TransportErrorKind {
    /// HTTP request failed
    #[display("HTTP request failed: {}", _0)]
    Http(String),

    /// The peer answered with a failed status
    #[display("Action '{}' failed with retcode {}: {}", action, retcode, message)]
    Api {
        /// Action name
        action: String,
        /// Peer return code
        retcode: i64,
        /// Peer message, possibly empty
        message: String,
    },

    /// Failed to deserialize response
    #[display("Failed to deserialize response: {}", _0)]
    Deserialization(String),

    /// Peer-side refusal not tied to a single action (mock peers, closed peers)
    #[display("Peer rejected call: {}", _0)]
    Rejected(String),
}

/// Transport error with location tracking.
///
/// # Examples
///
/// ```
/// use warden_error::{TransportError, TransportErrorKind};
///
/// let err = TransportError::new(TransportErrorKind::Rejected("kick".into()));
/// assert!(format!("{}", err).contains("kick"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Transport Error: {} at line {} in {}", kind, line, file)]
pub struct TransportError {
    /// The error kind
    pub kind: TransportErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl TransportError {
    /// Create a new TransportError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TransportErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
