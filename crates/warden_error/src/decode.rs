//! Wire message decoding errors.

/// Reasons a detection message failed to decode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum DecodeErrorKind {
    /// The first segment is not the exact sentinel token.
    #[display("Missing sentinel, first segment was '{}'", _0)]
    MissingSentinel(String),
    /// A segment has no `": "` separator.
    #[display("Malformed segment: '{}'", _0)]
    MalformedSegment(String),
    /// The same key appeared twice.
    #[display("Duplicate key: {}", _0)]
    DuplicateKey(String),
    /// A required key is absent.
    #[display("Missing required key: {}", _0)]
    MissingKey(&'static str),
    /// An integer key holds a non-integer value.
    #[display("Key {} is not an integer: '{}'", key, value)]
    InvalidInteger {
        /// Offending key
        key: &'static str,
        /// Raw value
        value: String,
    },
    /// The time key does not match the canonical timestamp format.
    #[display("Invalid timestamp: '{}'", _0)]
    InvalidTimestamp(String),
}

/// Decode failure with location tracking.
///
/// # Examples
///
/// ```
/// use warden_error::{DecodeError, DecodeErrorKind};
///
/// let err = DecodeError::new(DecodeErrorKind::MissingKey("User"));
/// assert!(format!("{}", err).contains("User"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Decode Error: {} at line {} in {}", kind, line, file)]
pub struct DecodeError {
    /// The kind of error that occurred
    pub kind: DecodeErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl DecodeError {
    /// Create a new decode error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: DecodeErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &DecodeErrorKind {
        &self.kind
    }
}
