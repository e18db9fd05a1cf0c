//! Errors about configured identities that are not currently connected.

/// Identity error variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum IdentityErrorKind {
    /// A configured role has no live peer in the registry.
    #[display("{} identity '{}' is not connected", role, peer)]
    Unreachable {
        /// Logical role name ("detector" or "enforcer")
        role: String,
        /// Configured peer identifier
        peer: String,
    },
}

/// Identity error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Identity Error: {} at line {} in {}", kind, line, file)]
pub struct IdentityError {
    /// The error kind
    pub kind: IdentityErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl IdentityError {
    /// Create a new IdentityError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: IdentityErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for [`IdentityErrorKind::Unreachable`].
    #[track_caller]
    pub fn unreachable(role: impl Into<String>, peer: impl Into<String>) -> Self {
        Self::new(IdentityErrorKind::Unreachable {
            role: role.into(),
            peer: peer.into(),
        })
    }
}
