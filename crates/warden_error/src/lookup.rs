//! Membership and role lookup errors.

/// Kinds of membership lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum LookupErrorKind {
    /// The user is not a member of any watched group.
    #[display("User {} not found in any watched group", _0)]
    NotFound(i64),
    /// Member information could not be fetched.
    #[display("Member info unavailable for user {} in group {}: {}", user_id, group_id, reason)]
    MemberUnavailable {
        /// Group probed
        group_id: i64,
        /// User probed
        user_id: i64,
        /// Underlying reason
        reason: String,
    },
}

/// Lookup error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Lookup Error: {} at line {} in {}", kind, line, file)]
pub struct LookupError {
    /// The kind of error that occurred
    pub kind: LookupErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl LookupError {
    /// Create a new lookup error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: LookupErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
