//! Violation ledger error types.

/// Kinds of ledger errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum LedgerErrorKind {
    /// Failed to open the ledger file
    #[display("Failed to open ledger: {}", _0)]
    Open(String),
    /// Failed to append a line
    #[display("Failed to append ledger entry: {}", _0)]
    Write(String),
    /// Failed to read the ledger back
    #[display("Failed to read ledger: {}", _0)]
    Read(String),
    /// A stored line does not match the ledger format
    #[display("Malformed ledger line: {}", _0)]
    Malformed(String),
}

/// Ledger error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Ledger Error: {} at line {} in {}", kind, line, file)]
pub struct LedgerError {
    /// The kind of error that occurred
    pub kind: LedgerErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl LedgerError {
    /// Create a new ledger error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: LedgerErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
