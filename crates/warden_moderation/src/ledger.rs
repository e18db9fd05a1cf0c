//! File-backed violation ledger.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, instrument};
use warden_core::LedgerEntry;
use warden_error::{LedgerError, LedgerErrorKind};
use warden_interface::LedgerSink;

/// Appends one tab-separated line per enforcement to a text file.
///
/// Appends from concurrent handlers are serialized so lines never interleave.
#[derive(Debug)]
pub struct FileLedger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileLedger {
    /// Ledger writing to `path`; the file is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Ledger file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Up to `limit` most recent entries, oldest first.
    ///
    /// A missing file is an empty ledger. Lines that do not parse are skipped.
    pub async fn read_recent(&self, limit: usize) -> Result<Vec<LedgerEntry>, LedgerError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(LedgerError::new(LedgerErrorKind::Read(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                ))));
            }
        };

        let mut entries: Vec<LedgerEntry> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match LedgerEntry::parse_line(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!(error = %e, "Skipping unreadable ledger line");
                    None
                }
            })
            .collect();
        let skip = entries.len().saturating_sub(limit);
        Ok(entries.split_off(skip))
    }
}

#[async_trait]
impl LedgerSink for FileLedger {
    #[instrument(
        skip(self, entry),
        fields(path = %self.path.display(), user = %entry.user_id(), group = %entry.group_id())
    )]
    async fn append(&self, entry: &LedgerEntry) -> Result<(), LedgerError> {
        let line = format!("{}\n", entry.to_line());
        let _guard = self.write_lock.lock().await;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                LedgerError::new(LedgerErrorKind::Open(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )))
            })?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| LedgerError::new(LedgerErrorKind::Write(e.to_string())))?;
        file.flush()
            .await
            .map_err(|e| LedgerError::new(LedgerErrorKind::Write(e.to_string())))?;

        debug!("Ledger entry appended");
        Ok(())
    }
}
