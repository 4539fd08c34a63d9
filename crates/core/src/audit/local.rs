//! Client-resident fallback audit log.
//!
//! An append-only JSON-lines file keyed by `{session_id}-{line_index}`. It
//! is always written after a print session, whether or not the remote sink
//! accepted the records, and is the source a later reconciliation pass reads
//! to find records without a confirmed remote id. Supported operations are
//! append, listing and clearing in full.

use super::{AuditError, FallbackLog, LocalAuditEntry};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalAuditLog {
    path: PathBuf,
}

impl LocalAuditLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a batch of entries, creating the file and its parent
    /// directory on first use.
    pub fn append(&self, entries: &[LocalAuditEntry]) -> Result<(), AuditError> {
        if entries.is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(AuditError::Append)?;
            }
        }

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(AuditError::Append)?;

        for entry in entries {
            let line = serde_json::to_string(entry).map_err(AuditError::Encode)?;
            writeln!(file, "{line}").map_err(AuditError::Append)?;
        }

        Ok(())
    }

    /// All entries in append order. A missing file is an empty log.
    pub fn list(&self) -> Result<Vec<LocalAuditEntry>, AuditError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let contents = std::fs::read_to_string(&self.path).map_err(AuditError::Read)?;
        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(AuditError::Malformed))
            .collect()
    }

    /// Entries whose remote write was never confirmed.
    pub fn unreconciled(&self) -> Result<Vec<LocalAuditEntry>, AuditError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|entry| entry.remote_audit_id.is_none())
            .collect())
    }

    /// Remove the whole log. Clearing an absent log is a no-op.
    pub fn clear(&self) -> Result<(), AuditError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).map_err(AuditError::Append)?;
        }
        Ok(())
    }
}

impl FallbackLog for LocalAuditLog {
    fn append(&self, entries: &[LocalAuditEntry]) -> Result<(), AuditError> {
        LocalAuditLog::append(self, entries)
    }
}
