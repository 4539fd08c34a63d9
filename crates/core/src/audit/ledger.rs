//! Server-side durable audit ledger.
//!
//! The store behind the remote audit endpoint: an append-only JSON-lines
//! file where each accepted record is stamped with a generated audit id and
//! the time it was received. The id is returned to the submitting client so
//! its fallback log can mark the record as reconciled.

use super::{AuditError, AuditId, AuditRecord};
use chrono::{DateTime, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One accepted record with its server-assigned identity.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub audit_id: AuditId,
    pub received_at: DateTime<Utc>,
    #[serde(flatten)]
    pub record: AuditRecord,
}

#[derive(Debug, Clone)]
pub struct AuditLedger {
    path: PathBuf,
}

impl AuditLedger {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record and return its assigned audit id.
    pub fn append(&self, record: AuditRecord) -> Result<AuditId, AuditError> {
        let entry = LedgerEntry {
            audit_id: Uuid::new_v4(),
            received_at: Utc::now(),
            record,
        };

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

        let line = serde_json::to_string(&entry).map_err(AuditError::Encode)?;
        writeln!(file, "{line}").map_err(AuditError::Append)?;

        Ok(entry.audit_id)
    }

    /// All entries in append order. A missing file is an empty ledger.
    pub fn list(&self) -> Result<Vec<LedgerEntry>, AuditError> {
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
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(drug: &str) -> AuditRecord {
        AuditRecord {
            patient_id: 100,
            patient_year: 2025,
            patient_name: "Jane Doe".into(),
            drug_name: drug.into(),
            instruction_text: "1 tab TDS".into(),
            printed_by: "Sara Adel".into(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn append_assigns_distinct_ids_and_preserves_order() {
        let temp = tempfile::TempDir::new().unwrap();
        let ledger = AuditLedger::new(temp.path().join("ledger.jsonl"));

        let a = ledger.append(record("Panadol")).unwrap();
        let b = ledger.append(record("Zyrtec")).unwrap();
        assert_ne!(a, b);

        let entries = ledger.list().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].audit_id, a);
        assert_eq!(entries[0].record.drug_name, "Panadol");
        assert_eq!(entries[1].record.drug_name, "Zyrtec");
    }

    #[test]
    fn missing_file_lists_as_empty() {
        let temp = tempfile::TempDir::new().unwrap();
        let ledger = AuditLedger::new(temp.path().join("ledger.jsonl"));
        assert!(ledger.list().unwrap().is_empty());
    }
}
