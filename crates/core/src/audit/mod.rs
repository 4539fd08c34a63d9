//! Audit records and the dual-sink seam.
//!
//! Every printed basket line produces exactly one audit intent. The intent
//! ends up durable in the remote sink, the local fallback log, or both,
//! never in neither. The remote side is best-effort; the local side is
//! unconditional. [`policy::AuditWritePolicy`] owns that reconciliation.

pub mod ledger;
pub mod local;
pub mod policy;
pub mod remote;

use crate::basket::BasketLine;
use crate::session::PrintSession;
use chrono::{DateTime, Utc};
use std::future::Future;
use uuid::Uuid;

/// Identifier assigned by a durable sink when it accepts a record.
pub type AuditId = Uuid;

/// The logical statement "this medication was printed for this patient by
/// this user at this time". Wire form is camelCase JSON.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub patient_id: u32,
    pub patient_year: u16,
    pub patient_name: String,
    pub drug_name: String,
    pub instruction_text: String,
    pub printed_by: String,
    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    /// Build the audit intent for one basket line of a print session.
    pub fn for_line(session: &PrintSession, line: &BasketLine) -> Self {
        Self {
            patient_id: session.patient.patient_id,
            patient_year: session.patient.year,
            patient_name: session.patient.patient_name.clone(),
            drug_name: line.drug_name.to_string(),
            instruction_text: line.instruction_text.clone(),
            printed_by: session.operator.full_name.clone(),
            timestamp: session.started_at,
        }
    }
}

/// One row of the client-resident fallback log.
///
/// Carries the full record plus the session context the remote wire format
/// omits, and, when the matching remote write was confirmed, the remote
/// audit id, so a reconciliation job can ask which local records still lack
/// one.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalAuditEntry {
    /// Log key, `{session_id}-{line_index}`.
    pub id: String,
    pub print_session_id: String,
    pub line_index: usize,
    pub print_quantity: u32,
    pub status: String,
    pub expiry_date: Option<String>,
    pub remote_audit_id: Option<AuditId>,
    #[serde(flatten)]
    pub record: AuditRecord,
}

impl LocalAuditEntry {
    /// Build the fallback entry for one line of a print session.
    pub fn for_line(
        session: &PrintSession,
        line_index: usize,
        line: &BasketLine,
        remote_audit_id: Option<AuditId>,
    ) -> Self {
        let session_id = session.session_id.to_string();
        Self {
            id: format!("{session_id}-{line_index}"),
            print_session_id: session_id,
            line_index,
            print_quantity: session.quantity,
            status: "printed".to_string(),
            expiry_date: line.expiry_date().map(|date| date.short()),
            remote_audit_id,
            record: AuditRecord::for_line(session, line),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit sink request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("audit sink rejected the record: {0}")]
    Rejected(String),
    #[error("failed to append to audit log: {0}")]
    Append(std::io::Error),
    #[error("failed to read audit log: {0}")]
    Read(std::io::Error),
    #[error("failed to encode audit entry: {0}")]
    Encode(serde_json::Error),
    #[error("malformed audit log entry: {0}")]
    Malformed(serde_json::Error),
}

/// A remote, possibly unreachable, durable audit store.
///
/// `probe` is a lightweight connectivity check issued once per print session
/// to decide the write strategy; `record` submits one audit intent.
pub trait AuditSink {
    fn probe(&self) -> impl Future<Output = Result<(), AuditError>> + Send;
    fn record(&self, record: &AuditRecord)
        -> impl Future<Output = Result<AuditId, AuditError>> + Send;
}

/// A client-resident durable log used as the unconditional audit backstop.
pub trait FallbackLog {
    fn append(&self, entries: &[LocalAuditEntry]) -> Result<(), AuditError>;
}
