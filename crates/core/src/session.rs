//! Session context and print-session snapshot.
//!
//! The client-resident state (current operator, current patient) is an
//! explicit [`SessionContext`] passed into the print pipeline rather than
//! ambient globals, so the pipeline can be exercised in isolation. A
//! [`PrintSession`] is the frozen view of one print invocation: it exists
//! only for the duration of render plus audit reconciliation and is not
//! persisted beyond the local audit entries it produces.

use crate::auth::Operator;
use crate::basket::BasketLine;
use crate::directory::PatientRecord;
use chrono::{DateTime, Utc};

/// The active patient context for the session.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PatientSelection {
    pub patient_id: u32,
    pub year: u16,
    pub patient_name: String,
    pub national_id: String,
}

impl PatientSelection {
    /// The identifier printed on labels, e.g. `100/2025`.
    pub fn full_id(&self) -> String {
        format!("{}/{}", self.patient_id, self.year)
    }
}

impl From<&PatientRecord> for PatientSelection {
    fn from(record: &PatientRecord) -> Self {
        Self {
            patient_id: record.patient_id,
            year: record.year,
            patient_name: record.patient_name.clone(),
            national_id: record.national_id.clone(),
        }
    }
}

/// Client-resident state: who is operating, and for which patient.
///
/// Exactly one patient selection is active at a time; selecting a new
/// patient replaces the previous one. Signing out drops both.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct SessionContext {
    pub operator: Option<Operator>,
    pub patient: Option<PatientSelection>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&mut self, operator: Operator) {
        self.operator = Some(operator);
    }

    pub fn sign_out(&mut self) {
        self.operator = None;
        self.patient = None;
    }

    pub fn select_patient(&mut self, patient: PatientSelection) {
        self.patient = Some(patient);
    }

    pub fn clear_patient(&mut self) {
        self.patient = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.operator.is_some()
    }

    pub fn has_patient(&self) -> bool {
        self.patient.is_some()
    }
}

/// Time-derived identifier for one print invocation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Generate an id from the current wall clock, in milliseconds.
    pub fn generate() -> Self {
        Self(Utc::now().timestamp_millis().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The frozen state of one print invocation.
#[derive(Debug, Clone)]
pub struct PrintSession {
    pub session_id: SessionId,
    pub quantity: u32,
    pub lines: Vec<BasketLine>,
    pub patient: PatientSelection,
    pub operator: Operator,
    pub started_at: DateTime<Utc>,
}

impl PrintSession {
    /// Total number of labels this session will render.
    pub fn label_count(&self) -> usize {
        self.lines.len() * self.quantity as usize
    }
}
