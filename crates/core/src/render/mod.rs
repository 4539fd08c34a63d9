//! Label document construction and the render surface seam.
//!
//! Building the documents is a pure function of the print-session snapshot:
//! one document per `(line, copy)` pair, so a session with `n` lines and
//! quantity `q` yields exactly `n × q` documents. Handing the documents to a
//! [`LabelSurface`] is the only fallible step; a surface failure aborts the
//! pipeline before any audit write so no orphaned audit records are created.

pub mod pdf;

use crate::session::PrintSession;
use chrono::Utc;

/// Physical label width. Labels are fixed-size adhesive stock.
pub const LABEL_WIDTH_MM: f32 = 40.0;

/// Physical label height.
pub const LABEL_HEIGHT_MM: f32 = 25.0;

/// Reading direction of the instruction block.
///
/// Dosing instructions are written for right-to-left script; the direction
/// travels with the document so every surface lays the block out the same
/// way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TextDirection {
    LeftToRight,
    RightToLeft,
}

/// Everything printed on one physical label.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LabelDocument {
    pub full_id: String,
    pub patient_name: String,
    pub drug_name: String,
    pub instruction_text: String,
    pub instruction_direction: TextDirection,
    /// Expiry in display form, e.g. `03/2026` for the stored `03/26`.
    pub expiry_display: String,
    pub attribution: String,
    /// Print date in `DD/MM/YYYY` form.
    pub printed_on: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("label surface unavailable: {0}")]
    SurfaceUnavailable(String),
    #[error("failed to write rendered labels: {0}")]
    Io(#[from] std::io::Error),
}

/// Destination for rendered label documents.
///
/// Implementations produce hard copy or a file at the fixed physical label
/// dimensions; failure to acquire the surface is reported back to the
/// pipeline as a render-abort.
pub trait LabelSurface {
    fn render(&self, documents: &[LabelDocument]) -> Result<(), RenderError>;
}

/// Build the label documents for a print session.
///
/// Documents are emitted line by line in basket order, with all copies of a
/// line adjacent, so stacks of identical labels come off the printer
/// together.
pub fn build_documents(session: &PrintSession, attribution: &str) -> Vec<LabelDocument> {
    let printed_on = Utc::now().format("%d/%m/%Y").to_string();
    let mut documents = Vec::with_capacity(session.label_count());

    for line in &session.lines {
        let expiry_display = line
            .expiry_date()
            .map(|date| date.display())
            .unwrap_or_default();

        for _ in 0..session.quantity {
            documents.push(LabelDocument {
                full_id: session.patient.full_id(),
                patient_name: session.patient.patient_name.clone(),
                drug_name: line.drug_name.to_string(),
                instruction_text: line.instruction_text.clone(),
                instruction_direction: TextDirection::RightToLeft,
                expiry_display: expiry_display.clone(),
                attribution: attribution.to_string(),
                printed_on: printed_on.clone(),
            });
        }
    }

    documents
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Operator;
    use crate::basket::BasketStore;
    use crate::session::{PatientSelection, SessionId};
    use medilabel_types::{ExpiryMonth, ExpiryYear};

    fn session(quantity: u32) -> PrintSession {
        let mut basket = BasketStore::new();
        let a = basket.add("Panadol", "1 tab TDS").unwrap();
        let b = basket.add("Zyrtec", "1 tab ON").unwrap();
        basket
            .set_expiry_month(a, Some(ExpiryMonth::new(3).unwrap()))
            .unwrap();
        basket
            .set_expiry_year(a, Some(ExpiryYear::new(26).unwrap()))
            .unwrap();
        basket
            .set_expiry_month(b, Some(ExpiryMonth::new(11).unwrap()))
            .unwrap();
        basket
            .set_expiry_year(b, Some(ExpiryYear::new(27).unwrap()))
            .unwrap();

        PrintSession {
            session_id: SessionId::generate(),
            quantity,
            lines: basket.snapshot(),
            patient: PatientSelection {
                patient_id: 100,
                year: 2025,
                patient_name: "Jane Doe".into(),
                national_id: "29805120101234".into(),
            },
            operator: Operator {
                user_id: 1,
                username: "sara".into(),
                full_name: "Sara Adel".into(),
                access_level: "dispenser".into(),
            },
            started_at: Utc::now(),
        }
    }

    #[test]
    fn builds_one_document_per_line_and_copy() {
        let documents = build_documents(&session(3), "Dr Mahmoud");
        assert_eq!(documents.len(), 6);

        // copies of the same line are adjacent
        assert_eq!(documents[0].drug_name, "Panadol");
        assert_eq!(documents[2].drug_name, "Panadol");
        assert_eq!(documents[3].drug_name, "Zyrtec");
    }

    #[test]
    fn expiry_is_expanded_to_a_four_digit_year() {
        let documents = build_documents(&session(1), "Dr Mahmoud");
        assert_eq!(documents[0].expiry_display, "03/2026");
        assert_eq!(documents[1].expiry_display, "11/2027");
    }

    #[test]
    fn documents_carry_patient_and_attribution_fields() {
        let documents = build_documents(&session(1), "Dr Mahmoud");
        let doc = &documents[0];

        assert_eq!(doc.full_id, "100/2025");
        assert_eq!(doc.patient_name, "Jane Doe");
        assert_eq!(doc.attribution, "Dr Mahmoud");
        assert_eq!(doc.instruction_direction, TextDirection::RightToLeft);
        // DD/MM/YYYY
        assert_eq!(doc.printed_on.len(), 10);
        assert_eq!(&doc.printed_on[2..3], "/");
        assert_eq!(&doc.printed_on[5..6], "/");
    }
}
