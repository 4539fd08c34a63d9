//! The basket-to-label print pipeline.
//!
//! One `execute` call is one print session. All business-rule checks run
//! before any side effect; once rendering has happened the physical print is
//! irreversible, so everything after it (audit write-through and basket
//! clear) completes regardless of partial audit failure and is never
//! surfaced to the operator as a pipeline failure.
//!
//! Session phases: `Idle → Validating → Rendering → AuditingRemote
//! (optional) → AuditingLocal → Clearing → Done`, with aborts to `Failed`
//! only from validation and from render-surface acquisition.

use crate::audit::policy::{AuditOutcome, AuditWritePolicy};
use crate::audit::{AuditSink, FallbackLog};
use crate::basket::BasketStore;
use crate::render::{build_documents, LabelSurface, RenderError};
use crate::session::{PrintSession, SessionContext, SessionId};
use chrono::Utc;

#[derive(Debug, thiserror::Error)]
pub enum PrintError {
    #[error("no patient selected")]
    NoPatientSelected,
    #[error("basket empty")]
    EmptyBasket,
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("missing expiry dates for: {}", drug_names.join(", "))]
    MissingExpiryDates { drug_names: Vec<String> },
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Where a print session is in its lifecycle; used for progress logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Validating,
    Rendering,
    AuditingRemote,
    AuditingLocal,
    Clearing,
    Done,
    Failed,
}

/// What one successful print session produced.
#[derive(Debug, Clone)]
pub struct PrintOutcome {
    pub session_id: String,
    pub labels_rendered: usize,
    pub audit: AuditOutcome,
}

/// Orchestrates validate, render, audit write-through and basket clear.
pub struct PrintPipeline<R, L, S> {
    policy: AuditWritePolicy<R, L>,
    surface: S,
    attribution: String,
}

impl<R: AuditSink, L: FallbackLog, S: LabelSurface> PrintPipeline<R, L, S> {
    pub fn new(
        policy: AuditWritePolicy<R, L>,
        surface: S,
        attribution: impl Into<String>,
    ) -> Self {
        Self {
            policy,
            surface,
            attribution: attribution.into(),
        }
    }

    /// Run one print session for the current basket.
    ///
    /// `quantity` is the number of label copies per basket line. On success
    /// the basket is empty; audit failures are reflected in the outcome but
    /// do not fail the call. On any error the basket is untouched and no
    /// audit record has been written.
    pub async fn execute(
        &self,
        ctx: &SessionContext,
        basket: &mut BasketStore,
        quantity: u32,
    ) -> Result<PrintOutcome, PrintError> {
        tracing::debug!(phase = ?SessionPhase::Validating, "print session starting");

        let patient = ctx.patient.clone().ok_or(PrintError::NoPatientSelected)?;

        if basket.is_empty() {
            return Err(PrintError::EmptyBasket);
        }

        let drug_names: Vec<String> = basket
            .lines()
            .iter()
            .filter(|line| line.expiry_date().is_none())
            .map(|line| line.drug_name.to_string())
            .collect();
        if !drug_names.is_empty() {
            return Err(PrintError::MissingExpiryDates { drug_names });
        }

        let operator = ctx.operator.clone().ok_or(PrintError::NotAuthenticated)?;

        if quantity == 0 {
            return Err(PrintError::InvalidQuantity);
        }

        let session = PrintSession {
            session_id: SessionId::generate(),
            quantity,
            lines: basket.snapshot(),
            patient,
            operator,
            started_at: Utc::now(),
        };

        tracing::info!(
            session_id = %session.session_id,
            lines = session.lines.len(),
            quantity,
            patient = %session.patient.full_id(),
            "printing labels"
        );

        tracing::debug!(phase = ?SessionPhase::Rendering, labels = session.label_count());
        let documents = build_documents(&session, &self.attribution);
        if let Err(error) = self.surface.render(&documents) {
            // Render aborted: no audit record exists and the basket is
            // untouched; the session ends in Failed.
            tracing::error!(phase = ?SessionPhase::Failed, %error, "label render aborted");
            return Err(error.into());
        }

        tracing::debug!(phase = ?SessionPhase::AuditingRemote, intents = session.lines.len());
        let audit = self.policy.record_session(&session).await;
        if audit.remote_failed > 0 || audit.locally_written < audit.intents {
            tracing::warn!(
                session_id = %audit.session_id,
                remote_failed = audit.remote_failed,
                locally_written = audit.locally_written,
                "audit reconciliation incomplete; see fallback log"
            );
        }

        tracing::debug!(phase = ?SessionPhase::Clearing);
        basket.clear();

        tracing::info!(
            phase = ?SessionPhase::Done,
            session_id = %session.session_id,
            labels = documents.len(),
            "print session complete"
        );

        Ok(PrintOutcome {
            session_id: session.session_id.to_string(),
            labels_rendered: documents.len(),
            audit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditError, AuditId, AuditRecord, LocalAuditEntry};
    use crate::auth::Operator;
    use crate::render::LabelDocument;
    use crate::session::PatientSelection;
    use medilabel_types::{ExpiryMonth, ExpiryYear};
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use uuid::Uuid;

    #[derive(Clone, Default)]
    struct StubSink {
        probe_fails: bool,
        failing_drugs: HashSet<String>,
        written: Arc<Mutex<Vec<AuditRecord>>>,
    }

    impl AuditSink for StubSink {
        async fn probe(&self) -> Result<(), AuditError> {
            if self.probe_fails {
                return Err(AuditError::Rejected("probe refused".into()));
            }
            Ok(())
        }

        async fn record(&self, record: &AuditRecord) -> Result<AuditId, AuditError> {
            if self.failing_drugs.contains(&record.drug_name) {
                return Err(AuditError::Rejected("write refused".into()));
            }
            self.written.lock().unwrap().push(record.clone());
            Ok(Uuid::new_v4())
        }
    }

    #[derive(Clone, Default)]
    struct MemoryLog {
        entries: Arc<Mutex<Vec<LocalAuditEntry>>>,
    }

    impl FallbackLog for MemoryLog {
        fn append(&self, entries: &[LocalAuditEntry]) -> Result<(), AuditError> {
            self.entries.lock().unwrap().extend_from_slice(entries);
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct StubSurface {
        fails: bool,
        rendered: Arc<Mutex<Vec<LabelDocument>>>,
    }

    impl LabelSurface for StubSurface {
        fn render(&self, documents: &[LabelDocument]) -> Result<(), RenderError> {
            if self.fails {
                return Err(RenderError::SurfaceUnavailable("popup blocked".into()));
            }
            self.rendered.lock().unwrap().extend_from_slice(documents);
            Ok(())
        }
    }

    struct Harness {
        sink: StubSink,
        log: MemoryLog,
        surface: StubSurface,
        pipeline: PrintPipeline<StubSink, MemoryLog, StubSurface>,
    }

    fn harness(sink: StubSink, surface: StubSurface) -> Harness {
        let log = MemoryLog::default();
        let policy = AuditWritePolicy::new(
            Some(sink.clone()),
            log.clone(),
            Duration::from_millis(200),
        );
        let pipeline = PrintPipeline::new(policy, surface.clone(), "Dr Mahmoud");
        Harness {
            sink,
            log,
            surface,
            pipeline,
        }
    }

    fn context() -> SessionContext {
        SessionContext {
            operator: Some(Operator {
                user_id: 1,
                username: "sara".into(),
                full_name: "Sara Adel".into(),
                access_level: "dispenser".into(),
            }),
            patient: Some(PatientSelection {
                patient_id: 100,
                year: 2025,
                patient_name: "Jane Doe".into(),
                national_id: "29805120101234".into(),
            }),
        }
    }

    fn basket_with(drugs: &[(&str, bool)]) -> BasketStore {
        let mut basket = BasketStore::new();
        for (drug, with_expiry) in drugs {
            let id = basket.add(drug, "1 tab TDS").unwrap();
            if *with_expiry {
                basket
                    .set_expiry_month(id, Some(ExpiryMonth::new(3).unwrap()))
                    .unwrap();
                basket
                    .set_expiry_year(id, Some(ExpiryYear::new(26).unwrap()))
                    .unwrap();
            }
        }
        basket
    }

    #[tokio::test]
    async fn panadol_scenario_renders_copies_audits_once_and_clears() {
        let h = harness(StubSink::default(), StubSurface::default());
        let mut basket = basket_with(&[("Panadol", true)]);

        let outcome = h.pipeline.execute(&context(), &mut basket, 2).await.unwrap();

        // 1 line x 2 copies rendered, both showing the expanded expiry
        let rendered = h.surface.rendered.lock().unwrap();
        assert_eq!(rendered.len(), 2);
        assert!(rendered.iter().all(|d| d.expiry_display == "03/2026"));

        // exactly one audit intent, in both sinks
        assert_eq!(outcome.audit.intents, 1);
        assert_eq!(h.sink.written.lock().unwrap().len(), 1);
        assert_eq!(h.log.entries.lock().unwrap().len(), 1);

        assert!(basket.is_empty());
        assert_eq!(outcome.labels_rendered, 2);
    }

    #[tokio::test]
    async fn renders_n_times_q_labels_but_only_n_audit_intents() {
        let h = harness(StubSink::default(), StubSurface::default());
        let mut basket = basket_with(&[("Panadol", true), ("Zyrtec", true), ("Augmentin", true)]);

        let outcome = h.pipeline.execute(&context(), &mut basket, 4).await.unwrap();

        assert_eq!(outcome.labels_rendered, 12);
        assert_eq!(h.surface.rendered.lock().unwrap().len(), 12);
        assert_eq!(outcome.audit.intents, 3);
        assert_eq!(h.sink.written.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn missing_expiry_names_the_offending_drugs_and_changes_nothing() {
        let h = harness(StubSink::default(), StubSurface::default());
        let mut basket = basket_with(&[("Panadol", true), ("Zyrtec", false), ("Augmentin", false)]);

        let error = h
            .pipeline
            .execute(&context(), &mut basket, 1)
            .await
            .unwrap_err();

        match error {
            PrintError::MissingExpiryDates { drug_names } => {
                assert_eq!(drug_names, vec!["Zyrtec", "Augmentin"]);
            }
            other => panic!("expected MissingExpiryDates, got {other:?}"),
        }

        // no render, no audit, basket unchanged
        assert!(h.surface.rendered.lock().unwrap().is_empty());
        assert!(h.sink.written.lock().unwrap().is_empty());
        assert!(h.log.entries.lock().unwrap().is_empty());
        assert_eq!(basket.len(), 3);
    }

    #[tokio::test]
    async fn empty_basket_fails_before_any_side_effect() {
        let h = harness(StubSink::default(), StubSurface::default());
        let mut basket = BasketStore::new();

        let error = h
            .pipeline
            .execute(&context(), &mut basket, 1)
            .await
            .unwrap_err();

        assert!(matches!(error, PrintError::EmptyBasket));
        assert!(h.surface.rendered.lock().unwrap().is_empty());
        assert!(h.log.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_patient_selection_blocks_the_session() {
        let h = harness(StubSink::default(), StubSurface::default());
        let mut ctx = context();
        ctx.patient = None;
        let mut basket = basket_with(&[("Panadol", true)]);

        let error = h.pipeline.execute(&ctx, &mut basket, 1).await.unwrap_err();

        assert!(matches!(error, PrintError::NoPatientSelected));
        assert_eq!(basket.len(), 1);
    }

    #[tokio::test]
    async fn missing_operator_blocks_the_session() {
        let h = harness(StubSink::default(), StubSurface::default());
        let mut ctx = context();
        ctx.operator = None;
        let mut basket = basket_with(&[("Panadol", true)]);

        let error = h.pipeline.execute(&ctx, &mut basket, 1).await.unwrap_err();

        assert!(matches!(error, PrintError::NotAuthenticated));
        assert!(h.surface.rendered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected() {
        let h = harness(StubSink::default(), StubSurface::default());
        let mut basket = basket_with(&[("Panadol", true)]);

        let error = h
            .pipeline
            .execute(&context(), &mut basket, 0)
            .await
            .unwrap_err();

        assert!(matches!(error, PrintError::InvalidQuantity));
        assert_eq!(basket.len(), 1);
    }

    #[tokio::test]
    async fn render_abort_leaves_no_audit_and_keeps_the_basket() {
        let h = harness(
            StubSink::default(),
            StubSurface {
                fails: true,
                ..Default::default()
            },
        );
        let mut basket = basket_with(&[("Panadol", true)]);

        let error = h
            .pipeline
            .execute(&context(), &mut basket, 1)
            .await
            .unwrap_err();

        assert!(matches!(error, PrintError::Render(_)));
        assert!(h.sink.written.lock().unwrap().is_empty());
        assert!(h.log.entries.lock().unwrap().is_empty());
        assert_eq!(basket.len(), 1);
    }

    #[tokio::test]
    async fn remote_probe_failure_still_reports_success_with_local_audit() {
        let h = harness(
            StubSink {
                probe_fails: true,
                ..Default::default()
            },
            StubSurface::default(),
        );
        let mut basket = basket_with(&[("Panadol", true), ("Zyrtec", true)]);

        let outcome = h.pipeline.execute(&context(), &mut basket, 1).await.unwrap();

        assert!(!outcome.audit.remote_attempted);
        assert!(h.sink.written.lock().unwrap().is_empty());
        assert_eq!(outcome.audit.locally_written, 2);
        assert!(basket.is_empty());
    }

    #[tokio::test]
    async fn partial_remote_failures_do_not_fail_the_pipeline_or_skip_the_clear() {
        let h = harness(
            StubSink {
                failing_drugs: ["Panadol".to_string(), "Zyrtec".to_string()].into(),
                ..Default::default()
            },
            StubSurface::default(),
        );
        let mut basket = basket_with(&[
            ("Panadol", true),
            ("Zyrtec", true),
            ("Augmentin", true),
            ("Aspocid", true),
        ]);

        let outcome = h.pipeline.execute(&context(), &mut basket, 1).await.unwrap();

        assert_eq!(outcome.audit.remote_succeeded, 2);
        assert_eq!(outcome.audit.remote_failed, 2);
        assert_eq!(outcome.audit.locally_written, 4);
        assert!(outcome.audit.fully_preserved());
        assert!(basket.is_empty());
    }

    #[tokio::test]
    async fn reprinting_an_empty_basket_fails_after_a_successful_session() {
        let h = harness(StubSink::default(), StubSurface::default());
        let mut basket = basket_with(&[("Panadol", true)]);

        h.pipeline.execute(&context(), &mut basket, 1).await.unwrap();
        assert!(basket.is_empty());

        let rendered_before = h.surface.rendered.lock().unwrap().len();
        let error = h
            .pipeline
            .execute(&context(), &mut basket, 1)
            .await
            .unwrap_err();

        assert!(matches!(error, PrintError::EmptyBasket));
        assert_eq!(h.surface.rendered.lock().unwrap().len(), rendered_before);
        assert_eq!(h.log.entries.lock().unwrap().len(), 1);
    }
}
