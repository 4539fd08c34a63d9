//! The two-sink audit write policy.
//!
//! Remote-first with an unconditional local backup. The remote sink is
//! probed once per print session; a failed or timed-out probe means zero
//! remote writes for the session. When the probe passes, one write per
//! basket line is issued and all writes are awaited together, settled
//! successes and failures alike, so one slow or failing call never blocks
//! the others. The local fallback log is then always written, carrying the
//! confirmed remote id of each line that got one. Audit loss is worse than
//! audit duplication.

use super::{AuditError, AuditId, AuditSink, FallbackLog, LocalAuditEntry};
use crate::session::PrintSession;
use futures_util::future::join_all;
use std::time::Duration;

/// Summary of one session's audit reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditOutcome {
    pub session_id: String,
    /// Number of audit intents, one per basket line.
    pub intents: usize,
    /// Whether the probe passed and remote writes were issued.
    pub remote_attempted: bool,
    pub remote_succeeded: usize,
    pub remote_failed: usize,
    pub locally_written: usize,
}

impl AuditOutcome {
    /// True when every intent is durable in at least one sink.
    pub fn fully_preserved(&self) -> bool {
        self.locally_written == self.intents || self.remote_succeeded == self.intents
    }
}

/// Explicit write policy over the remote sink and the local fallback log.
pub struct AuditWritePolicy<R, L> {
    remote: Option<R>,
    local: L,
    probe_timeout: Duration,
}

impl<R: AuditSink, L: FallbackLog> AuditWritePolicy<R, L> {
    /// `remote: None` configures a local-only deployment; the probe step is
    /// skipped entirely.
    pub fn new(remote: Option<R>, local: L, probe_timeout: Duration) -> Self {
        Self {
            remote,
            local,
            probe_timeout,
        }
    }

    /// Record every line of the session, remote-first, local-always.
    pub async fn record_session(&self, session: &PrintSession) -> AuditOutcome {
        let records: Vec<_> = session
            .lines
            .iter()
            .map(|line| super::AuditRecord::for_line(session, line))
            .collect();

        let mut remote_ids: Vec<Option<AuditId>> = vec![None; records.len()];
        let mut remote_attempted = false;
        let mut remote_succeeded = 0;
        let mut remote_failed = 0;

        if let Some(remote) = &self.remote {
            if self.probe(remote).await {
                remote_attempted = true;
                let settled = join_all(records.iter().map(|record| remote.record(record))).await;

                // Success is counted from the settled result of each call,
                // not assumed from the batch having been issued.
                for (index, result) in settled.into_iter().enumerate() {
                    match result {
                        Ok(audit_id) => {
                            remote_ids[index] = Some(audit_id);
                            remote_succeeded += 1;
                        }
                        Err(error) => {
                            remote_failed += 1;
                            tracing::warn!(
                                drug_name = %records[index].drug_name,
                                %error,
                                "remote audit write failed, record preserved locally"
                            );
                        }
                    }
                }
            } else {
                tracing::warn!("remote audit sink unavailable, writing session locally only");
            }
        }

        let entries: Vec<LocalAuditEntry> = session
            .lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                LocalAuditEntry::for_line(session, index, line, remote_ids[index])
            })
            .collect();

        let locally_written = match self.local.append(&entries) {
            Ok(()) => entries.len(),
            Err(error) => {
                tracing::error!(%error, "local audit append failed");
                0
            }
        };

        AuditOutcome {
            session_id: session.session_id.to_string(),
            intents: records.len(),
            remote_attempted,
            remote_succeeded,
            remote_failed,
            locally_written,
        }
    }

    async fn probe(&self, remote: &R) -> bool {
        match tokio::time::timeout(self.probe_timeout, remote.probe()).await {
            Ok(Ok(())) => true,
            Ok(Err(error)) => {
                tracing::warn!(%error, "audit sink probe failed");
                false
            }
            Err(_) => {
                tracing::warn!(timeout = ?self.probe_timeout, "audit sink probe timed out");
                false
            }
        }
    }
}
