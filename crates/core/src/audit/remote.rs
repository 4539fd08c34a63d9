//! HTTP client for the remote audit sink.
//!
//! The remote contract is JSON over HTTP: `GET /health` answers the
//! capability probe, `POST /api/audit` accepts one record and returns the
//! assigned audit id. The client carries a request timeout so a stalled
//! sink cannot hold a print session open. There is no retry; reconciliation
//! is deferred to the local fallback log.

use super::{AuditError, AuditId, AuditRecord, AuditSink};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpAuditSink {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, serde::Deserialize)]
struct AuditAccepted {
    #[serde(rename = "auditId")]
    audit_id: AuditId,
}

impl HttpAuditSink {
    /// Create a sink for the given base URL with a per-request timeout.
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self, AuditError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl AuditSink for HttpAuditSink {
    async fn probe(&self) -> Result<(), AuditError> {
        let response = self.client.get(self.url("/health")).send().await?;
        response.error_for_status()?;
        Ok(())
    }

    async fn record(&self, record: &AuditRecord) -> Result<AuditId, AuditError> {
        let response = self
            .client
            .post(self.url("/api/audit"))
            .json(record)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuditError::Rejected(format!(
                "audit endpoint answered {status}"
            )));
        }

        let accepted: AuditAccepted = response.json().await?;
        Ok(accepted.audit_id)
    }
}
