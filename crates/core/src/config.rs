//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into
//! core services. The intent is to avoid reading process-wide environment
//! variables during request handling, which can lead to inconsistent
//! behaviour in multi-threaded runtimes and test harnesses.

use crate::constants::{
    AUDIT_LEDGER_FILE_NAME, CATALOG_FILE_NAME, DEFAULT_PROBE_TIMEOUT_MS, LOCAL_AUDIT_FILE_NAME,
    PATIENTS_FILE_NAME, USERS_FILE_NAME,
};
use crate::{StoreError, StoreResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    remote_audit_url: Option<String>,
    probe_timeout: Duration,
    label_attribution: String,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `remote_audit_url` is the base URL of the remote audit sink; `None`
    /// means the print pipeline runs with the local fallback log only.
    pub fn new(
        data_dir: PathBuf,
        remote_audit_url: Option<String>,
        probe_timeout: Duration,
        label_attribution: String,
    ) -> StoreResult<Self> {
        if label_attribution.trim().is_empty() {
            return Err(StoreError::InvalidInput(
                "label_attribution cannot be empty".into(),
            ));
        }

        let remote_audit_url = match remote_audit_url {
            Some(url) => {
                let trimmed = url.trim().trim_end_matches('/').to_string();
                if trimmed.is_empty() {
                    return Err(StoreError::InvalidInput(
                        "remote_audit_url cannot be empty when set".into(),
                    ));
                }
                Some(trimmed)
            }
            None => None,
        };

        Ok(Self {
            data_dir,
            remote_audit_url,
            probe_timeout,
            label_attribution,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn remote_audit_url(&self) -> Option<&str> {
        self.remote_audit_url.as_deref()
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    pub fn label_attribution(&self) -> &str {
        &self.label_attribution
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join(CATALOG_FILE_NAME)
    }

    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join(USERS_FILE_NAME)
    }

    pub fn patients_path(&self) -> PathBuf {
        self.data_dir.join(PATIENTS_FILE_NAME)
    }

    pub fn local_audit_path(&self) -> PathBuf {
        self.data_dir.join(LOCAL_AUDIT_FILE_NAME)
    }

    pub fn audit_ledger_path(&self) -> PathBuf {
        self.data_dir.join(AUDIT_LEDGER_FILE_NAME)
    }
}

/// Parse the probe timeout from an optional environment value in milliseconds.
///
/// If `value` is `None` or empty/whitespace, returns the default timeout.
pub fn probe_timeout_from_env_value(value: Option<String>) -> StoreResult<Duration> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let millis = match value {
        Some(v) => v.parse::<u64>().map_err(|_| {
            StoreError::InvalidInput(format!("probe timeout must be an integer, got {v:?}"))
        })?,
        None => DEFAULT_PROBE_TIMEOUT_MS,
    };

    if millis == 0 {
        return Err(StoreError::InvalidInput(
            "probe timeout must be greater than zero".into(),
        ));
    }

    Ok(Duration::from_millis(millis))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(attribution: &str, url: Option<&str>) -> StoreResult<CoreConfig> {
        CoreConfig::new(
            PathBuf::from("/tmp/medilabel"),
            url.map(String::from),
            Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
            attribution.to_string(),
        )
    }

    #[test]
    fn rejects_empty_attribution() {
        assert!(matches!(config("  ", None), Err(StoreError::InvalidInput(_))));
    }

    #[test]
    fn trims_trailing_slash_from_audit_url() {
        let cfg = config("Dr Mahmoud", Some("http://localhost:5000/")).unwrap();
        assert_eq!(cfg.remote_audit_url(), Some("http://localhost:5000"));
    }

    #[test]
    fn store_paths_live_under_the_data_dir() {
        let cfg = config("Dr Mahmoud", None).unwrap();
        assert!(cfg.catalog_path().ends_with("catalog.yaml"));
        assert!(cfg.patients_path().starts_with(cfg.data_dir()));
    }

    #[test]
    fn probe_timeout_defaults_when_unset() {
        let timeout = probe_timeout_from_env_value(None).unwrap();
        assert_eq!(timeout, Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS));

        let timeout = probe_timeout_from_env_value(Some("  ".into())).unwrap();
        assert_eq!(timeout, Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS));
    }

    #[test]
    fn probe_timeout_parses_explicit_values() {
        let timeout = probe_timeout_from_env_value(Some("250".into())).unwrap();
        assert_eq!(timeout, Duration::from_millis(250));
    }

    #[test]
    fn probe_timeout_rejects_zero_and_garbage() {
        assert!(probe_timeout_from_env_value(Some("0".into())).is_err());
        assert!(probe_timeout_from_env_value(Some("soon".into())).is_err());
    }
}
