//! Constants used throughout the medilabel core crate.
//!
//! This module contains filename, default and limit constants to ensure
//! consistency across the codebase and make maintenance easier.

/// Default directory for store files when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Filename for the medication catalog, relative to the data directory.
pub const CATALOG_FILE_NAME: &str = "catalog.yaml";

/// Filename for operator accounts, relative to the data directory.
pub const USERS_FILE_NAME: &str = "users.yaml";

/// Filename for the patient directory, relative to the data directory.
pub const PATIENTS_FILE_NAME: &str = "patients.json";

/// Filename for the client-resident fallback audit log.
pub const LOCAL_AUDIT_FILE_NAME: &str = "audit-fallback.jsonl";

/// Filename for the server-side durable audit ledger.
pub const AUDIT_LEDGER_FILE_NAME: &str = "audit-ledger.jsonl";

/// Instruction used when the catalog carries none for a medication.
pub const DEFAULT_INSTRUCTION: &str = "Take as directed";

/// Attribution printed on every label unless overridden in configuration.
pub const DEFAULT_LABEL_ATTRIBUTION: &str = "Dr Mahmoud";

/// Probe timeout for the remote audit sink, in milliseconds.
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 3_000;

/// Upper bound on label copies per basket line in one print session.
pub const MAX_LABELS_PER_LINE: u32 = 10;
