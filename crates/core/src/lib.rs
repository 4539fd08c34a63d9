//! # Medilabel Core
//!
//! Core business logic for the medication label printing system:
//! - read-only file-backed stores (medication catalog, patient directory,
//!   operator accounts)
//! - the basket of lines queued for printing, with per-line expiry editing
//! - label document construction and the PDF render surface
//! - the dual-sink audit path (remote write-through with an unconditional
//!   local fallback)
//! - the print pipeline orchestrating validate, render, audit and clear
//!
//! **No API concerns**: HTTP routing and serving belong in `api-rest`; the
//! operator front end belongs in `cli`.

#![warn(rust_2018_idioms)]

pub mod audit;
pub mod auth;
pub mod basket;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod directory;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod session;

pub use audit::ledger::{AuditLedger, LedgerEntry};
pub use audit::local::LocalAuditLog;
pub use audit::policy::{AuditOutcome, AuditWritePolicy};
pub use audit::remote::HttpAuditSink;
pub use audit::{AuditError, AuditId, AuditRecord, AuditSink, FallbackLog, LocalAuditEntry};
pub use auth::{AuthService, Operator};
pub use basket::{BasketError, BasketLine, BasketStore};
pub use catalog::{CatalogStore, Medication};
pub use config::CoreConfig;
pub use directory::{PatientDirectory, PatientRecord};
pub use error::{StoreError, StoreResult};
pub use pipeline::{PrintError, PrintOutcome, PrintPipeline, SessionPhase};
pub use render::pdf::PdfLabelSurface;
pub use render::{LabelDocument, LabelSurface, RenderError, TextDirection};
pub use session::{PatientSelection, PrintSession, SessionContext, SessionId};
