//! Read-only patient directory.
//!
//! Patients are keyed by the pair `(patient_id, year)`; the printed form of
//! that key is the "full id" `patient_id/year` that appears on labels.
//! Lookups are exact-match only. Validating that inputs parse as integers is
//! the caller's job, not the directory's.

use crate::{StoreError, StoreResult};
use std::path::Path;

/// One patient directory entry.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PatientRecord {
    pub patient_id: u32,
    pub year: u16,
    pub patient_name: String,
    pub national_id: String,
}

impl PatientRecord {
    /// The identifier printed on labels, e.g. `100/2025`.
    pub fn full_id(&self) -> String {
        format!("{}/{}", self.patient_id, self.year)
    }
}

/// Read-only lookup of `(patient_id, year)` to patient identity.
#[derive(Debug, Clone)]
pub struct PatientDirectory {
    patients: Vec<PatientRecord>,
}

impl PatientDirectory {
    /// Load the directory from a JSON file.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| StoreError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let patients: Vec<PatientRecord> =
            serde_json::from_str(&contents).map_err(|source| StoreError::JsonParse {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self { patients })
    }

    /// Exact-match lookup.
    pub fn find(&self, patient_id: u32, year: u16) -> Option<&PatientRecord> {
        self.patients
            .iter()
            .find(|p| p.patient_id == patient_id && p.year == year)
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const PATIENTS_JSON: &str = r#"[
        {"patient_id": 100, "year": 2025, "patient_name": "Jane Doe", "national_id": "29805120101234"},
        {"patient_id": 100, "year": 2024, "patient_name": "Jane Doe", "national_id": "29805120101234"},
        {"patient_id": 215, "year": 2025, "patient_name": "Omar Hassan", "national_id": "30112250102871"}
    ]"#;

    fn write_directory() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(PATIENTS_JSON.as_bytes()).unwrap();
        file
    }

    #[test]
    fn find_matches_on_both_id_and_year() {
        let file = write_directory();
        let directory = PatientDirectory::load(file.path()).unwrap();

        let found = directory.find(100, 2025).unwrap();
        assert_eq!(found.patient_name, "Jane Doe");

        assert!(directory.find(100, 2023).is_none());
        assert!(directory.find(999, 2025).is_none());
    }

    #[test]
    fn full_id_joins_id_and_year() {
        let file = write_directory();
        let directory = PatientDirectory::load(file.path()).unwrap();

        assert_eq!(directory.find(215, 2025).unwrap().full_id(), "215/2025");
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        assert!(matches!(
            PatientDirectory::load(file.path()),
            Err(StoreError::JsonParse { .. })
        ));
    }
}
