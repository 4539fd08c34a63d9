//! Read-only medication catalog.
//!
//! The catalog is a YAML file loaded once at startup. Each entry pairs a drug
//! name with its default dosing instruction and an optional barcode. Lookups
//! never mutate the store; listing order is alphabetical by drug name.

use crate::constants::DEFAULT_INSTRUCTION;
use crate::{StoreError, StoreResult};
use std::path::Path;

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Medication {
    pub drug_name: String,
    #[serde(default)]
    pub instruction: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
}

impl Medication {
    /// The instruction to preselect when this medication is added to a
    /// basket: the catalog text, or the fixed default when absent.
    pub fn instruction_or_default(&self) -> &str {
        self.instruction
            .as_deref()
            .filter(|i| !i.trim().is_empty())
            .unwrap_or(DEFAULT_INSTRUCTION)
    }
}

/// Read-only lookup of medication name to instruction and barcode.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    medications: Vec<Medication>,
}

impl CatalogStore {
    /// Load the catalog from a YAML file and sort it by drug name.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| StoreError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let mut medications: Vec<Medication> =
            serde_yaml::from_str(&contents).map_err(|source| StoreError::YamlParse {
                path: path.to_path_buf(),
                source,
            })?;

        if medications.iter().any(|m| m.drug_name.trim().is_empty()) {
            return Err(StoreError::InvalidInput(format!(
                "catalog {} contains an entry with an empty drug name",
                path.display()
            )));
        }

        medications.sort_by(|a, b| {
            a.drug_name
                .to_lowercase()
                .cmp(&b.drug_name.to_lowercase())
        });

        Ok(Self { medications })
    }

    /// All medications, ordered by drug name.
    pub fn list(&self) -> &[Medication] {
        &self.medications
    }

    /// Exact (case-insensitive) lookup by drug name.
    pub fn get(&self, drug_name: &str) -> Option<&Medication> {
        self.medications
            .iter()
            .find(|m| m.drug_name.eq_ignore_ascii_case(drug_name.trim()))
    }

    /// Case-insensitive substring search over drug names and instructions.
    ///
    /// An empty or whitespace-only term matches the whole catalog.
    pub fn search(&self, term: &str) -> Vec<&Medication> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return self.medications.iter().collect();
        }

        self.medications
            .iter()
            .filter(|m| {
                m.drug_name.to_lowercase().contains(&needle)
                    || m.instruction
                        .as_deref()
                        .is_some_and(|i| i.to_lowercase().contains(&needle))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.medications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.medications.is_empty()
    }
}
