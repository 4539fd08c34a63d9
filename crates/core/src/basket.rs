//! The basket of medications queued for label printing.
//!
//! Lines are kept in insertion order and keyed by an id that is unique for
//! the lifetime of the store (ids are never reused after removal). The
//! expiry date is derived from its two components and therefore exists
//! exactly when both the month and the year are set; callers cannot observe
//! a half-built date.

use medilabel_types::{ExpiryDate, ExpiryMonth, ExpiryYear, NonEmptyText};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum BasketError {
    #[error("drug name cannot be empty")]
    EmptyDrugName,
    #[error("no basket line with id {0}")]
    LineNotFound(u64),
}

/// One pending medication to be labeled.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BasketLine {
    pub id: u64,
    pub drug_name: NonEmptyText,
    pub instruction_text: String,
    pub expiry_month: Option<ExpiryMonth>,
    pub expiry_year: Option<ExpiryYear>,
}

impl BasketLine {
    /// The derived expiry date; present only when both components are set.
    pub fn expiry_date(&self) -> Option<ExpiryDate> {
        match (self.expiry_month, self.expiry_year) {
            (Some(month), Some(year)) => Some(ExpiryDate::new(month, year)),
            _ => None,
        }
    }
}

/// Ordered, mutable collection of selected medication lines.
///
/// Listing preserves insertion order; alphabetical display is a presentation
/// concern handled by the API and CLI layers on a copy.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct BasketStore {
    lines: Vec<BasketLine>,
    next_id: u64,
}

impl BasketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line and return its newly assigned id.
    ///
    /// The requirement that a patient is selected first is enforced by
    /// callers; the store only rejects empty drug names.
    pub fn add(&mut self, drug_name: &str, instruction_text: &str) -> Result<u64, BasketError> {
        let drug_name = NonEmptyText::new(drug_name).map_err(|_| BasketError::EmptyDrugName)?;

        self.next_id += 1;
        let id = self.next_id;
        self.lines.push(BasketLine {
            id,
            drug_name,
            instruction_text: instruction_text.to_string(),
            expiry_month: None,
            expiry_year: None,
        });

        Ok(id)
    }

    /// Remove a line; a no-op when the id is absent.
    pub fn remove(&mut self, id: u64) {
        self.lines.retain(|line| line.id != id);
    }

    /// Remove all lines; no error when already empty.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Update only the month component of a line's expiry date.
    pub fn set_expiry_month(
        &mut self,
        id: u64,
        month: Option<ExpiryMonth>,
    ) -> Result<(), BasketError> {
        self.line_mut(id)?.expiry_month = month;
        Ok(())
    }

    /// Update only the year component of a line's expiry date.
    pub fn set_expiry_year(
        &mut self,
        id: u64,
        year: Option<ExpiryYear>,
    ) -> Result<(), BasketError> {
        self.line_mut(id)?.expiry_year = year;
        Ok(())
    }

    pub fn get(&self, id: u64) -> Option<&BasketLine> {
        self.lines.iter().find(|line| line.id == id)
    }

    /// All lines in insertion order.
    pub fn lines(&self) -> &[BasketLine] {
        &self.lines
    }

    /// A clone of the current lines, taken at print time.
    pub fn snapshot(&self) -> Vec<BasketLine> {
        self.lines.clone()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn line_mut(&mut self, id: u64) -> Result<&mut BasketLine, BasketError> {
        self.lines
            .iter_mut()
            .find(|line| line.id == id)
            .ok_or(BasketError::LineNotFound(id))
    }
}
