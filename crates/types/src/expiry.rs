//! Label expiry components.
//!
//! Expiry dates on medication labels have month/year granularity only. The
//! month and year are selected independently by the operator, each from a
//! closed enumeration, and the full [`ExpiryDate`] exists only when both
//! components are present. No calendar validation beyond the enumerations is
//! performed.

/// Errors raised when constructing expiry components.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExpiryError {
    /// The month was outside 1..=12
    #[error("expiry month must be between 1 and 12, got {0}")]
    MonthOutOfRange(u8),
    /// The two-digit year was outside the selectable range
    #[error("expiry year must be between {min} and {max}, got {0}", min = ExpiryYear::MIN, max = ExpiryYear::MAX)]
    YearOutOfRange(u8),
}

/// A calendar month (1–12) selected for a label expiry date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExpiryMonth(u8);

impl ExpiryMonth {
    /// Creates a month from its 1-based number.
    pub fn new(month: u8) -> Result<Self, ExpiryError> {
        if !(1..=12).contains(&month) {
            return Err(ExpiryError::MonthOutOfRange(month));
        }
        Ok(Self(month))
    }

    pub fn as_u8(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for ExpiryMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// A two-digit year selected for a label expiry date.
///
/// The selectable range matches the label stock in use: `26` (2026) through
/// `50` (2050). Years are stored in the two-digit shorthand and expanded to
/// four digits only for display on the printed label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExpiryYear(u8);

impl ExpiryYear {
    pub const MIN: u8 = 26;
    pub const MAX: u8 = 50;

    /// Creates a year from its two-digit shorthand.
    pub fn new(year: u8) -> Result<Self, ExpiryError> {
        if !(Self::MIN..=Self::MAX).contains(&year) {
            return Err(ExpiryError::YearOutOfRange(year));
        }
        Ok(Self(year))
    }

    pub fn as_u8(self) -> u8 {
        self.0
    }

    /// The full four-digit year, e.g. `2026` for shorthand `26`.
    pub fn full_year(self) -> u16 {
        2000 + u16::from(self.0)
    }
}

impl std::fmt::Display for ExpiryYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// A complete label expiry date, derived from a month and a year component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExpiryDate {
    month: ExpiryMonth,
    year: ExpiryYear,
}

impl ExpiryDate {
    pub fn new(month: ExpiryMonth, year: ExpiryYear) -> Self {
        Self { month, year }
    }

    pub fn month(self) -> ExpiryMonth {
        self.month
    }

    pub fn year(self) -> ExpiryYear {
        self.year
    }

    /// The stored shorthand form, e.g. `03/26`.
    pub fn short(self) -> String {
        format!("{}/{}", self.month, self.year)
    }

    /// The display form printed on labels, e.g. `03/2026`.
    pub fn display(self) -> String {
        format!("{}/{}", self.month, self.year.full_year())
    }
}

impl std::fmt::Display for ExpiryDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.month, self.year)
    }
}

impl serde::Serialize for ExpiryMonth {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for ExpiryMonth {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        ExpiryMonth::new(value).map_err(serde::de::Error::custom)
    }
}

impl serde::Serialize for ExpiryYear {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for ExpiryYear {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        ExpiryYear::new(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_accepts_full_range() {
        for m in 1..=12 {
            assert!(ExpiryMonth::new(m).is_ok());
        }
    }

    #[test]
    fn month_rejects_out_of_range_values() {
        assert_eq!(ExpiryMonth::new(0), Err(ExpiryError::MonthOutOfRange(0)));
        assert_eq!(ExpiryMonth::new(13), Err(ExpiryError::MonthOutOfRange(13)));
    }

    #[test]
    fn year_bounds_match_the_selectable_range() {
        assert!(ExpiryYear::new(ExpiryYear::MIN).is_ok());
        assert!(ExpiryYear::new(ExpiryYear::MAX).is_ok());
        assert_eq!(ExpiryYear::new(25), Err(ExpiryError::YearOutOfRange(25)));
        assert_eq!(ExpiryYear::new(51), Err(ExpiryError::YearOutOfRange(51)));
    }

    #[test]
    fn components_zero_pad_in_display() {
        let month = ExpiryMonth::new(3).unwrap();
        let year = ExpiryYear::new(26).unwrap();
        assert_eq!(month.to_string(), "03");
        assert_eq!(year.to_string(), "26");
    }

    #[test]
    fn date_shorthand_and_display_forms() {
        let date = ExpiryDate::new(ExpiryMonth::new(3).unwrap(), ExpiryYear::new(26).unwrap());
        assert_eq!(date.short(), "03/26");
        assert_eq!(date.display(), "03/2026");
        assert_eq!(date.to_string(), "03/26");
    }

    #[test]
    fn full_year_expands_two_digit_shorthand() {
        assert_eq!(ExpiryYear::new(50).unwrap().full_year(), 2050);
    }
}
