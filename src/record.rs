// 📄 Record - One normalized director-at-firm observation
//
// Records are immutable once built. Everything the clustering engine asks
// about a name (initials, "is this just an initial?") is computed here once.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw field values of one input row, before normalization
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub firm_id: String,
    pub firm_name: String,
    pub full_name: String,
    pub first: String,
    pub middle: String,
    pub last: String,
    pub suffix: String,
    pub address: String,
}

/// Record - normalized, immutable input observation
///
/// Precondition: `first` and `last` are non-empty. An empty first name has no
/// initial (`None`) and is bucketed on its own; nothing else special-cases it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// 1-based source line, unique within a run
    pub line: u64,

    pub firm_id: String,
    pub firm_name: String,
    pub full_name: String,
    pub first: String,
    pub middle: String,
    pub last: String,
    pub suffix: String,
    pub address: String,

    /// Middle source field was the void sentinel (or empty)
    pub middle_void: bool,
    /// Suffix source field was the void sentinel
    pub suffix_void: bool,

    pub first_init: Option<char>,
    pub middle_init: Option<char>,
    pub is_first_init: bool,
    pub is_middle_init: bool,
}

impl Record {
    /// Normalize a raw row. `void_sentinel` in the middle or suffix field
    /// means the field is absent.
    pub fn new(line: u64, raw: RawRecord, void_sentinel: &str) -> Self {
        let middle_void = raw.middle == void_sentinel || raw.middle.is_empty();
        let middle = if middle_void { String::new() } else { raw.middle };

        let suffix_void = raw.suffix == void_sentinel;
        let suffix = if suffix_void { String::new() } else { raw.suffix };

        Record {
            line,
            first_init: raw.first.chars().next(),
            middle_init: middle.chars().next(),
            is_first_init: is_initial(&raw.first),
            is_middle_init: is_initial(&middle),
            firm_id: raw.firm_id,
            firm_name: raw.firm_name,
            full_name: raw.full_name,
            first: raw.first,
            middle,
            last: raw.last,
            suffix,
            address: raw.address,
            middle_void,
            suffix_void,
        }
    }

    pub fn has_middle(&self) -> bool {
        !self.middle_void
    }

    /// Both first and middle are bare initials ("J J Smith")
    pub fn is_dual_initial(&self) -> bool {
        self.is_first_init && self.is_middle_init
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} | {}>", self.firm_id, self.full_name)
    }
}

/// A name field is an initial iff it is exactly one character long
pub fn is_initial(name: &str) -> bool {
    name.chars().count() == 1
}

/// Name length in characters, used for "widen only" comparisons
pub fn name_len(name: &str) -> usize {
    name.chars().count()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_raw(first: &str, middle: &str, last: &str, suffix: &str) -> RawRecord {
        RawRecord {
            firm_id: "F1".to_string(),
            firm_name: "Firm One".to_string(),
            full_name: format!("{} {} {}", first, middle, last),
            first: first.to_string(),
            middle: middle.to_string(),
            last: last.to_string(),
            suffix: suffix.to_string(),
            address: "1 Main St".to_string(),
        }
    }

    #[test]
    fn test_sentinel_middle_and_suffix_are_void() {
        let record = Record::new(2, create_test_raw("John", "0", "Smith", "0"), "0");

        assert!(record.middle_void);
        assert!(record.suffix_void);
        assert_eq!(record.middle, "");
        assert_eq!(record.suffix, "");
        assert_eq!(record.middle_init, None);
        assert!(!record.is_middle_init);
        assert!(!record.has_middle());
    }

    #[test]
    fn test_initials_are_derived() {
        let record = Record::new(2, create_test_raw("J", "Jacob", "Smith", "Jr"), "0");

        assert_eq!(record.first_init, Some('J'));
        assert_eq!(record.middle_init, Some('J'));
        assert!(record.is_first_init);
        assert!(!record.is_middle_init);
        assert!(!record.middle_void);
        assert!(!record.suffix_void);
        assert_eq!(record.suffix, "Jr");
    }

    #[test]
    fn test_single_character_middle_is_initial_not_void() {
        let record = Record::new(2, create_test_raw("J", "Q", "Smith", "0"), "0");

        assert!(record.is_middle_init);
        assert!(!record.middle_void);
        assert!(record.is_dual_initial());
    }

    #[test]
    fn test_custom_sentinel() {
        let record = Record::new(2, create_test_raw("Mary", "NA", "Jones", "NA"), "NA");
        assert!(record.middle_void);
        assert!(record.suffix_void);
    }
}
