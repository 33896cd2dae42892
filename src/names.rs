// 🔤 Name Comparator - exact-vs-initial compatibility
//
// Two names are compatible when they are equal, or when either one is a bare
// initial and the initials agree. No fuzzy or phonetic matching.
//
// The relation is reflexive and symmetric, but NOT transitive in general:
//   "John J" ~ "J Jacob" and "J Jacob" ~ "Jim J", yet "John J" !~ "Jim J"

use crate::record::Record;

/// Generic rule shared by first and middle names
fn compatible(a: &str, a_init: Option<char>, a_is_init: bool, b: &str, b_init: Option<char>, b_is_init: bool) -> bool {
    if a == b {
        true
    } else if a_is_init || b_is_init {
        a_init == b_init
    } else {
        false
    }
}

pub fn first_names_compatible(a: &Record, b: &Record) -> bool {
    compatible(
        &a.first,
        a.first_init,
        a.is_first_init,
        &b.first,
        b.first_init,
        b.is_first_init,
    )
}

pub fn middle_names_compatible(a: &Record, b: &Record) -> bool {
    compatible(
        &a.middle,
        a.middle_init,
        a.is_middle_init,
        &b.middle,
        b.middle_init,
        b.is_middle_init,
    )
}

/// Records could denote the same person (first AND middle compatible)
pub fn names_compatible(a: &Record, b: &Record) -> bool {
    first_names_compatible(a, b) && middle_names_compatible(a, b)
}

// ============================================================================
// TESTS
// ============================================================================
