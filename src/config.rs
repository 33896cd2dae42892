// ⚙️ Run Configuration - Column layout + void sentinel
//
// The input layout differs between datasets, so the column indices are data,
// not constants. A layout that does not fit the input is a configuration error.

use crate::error::{DirectorshipError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Default sentinel meaning "field absent" in the middle and suffix columns
pub const DEFAULT_VOID_SENTINEL: &str = "0";

// ============================================================================
// COLUMN LAYOUT
// ============================================================================

/// Zero-based column index of every field the reader extracts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLayout {
    pub firm_name: usize,
    pub first: usize,
    pub middle: usize,
    pub last: usize,
    pub suffix: usize,
    pub firm_id: usize,
    pub full_name: usize,
    pub address: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        ColumnLayout {
            firm_name: 0,
            first: 1,
            middle: 2,
            last: 3,
            suffix: 4,
            firm_id: 5,
            full_name: 6,
            address: 7,
        }
    }
}

impl ColumnLayout {
    /// All configured columns, in the order they are reported
    pub fn columns(&self) -> [(&'static str, usize); 8] {
        [
            ("firm id", self.firm_id),
            ("firm name", self.firm_name),
            ("full name", self.full_name),
            ("first name", self.first),
            ("middle name", self.middle),
            ("last name", self.last),
            ("suffix", self.suffix),
            ("address", self.address),
        ]
    }

    /// Smallest row width that satisfies every index
    pub fn required_width(&self) -> usize {
        self.columns().iter().map(|(_, i)| i + 1).max().unwrap_or(0)
    }

    /// Check a row of `width` columns against the layout
    pub fn check_width(&self, width: usize, line: u64) -> Result<()> {
        for (column, index) in self.columns() {
            if index >= width {
                return Err(DirectorshipError::ColumnLayout {
                    column,
                    index,
                    width,
                    line,
                    layout: self.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for ColumnLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Current indices:")?;
        for (column, index) in self.columns() {
            writeln!(f, "\t{} = {}", column, index)?;
        }
        Ok(())
    }
}

// ============================================================================
// RUN CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub layout: ColumnLayout,
    pub void_sentinel: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            layout: ColumnLayout::default(),
            void_sentinel: DEFAULT_VOID_SENTINEL.to_string(),
        }
    }
}

impl RunConfig {
    /// Load a JSON configuration file. Missing keys fall back to defaults.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| DirectorshipError::Config(e.to_string()))
    }
}

// ============================================================================
// TESTS
// ============================================================================
