// ⚠️ Error Taxonomy - Everything that can abort a clustering run
//
// Ambiguity is NOT an error: the engine degrades to coarser identities instead.
// Duplicate-firm links are corrective and never surface here either.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectorshipError {
    /// The configured column layout does not fit the input's actual columns.
    /// Raised before any Identity is constructed.
    #[error(
        "column '{column}' is configured at index {index}, but the input row (line {line}) only has {width} columns\n{layout}"
    )]
    ColumnLayout {
        column: &'static str,
        index: usize,
        width: usize,
        line: u64,
        layout: String,
    },

    /// Configuration file could not be understood
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A record references a firm the registry has never seen
    #[error("record on line {line} references unknown firm '{firm_id}'")]
    UnknownFirm { firm_id: String, line: u64 },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DirectorshipError>;
