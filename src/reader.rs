// 📂 Directorship Reader - headered CSV → Records + Organization registry
//
// The column layout is checked against the header before any record is built,
// so a mismatched layout aborts the run up front.

use crate::config::RunConfig;
use crate::entities::BoardRegistry;
use crate::error::Result;
use crate::record::{RawRecord, Record};
use std::io::Read;
use std::path::Path;

/// Everything the clustering engine needs from the input
#[derive(Debug)]
pub struct Dataset {
    pub records: Vec<Record>,
    pub registry: BoardRegistry,
}

pub fn read_directorships(path: &Path, config: &RunConfig) -> Result<Dataset> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    read_from(rdr, config)
}

pub fn read_directorships_from<R: Read>(input: R, config: &RunConfig) -> Result<Dataset> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);
    read_from(rdr, config)
}

fn read_from<R: Read>(mut rdr: csv::Reader<R>, config: &RunConfig) -> Result<Dataset> {
    let layout = &config.layout;

    let header_width = rdr.headers()?.len();
    layout.check_width(header_width, 1)?;

    let mut records = Vec::new();
    let mut registry = BoardRegistry::new();

    for result in rdr.records() {
        let row = result?;
        let line = row.position().map(|p| p.line()).unwrap_or(records.len() as u64 + 2);
        layout.check_width(row.len(), line)?;

        let field = |index: usize| row.get(index).unwrap_or_default().to_string();
        let raw = RawRecord {
            firm_id: field(layout.firm_id),
            firm_name: field(layout.firm_name),
            full_name: field(layout.full_name),
            first: field(layout.first),
            middle: field(layout.middle),
            last: field(layout.last),
            suffix: field(layout.suffix),
            address: field(layout.address),
        };

        registry.ensure_organization(&raw.firm_id, &raw.firm_name);
        records.push(Record::new(line, raw, &config.void_sentinel));
    }

    tracing::info!(
        records = records.len(),
        organizations = registry.organizations().len(),
        "read directorship records"
    );
    Ok(Dataset { records, registry })
}

// ============================================================================
// TESTS
// ============================================================================
