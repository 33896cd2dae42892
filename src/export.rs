// 💾 Export - edge lists and alias lists as CSV

use crate::entities::{BoardRegistry, IdentityId};
use crate::error::Result;
use crate::graph::CoMembershipGraph;
use std::io::Write;
use std::path::Path;

/// One `label_i,label_j` row per shared membership, i < j. No header.
pub fn write_edge_list(path: &Path, graph: &CoMembershipGraph) -> Result<usize> {
    let writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    write_edges(writer, graph)
}

pub fn write_edges<W: Write>(mut writer: csv::Writer<W>, graph: &CoMembershipGraph) -> Result<usize> {
    let mut rows = 0;
    for (i, j, weight) in graph.edges() {
        for _ in 0..weight {
            writer.write_record([graph.label(i), graph.label(j)])?;
            rows += 1;
        }
    }
    writer.flush()?;
    tracing::debug!(nodes = graph.size(), rows, "wrote edge list");
    Ok(rows)
}

/// One row per identity with its distinct aliases (rows vary in width)
pub fn write_aliases(path: &Path, registry: &BoardRegistry, ids: &[IdentityId]) -> Result<usize> {
    let writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    write_alias_rows(writer, registry, ids)
}

pub fn write_alias_rows<W: Write>(
    mut writer: csv::Writer<W>,
    registry: &BoardRegistry,
    ids: &[IdentityId],
) -> Result<usize> {
    let mut rows = 0;
    for identity in ids.iter().filter_map(|id| registry.identity(*id)) {
        writer.write_record(identity.aliases())?;
        rows += 1;
    }
    writer.flush()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::cluster_records;
    use crate::record::{RawRecord, Record};
    use crate::report::ClusterContext;

    fn create_test_record(line: u64, firm: &str, first: &str, last: &str) -> Record {
        Record::new(
            line,
            RawRecord {
                firm_id: firm.to_string(),
                firm_name: firm.to_string(),
                full_name: format!("{} {}", first, last),
                first: first.to_string(),
                middle: "0".to_string(),
                last: last.to_string(),
                suffix: "0".to_string(),
                address: String::new(),
            },
            "0",
        )
    }

    fn create_test_run() -> (BoardRegistry, Vec<IdentityId>) {
        let records = vec![
            create_test_record(1, "A", "Mary", "Jones"),
            create_test_record(2, "B", "M", "Jones"),
            create_test_record(3, "A", "Paul", "Lee"),
            create_test_record(4, "B", "Paul", "Lee"),
        ];
        let mut registry = BoardRegistry::new();
        for r in &records {
            registry.ensure_organization(&r.firm_id, &r.firm_name);
        }
        let mut ctx = ClusterContext::new();
        let ids = cluster_records(records, &mut registry, &mut ctx).unwrap();
        (registry, ids)
    }

    #[test]
    fn test_edge_rows_repeat_by_weight() {
        let (registry, ids) = create_test_run();
        let graph = CoMembershipGraph::of_identities(&registry, &ids);

        let mut buffer = Vec::new();
        {
            let writer = csv::WriterBuilder::new().has_headers(false).from_writer(&mut buffer);
            assert_eq!(write_edges(writer, &graph).unwrap(), 2);
        }

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "Mary Jones,Paul Lee\nMary Jones,Paul Lee\n");
    }

    #[test]
    fn test_alias_rows() {
        let (registry, ids) = create_test_run();
        let mut buffer = Vec::new();
        {
            let writer = csv::WriterBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_writer(&mut buffer);
            assert_eq!(write_alias_rows(writer, &registry, &ids).unwrap(), 2);
        }

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "M Jones,Mary Jones\nPaul Lee\n");
    }

    #[test]
    fn test_firm_edge_list_file() {
        let (registry, _) = create_test_run();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("firms_edge_list.csv");

        let rows = write_edge_list(&path, &CoMembershipGraph::of_organizations(&registry)).unwrap();

        assert_eq!(rows, 2);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().collect::<Vec<_>>(), vec!["A,B", "A,B"]);
    }
}
