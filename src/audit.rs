// 📝 Audit Trail - human-readable record of every clustering decision
//
// One text file per stage, a merges file, and report.json. Identities are
// described as they stand at the end of the run; identities that were merged
// away or dissolved keep the description taken when their stage produced them.

use crate::entities::BoardRegistry;
use crate::error::Result;
use crate::report::{ClusterEvent, ClusterReport, Stage};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const SEPARATOR: &str = "*------------------------------------------*\n";

pub fn write_audit(dir: &Path, registry: &BoardRegistry, report: &ClusterReport) -> Result<()> {
    fs::create_dir_all(dir)?;

    for (stage, body) in render_stages(registry, report) {
        fs::write(dir.join(stage.file_name()), body)?;
    }
    fs::write(dir.join("report.json"), report.to_json()?)?;

    tracing::info!(dir = %dir.display(), "wrote audit trail");
    Ok(())
}

/// Contents of every per-stage audit file
pub fn render_stages(registry: &BoardRegistry, report: &ClusterReport) -> BTreeMap<Stage, String> {
    let mut files: BTreeMap<Stage, String> = Stage::ALL
        .iter()
        .map(|stage| (*stage, format!("List of {}\n\n", stage.title())))
        .collect();

    let mut push = |stage: Stage, text: &str| {
        if let Some(body) = files.get_mut(&stage) {
            body.push_str(text);
        }
    };

    for event in &report.events {
        match event {
            ClusterEvent::Classified { stage, identities } => {
                for snapshot in identities {
                    let text = match registry.identity(snapshot.id) {
                        Some(identity) => identity.describe(),
                        None => snapshot.description.clone(),
                    };
                    push(*stage, &text);
                }
            }
            ClusterEvent::DuplicateFirm { identity, name, firm_id } => {
                push(
                    Stage::DuplicateFirmAdded,
                    &format!("{} ({})\n\tduplicate firm: {}\n\n", name, identity, firm_id),
                );
            }
            ClusterEvent::Merged {
                absorbing,
                absorbed_name,
                absorbing_name,
                ..
            } => {
                let mut text = format!("{}\nMERGED WITH\n{}\n", absorbed_name, absorbing_name);
                text.push_str("RESULTING DIRECTOR\n");
                match registry.identity(*absorbing) {
                    Some(identity) => text.push_str(&identity.describe()),
                    None => text.push_str(&format!("{} (later dissolved)\n\n", absorbing)),
                }
                text.push_str(SEPARATOR);
                push(Stage::Merged, &text);
            }
            ClusterEvent::MergeRejected {
                absorbing,
                absorbed,
                shared_firms,
            } => {
                let describe = |id| {
                    registry
                        .identity(id)
                        .map(|i| i.describe())
                        .unwrap_or_else(|| format!("{}\n\n", id))
                };
                let text = format!(
                    "{}Could not be merged with ({} shared firms)\n{}{}",
                    describe(*absorbed),
                    shared_firms,
                    describe(*absorbing),
                    SEPARATOR
                );
                push(Stage::MergeRejected, &text);
            }
            ClusterEvent::Dissolved { .. } => {}
        }
    }

    for (stage, body) in files.iter_mut() {
        body.push_str(&format!("\nCount: {}", report.count(*stage)));
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::cluster_records;
    use crate::record::{RawRecord, Record};
    use crate::report::ClusterContext;

    fn create_test_record(line: u64, firm: &str, first: &str, middle: &str) -> Record {
        let full_name = if middle == "0" {
            format!("{} Smith", first)
        } else {
            format!("{} {} Smith", first, middle)
        };
        Record::new(
            line,
            RawRecord {
                firm_id: firm.to_string(),
                firm_name: firm.to_string(),
                full_name,
                first: first.to_string(),
                middle: middle.to_string(),
                last: "Smith".to_string(),
                suffix: "0".to_string(),
                address: format!("{} Elm St", line),
            },
            "0",
        )
    }

    fn create_test_report() -> (BoardRegistry, ClusterReport) {
        create_test_run(vec![
            create_test_record(1, "A", "John", "Jacob"),
            create_test_record(2, "B", "John", "0"),
            create_test_record(3, "C", "Mary", "0"),
        ])
    }

    fn create_test_run(records: Vec<Record>) -> (BoardRegistry, ClusterReport) {
        let mut registry = BoardRegistry::new();
        for r in &records {
            registry.ensure_organization(&r.firm_id, &r.firm_name);
        }
        let mut ctx = ClusterContext::new();
        let ids = cluster_records(records, &mut registry, &mut ctx).unwrap();
        let report = ctx.into_report(ids.len(), registry.organizations().len());
        (registry, report)
    }

    #[test]
    fn test_merge_file_describes_result() {
        let (registry, report) = create_test_report();
        let files = render_stages(&registry, &report);

        let merged = &files[&Stage::Merged];
        assert!(merged.starts_with("List of Directors that were merged together"));
        assert!(merged.contains("John Smith\nMERGED WITH\nJohn Jacob Smith\n"));
        assert!(merged.contains("RESULTING DIRECTOR\nJohn Jacob Smith\n\taliases: John Jacob Smith, John Smith"));
        assert!(merged.ends_with("Count: 1"));
    }

    #[test]
    fn test_every_stage_rendered_with_count() {
        let (registry, report) = create_test_report();
        let files = render_stages(&registry, &report);

        assert_eq!(files.len(), Stage::ALL.len());
        assert!(files[&Stage::AllIdentities].ends_with("Count: 2"));
        assert!(files[&Stage::Singletons].contains("Mary Smith"));
        assert!(files[&Stage::TrulyAmbiguous].ends_with("Count: 0"));
    }

    #[test]
    fn test_dissolved_identity_keeps_stage_description() {
        let mut renamed = create_test_record(2, "A", "John", "0");
        renamed.full_name = "John Smith II".to_string();
        let (registry, report) = create_test_run(vec![
            create_test_record(1, "A", "John", "0"),
            renamed,
            create_test_record(3, "B", "John", "0"),
        ]);
        let files = render_stages(&registry, &report);

        // the no-middle identity was dissolved by the duplicate-firm repair
        let no_middle = &files[&Stage::NoMiddle];
        assert!(no_middle.contains("John Smith\n\taliases: John Smith, John Smith II\n"));
        assert!(!no_middle.contains("identity#"));
        assert!(no_middle.ends_with("Count: 1"));
        assert!(files[&Stage::RebuiltFromDuplicateFirm].ends_with("Count: 2"));
    }

    #[test]
    fn test_write_audit_creates_files() {
        let (registry, report) = create_test_report();
        let dir = tempfile::tempdir().unwrap();

        write_audit(dir.path(), &registry, &report).unwrap();

        assert!(dir.path().join("all directors.txt").exists());
        assert!(dir.path().join("merged directors.txt").exists());
        let json = fs::read_to_string(dir.path().join("report.json")).unwrap();
        let parsed: ClusterReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.identity_count, 2);
    }
}
