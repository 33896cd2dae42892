// 🕸️ Co-Membership Graph - dense weight matrix for edge-list export
//
// Weight between two directors = boards they share.
// Weight between two firms     = directors they share.

use crate::entities::{BoardRegistry, IdentityId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoMembershipGraph {
    labels: Vec<String>,
    weights: Vec<Vec<usize>>,
}

impl CoMembershipGraph {
    /// Director graph over the given identities (unknown ids are skipped)
    pub fn of_identities(registry: &BoardRegistry, ids: &[IdentityId]) -> Self {
        let identities: Vec<_> = ids.iter().filter_map(|id| registry.identity(*id)).collect();
        CoMembershipGraph {
            labels: identities.iter().map(|i| i.label().to_string()).collect(),
            weights: identities
                .iter()
                .map(|a| identities.iter().map(|b| a.shared_organizations(b)).collect())
                .collect(),
        }
    }

    /// Firm graph over every organization in the registry
    pub fn of_organizations(registry: &BoardRegistry) -> Self {
        let organizations = registry.organizations();
        CoMembershipGraph {
            labels: organizations.iter().map(|o| o.label().to_string()).collect(),
            weights: organizations
                .iter()
                .map(|a| organizations.iter().map(|b| a.shared_directors(b)).collect())
                .collect(),
        }
    }

    pub fn size(&self) -> usize {
        self.labels.len()
    }

    pub fn label(&self, index: usize) -> &str {
        &self.labels[index]
    }

    pub fn weight(&self, row: usize, col: usize) -> usize {
        self.weights[row][col]
    }

    /// Upper-triangle edges (i < j) with non-zero weight
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        let n = self.size();
        (0..n)
            .flat_map(move |i| ((i + 1)..n).map(move |j| (i, j)))
            .filter_map(move |(i, j)| {
                let w = self.weight(i, j);
                (w > 0).then_some((i, j, w))
            })
    }
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

    fn create_test_board() -> (BoardRegistry, Vec<IdentityId>) {
        let records = vec![
            create_test_record(1, "A", "Mary", "Jones"),
            create_test_record(2, "B", "Mary", "Jones"),
            create_test_record(3, "A", "Paul", "Lee"),
            create_test_record(4, "B", "Paul", "Lee"),
            create_test_record(5, "C", "Ruth", "Kim"),
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
    fn test_identity_graph_weights() {
        let (registry, ids) = create_test_board();
        let graph = CoMembershipGraph::of_identities(&registry, &ids);

        // sorted by last name: Jones, Kim, Lee
        assert_eq!(graph.size(), 3);
        assert_eq!(graph.label(0), "Mary Jones");
        assert_eq!(graph.weight(0, 2), 2);
        assert_eq!(graph.weight(2, 0), 2);
        assert_eq!(graph.weight(0, 1), 0);
        assert_eq!(graph.edges().collect::<Vec<_>>(), vec![(0, 2, 2)]);
    }

    #[test]
    fn test_organization_graph_weights() {
        let (registry, _) = create_test_board();
        let graph = CoMembershipGraph::of_organizations(&registry);

        assert_eq!(graph.size(), 3);
        assert_eq!(graph.label(0), "A");
        assert_eq!(graph.weight(0, 1), 2);
        assert_eq!(graph.edges().collect::<Vec<_>>(), vec![(0, 1, 2)]);
    }
}
