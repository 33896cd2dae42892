// 🧩 Ambiguity Cascade - resolve one (first initial, middle initial) bucket
//
// Pure decision procedure: records in, groups of records out. The engine turns
// each group into one Identity. Every branch of the decision tree is a variant
// of CascadeOutcome so it can be tested on its own.
//
//   relation transitive?            -> EquivalenceClasses
//   else dual-initial records?
//       rest transitive?            -> DualInitialPlusClasses
//       else                        -> FullyAmbiguous (with dual-initial blob)
//   else                            -> FullyAmbiguous (no blob)

use crate::names::names_compatible;
use crate::record::Record;
use std::collections::BTreeMap;
use std::sync::Arc;

// ============================================================================
// COMPATIBILITY RELATION
// ============================================================================

/// Pairwise compatibility over a fixed list of records (positions, not ids)
#[derive(Debug, Clone)]
pub struct CompatibilityRelation {
    related: Vec<Vec<bool>>,
}

impl CompatibilityRelation {
    /// All ordered pairs (r1, r2) with compatible names, self-pairs included
    pub fn build(records: &[Arc<Record>]) -> Self {
        let related = records
            .iter()
            .map(|a| records.iter().map(|b| names_compatible(a, b)).collect())
            .collect();
        CompatibilityRelation { related }
    }

    pub fn len(&self) -> usize {
        self.related.len()
    }

    pub fn is_empty(&self) -> bool {
        self.related.is_empty()
    }

    pub fn contains(&self, a: usize, b: usize) -> bool {
        self.related[a][b]
    }

    /// Ordered pairs in the relation
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        let n = self.len();
        (0..n)
            .flat_map(|a| (0..n).map(move |b| (a, b)))
            .filter(|&(a, b)| self.contains(a, b))
            .collect()
    }

    /// For every (a, b) and (b, c) in the relation, (a, c) is too
    pub fn is_transitive(&self) -> bool {
        let n = self.len();
        for a in 0..n {
            for b in 0..n {
                if !self.contains(a, b) {
                    continue;
                }
                for c in 0..n {
                    if self.contains(b, c) && !self.contains(a, c) {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Equivalence classes of a transitive relation, as sorted positions.
    ///
    /// Pairs may be visited in any order: every pair unions its endpoints, and
    /// classes are ordered by their smallest member, so only the traversal
    /// (never the membership) depends on the order of `pairs`.
    pub fn classes_from_pairs(&self, pairs: &[(usize, usize)]) -> Vec<Vec<usize>> {
        debug_assert!(self.is_transitive());

        let n = self.len();
        let mut parent: Vec<usize> = (0..n).collect();
        let mut seen = vec![false; n];

        fn root(parent: &mut [usize], mut x: usize) -> usize {
            while parent[x] != x {
                parent[x] = parent[parent[x]];
                x = parent[x];
            }
            x
        }

        for &(a, b) in pairs {
            seen[a] = true;
            seen[b] = true;
            let (ra, rb) = (root(&mut parent, a), root(&mut parent, b));
            if ra != rb {
                parent[ra.max(rb)] = ra.min(rb);
            }
        }

        let mut by_root: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for member in (0..n).filter(|&m| seen[m]) {
            let r = root(&mut parent, member);
            by_root.entry(r).or_default().push(member);
        }

        let mut classes: Vec<Vec<usize>> = by_root.into_values().collect();
        classes.sort_by_key(|class| class[0]);
        classes
    }

    pub fn equivalence_classes(&self) -> Vec<Vec<usize>> {
        self.classes_from_pairs(&self.pairs())
    }
}

// ============================================================================
// CASCADE OUTCOME
// ============================================================================

pub type RecordGroup = Vec<Arc<Record>>;

#[derive(Debug, Clone)]
pub enum CascadeOutcome {
    /// Single record in the bucket
    Singleton(Arc<Record>),

    /// Relation was transitive: one group per equivalence class
    EquivalenceClasses(Vec<RecordGroup>),

    /// Dual-initial records caused the intransitivity; without them the
    /// rest is transitive
    DualInitialPlusClasses {
        dual_initial: RecordGroup,
        classes: Vec<RecordGroup>,
    },

    /// Still intransitive: one group per distinct full display name.
    /// `dual_initial` is empty when no dual-initial records were present.
    FullyAmbiguous {
        dual_initial: RecordGroup,
        by_full_name: Vec<RecordGroup>,
    },
}

// ============================================================================
// RESOLUTION
// ============================================================================

fn pick(records: &[Arc<Record>], positions: &[usize]) -> RecordGroup {
    positions.iter().map(|&i| Arc::clone(&records[i])).collect()
}

/// Equivalence classes if the records are transitive under compatibility
fn transitive_classes(records: &[Arc<Record>]) -> Option<Vec<RecordGroup>> {
    let relation = CompatibilityRelation::build(records);
    if !relation.is_transitive() {
        return None;
    }
    Some(
        relation
            .equivalence_classes()
            .iter()
            .map(|class| pick(records, class))
            .collect(),
    )
}

/// Finest split: identical full display names stay together, nothing else
pub fn group_by_full_name(records: Vec<Arc<Record>>) -> Vec<RecordGroup> {
    let mut by_name: BTreeMap<String, RecordGroup> = BTreeMap::new();
    for record in records {
        by_name.entry(record.full_name.clone()).or_default().push(record);
    }
    by_name.into_values().collect()
}

/// Run the cascade over one (first initial, middle initial) bucket
pub fn resolve_bucket(records: Vec<Arc<Record>>) -> CascadeOutcome {
    let records = match <[Arc<Record>; 1]>::try_from(records) {
        Ok([record]) => return CascadeOutcome::Singleton(record),
        Err(records) => records,
    };

    if let Some(classes) = transitive_classes(&records) {
        return CascadeOutcome::EquivalenceClasses(classes);
    }

    let (dual_initial, rest): (RecordGroup, RecordGroup) =
        records.into_iter().partition(|r| r.is_dual_initial());

    if dual_initial.is_empty() {
        return CascadeOutcome::FullyAmbiguous {
            dual_initial,
            by_full_name: group_by_full_name(rest),
        };
    }

    match transitive_classes(&rest) {
        Some(classes) => CascadeOutcome::DualInitialPlusClasses { dual_initial, classes },
        None => CascadeOutcome::FullyAmbiguous {
            dual_initial,
            by_full_name: group_by_full_name(rest),
        },
    }
}

// ============================================================================
// TESTS
// ============================================================================
