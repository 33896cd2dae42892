// 📊 Run Context - counters + structured events for the reporting side-channel
//
// The clustering engine never writes files. It records what it decided into a
// ClusterContext that is passed in explicitly; the audit writer and the CLI
// consume the resulting ClusterReport.

use crate::entities::{BoardRegistry, IdentityId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// ============================================================================
// STAGES
// ============================================================================

/// Decision category an identity was produced by (or passed through)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    Singletons,
    NonSingletons,
    MiddlePresent,
    NoMiddle,
    NoMiddleFirstFull,
    NoMiddleFirstInitial,
    MiddleSingletons,
    MiddleNonSingletons,
    MiddleUnambiguous,
    MiddleAmbiguous,
    DualInitialCulprit,
    DualInitialNonCulprit,
    UnambiguousWithDualInitialRemoved,
    TrulyAmbiguous,
    DuplicateFirmAdded,
    AllIdentities,
    Merged,
    MergeRejected,
    RebuiltFromDuplicateFirm,
}

impl Stage {
    pub const ALL: [Stage; 19] = [
        Stage::Singletons,
        Stage::NonSingletons,
        Stage::MiddlePresent,
        Stage::NoMiddle,
        Stage::NoMiddleFirstFull,
        Stage::NoMiddleFirstInitial,
        Stage::MiddleSingletons,
        Stage::MiddleNonSingletons,
        Stage::MiddleUnambiguous,
        Stage::MiddleAmbiguous,
        Stage::DualInitialCulprit,
        Stage::DualInitialNonCulprit,
        Stage::UnambiguousWithDualInitialRemoved,
        Stage::TrulyAmbiguous,
        Stage::DuplicateFirmAdded,
        Stage::AllIdentities,
        Stage::Merged,
        Stage::MergeRejected,
        Stage::RebuiltFromDuplicateFirm,
    ];

    /// Audit file name for this stage
    pub fn file_name(&self) -> &'static str {
        match self {
            Stage::Singletons => "singletons.txt",
            Stage::NonSingletons => "non singletons.txt",
            Stage::MiddlePresent => "middle name present.txt",
            Stage::NoMiddle => "no middle name present.txt",
            Stage::NoMiddleFirstFull => "no middle name and first name full.txt",
            Stage::NoMiddleFirstInitial => "no middle name and first name initial.txt",
            Stage::MiddleSingletons => "middle name singletons.txt",
            Stage::MiddleNonSingletons => "middle name non singletons.txt",
            Stage::MiddleUnambiguous => "middle name non singletons unambiguous.txt",
            Stage::MiddleAmbiguous => "middle name non singletons ambiguous.txt",
            Stage::DualInitialCulprit => "ambiguous dual initial culprits.txt",
            Stage::DualInitialNonCulprit => "ambiguous dual initial non culprits.txt",
            Stage::UnambiguousWithDualInitialRemoved => "unambiguous with dual initial removed.txt",
            Stage::TrulyAmbiguous => "truly ambiguous.txt",
            Stage::DuplicateFirmAdded => "duplicate firm added.txt",
            Stage::AllIdentities => "all directors.txt",
            Stage::Merged => "merged directors.txt",
            Stage::MergeRejected => "bad merge attempted directors.txt",
            Stage::RebuiltFromDuplicateFirm => "dirs from duplicate firm issue.txt",
        }
    }

    /// Header line written at the top of the audit file
    pub fn title(&self) -> &'static str {
        match self {
            Stage::Singletons => "Directors constructed from an entry with unique (First Initial, Last, Suffix)",
            Stage::NonSingletons => "Directors constructed from entries without a unique (First Initial, Last, Suffix)",
            Stage::MiddlePresent => "Directors constructed from entries with a non-void Middle",
            Stage::NoMiddle => "Directors constructed from entries with a void Middle",
            Stage::NoMiddleFirstFull => "Directors constructed from entries with a void Middle and full First",
            Stage::NoMiddleFirstInitial => "Directors constructed from entries with a void Middle and non-full First",
            Stage::MiddleSingletons => {
                "Directors constructed from an entry with a unique (First Initial, Middle Initial, Last, Suffix)"
            }
            Stage::MiddleNonSingletons => {
                "Directors constructed from entries without a unique (First Initial, Middle Initial, Last, Suffix)"
            }
            Stage::MiddleUnambiguous => "Directors constructed from entries transitive under the name relation",
            Stage::MiddleAmbiguous => "Directors constructed from entries not transitive under the name relation",
            Stage::DualInitialCulprit => "Dual-initial directors causing intransitivity of otherwise transitive entries",
            Stage::DualInitialNonCulprit => "Dual-initial directors alongside entries that stay intransitive",
            Stage::UnambiguousWithDualInitialRemoved => "Directors transitive once dual-initial entries are removed",
            Stage::TrulyAmbiguous => "Directors that remain intransitive with dual-initial entries removed",
            Stage::DuplicateFirmAdded => "Directors for which a duplicate firm was added",
            Stage::AllIdentities => "All directors constructed",
            Stage::Merged => "Directors that were merged together",
            Stage::MergeRejected => "Directors that could not be merged because they sit on the same board",
            Stage::RebuiltFromDuplicateFirm => "Directors rebuilt from a director flagged for duplicate firms",
        }
    }
}

// ============================================================================
// EVENTS
// ============================================================================

/// An identity as it stood when a stage produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedIdentity {
    pub id: IdentityId,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClusterEvent {
    /// Identities produced by (or passing through) a stage
    Classified {
        stage: Stage,
        identities: Vec<ClassifiedIdentity>,
    },

    /// An identity was linked twice to the same firm (first occurrence only)
    DuplicateFirm { identity: IdentityId, name: String, firm_id: String },

    /// Cross-merge succeeded; `absorbed` no longer exists
    Merged {
        absorbing: IdentityId,
        absorbed: IdentityId,
        absorbing_name: String,
        absorbed_name: String,
    },

    /// Cross-merge blocked by a shared board
    MergeRejected {
        absorbing: IdentityId,
        absorbed: IdentityId,
        shared_firms: usize,
    },

    /// A flagged identity was dissolved into finer identities
    Dissolved {
        identity: IdentityId,
        name: String,
        replacements: Vec<IdentityId>,
    },
}

// ============================================================================
// CONTEXT
// ============================================================================

/// Explicit instrumentation state threaded through one clustering run
#[derive(Debug, Clone)]
pub struct ClusterContext {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    counts: BTreeMap<Stage, usize>,
    events: Vec<ClusterEvent>,
}

impl ClusterContext {
    pub fn new() -> Self {
        ClusterContext {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            counts: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn count(&self, stage: Stage) -> usize {
        self.counts.get(&stage).copied().unwrap_or(0)
    }

    pub fn events(&self) -> &[ClusterEvent] {
        &self.events
    }

    /// Record identities produced by a stage (empty lists are counted as zero).
    /// Each identity is described now, since it may be merged away later.
    pub fn classify(&mut self, stage: Stage, identities: &[IdentityId], registry: &BoardRegistry) {
        *self.counts.entry(stage).or_insert(0) += identities.len();
        if identities.is_empty() {
            return;
        }
        tracing::debug!(stage = ?stage, count = identities.len(), "classified identities");
        let identities = identities
            .iter()
            .map(|id| ClassifiedIdentity {
                id: *id,
                description: registry
                    .identity(*id)
                    .map(|identity| identity.describe())
                    .unwrap_or_else(|| format!("{}\n\n", id)),
            })
            .collect();
        self.events.push(ClusterEvent::Classified { stage, identities });
    }

    pub fn duplicate_firm(&mut self, identity: IdentityId, name: String, firm_id: &str) {
        *self.counts.entry(Stage::DuplicateFirmAdded).or_insert(0) += 1;
        tracing::debug!(%identity, %name, firm_id, "duplicate firm link");
        self.events.push(ClusterEvent::DuplicateFirm {
            identity,
            name,
            firm_id: firm_id.to_string(),
        });
    }

    pub fn merged(&mut self, absorbing: IdentityId, absorbed: IdentityId, absorbing_name: String, absorbed_name: String) {
        *self.counts.entry(Stage::Merged).or_insert(0) += 1;
        tracing::debug!(%absorbing, %absorbed, "merged identities");
        self.events.push(ClusterEvent::Merged {
            absorbing,
            absorbed,
            absorbing_name,
            absorbed_name,
        });
    }

    pub fn merge_rejected(&mut self, absorbing: IdentityId, absorbed: IdentityId, shared_firms: usize) {
        *self.counts.entry(Stage::MergeRejected).or_insert(0) += 1;
        tracing::debug!(%absorbing, %absorbed, shared_firms, "merge rejected, shared board");
        self.events.push(ClusterEvent::MergeRejected {
            absorbing,
            absorbed,
            shared_firms,
        });
    }

    pub fn dissolved(&mut self, identity: IdentityId, name: String, replacements: Vec<IdentityId>) {
        tracing::warn!(%identity, %name, replacements = replacements.len(), "dissolved duplicate-firm identity");
        self.events.push(ClusterEvent::Dissolved {
            identity,
            name,
            replacements,
        });
    }

    /// Freeze the context into a serializable report
    pub fn into_report(self, identity_count: usize, organization_count: usize) -> ClusterReport {
        ClusterReport {
            run_id: self.run_id,
            started_at: self.started_at,
            finished_at: Utc::now(),
            identity_count,
            organization_count,
            counts: self.counts,
            events: self.events,
        }
    }
}

impl Default for ClusterContext {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub identity_count: usize,
    pub organization_count: usize,
    pub counts: BTreeMap<Stage, usize>,
    pub events: Vec<ClusterEvent>,
}

impl ClusterReport {
    pub fn count(&self, stage: Stage) -> usize {
        self.counts.get(&stage).copied().unwrap_or(0)
    }

    pub fn summary(&self) -> String {
        format!(
            "Run {}: {} identities across {} organizations ({} merged, {} merges rejected, {} duplicate-firm repairs)",
            self.run_id,
            self.identity_count,
            self.organization_count,
            self.count(Stage::Merged),
            self.count(Stage::MergeRejected),
            self.count(Stage::DuplicateFirmAdded),
        )
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_counts_and_events() {
        let registry = BoardRegistry::new();
        let mut ctx = ClusterContext::new();
        ctx.classify(Stage::Singletons, &[IdentityId(0), IdentityId(1)], &registry);
        ctx.classify(Stage::Singletons, &[IdentityId(2)], &registry);
        ctx.classify(Stage::TrulyAmbiguous, &[], &registry);

        assert_eq!(ctx.count(Stage::Singletons), 3);
        assert_eq!(ctx.count(Stage::TrulyAmbiguous), 0);
        assert_eq!(ctx.events().len(), 2);
    }

    #[test]
    fn test_report_round_trips_through_json() {
        let mut ctx = ClusterContext::new();
        ctx.merged(IdentityId(1), IdentityId(2), "John Jacob Smith".to_string(), "John Smith".to_string());
        ctx.merge_rejected(IdentityId(3), IdentityId(4), 1);

        let report = ctx.into_report(3, 2);
        let json = report.to_json().unwrap();
        let parsed: ClusterReport = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.count(Stage::Merged), 1);
        assert_eq!(parsed.count(Stage::MergeRejected), 1);
        assert_eq!(parsed.events, report.events);
        assert!(report.summary().contains("3 identities across 2 organizations"));
    }

    #[test]
    fn test_every_stage_has_distinct_file() {
        let mut names: Vec<&str> = Stage::ALL.iter().map(|s| s.file_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Stage::ALL.len());
    }
}
