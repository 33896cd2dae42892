// 🔗 Clustering Engine - raw director records → canonical identities
//
// Pipeline per (first initial, last, suffix) group:
//   1. split records by middle name present / absent
//   2. no-middle pipeline: group by exact first name, attach bare initials
//   3. middle pipeline: bucket by (first initial, middle initial), run cascade
//   4. duplicate-firm repair on both pipeline outputs
//   5. cross-merge no-middle identities into matching middle identities
//
// Groups never depend on each other. Buckets are visited in key order and
// every partition is keyed, so input order never changes identity membership.

use crate::cascade::{group_by_full_name, resolve_bucket, CascadeOutcome, RecordGroup};
use crate::entities::{BoardRegistry, IdentityId};
use crate::error::Result;
use crate::record::Record;
use crate::report::{ClusterContext, Stage};
use std::collections::BTreeMap;
use std::sync::Arc;

type GroupKey = (Option<char>, String, String);

// ============================================================================
// CLUSTERING ENGINE
// ============================================================================

/// Single writer over the registry for the duration of one run
pub struct ClusteringEngine<'a> {
    registry: &'a mut BoardRegistry,
    ctx: &'a mut ClusterContext,
}

impl<'a> ClusteringEngine<'a> {
    pub fn new(registry: &'a mut BoardRegistry, ctx: &'a mut ClusterContext) -> Self {
        ClusteringEngine { registry, ctx }
    }

    /// Cluster every record. Returns the final identities sorted by
    /// (last, first, middle, suffix).
    pub fn run(&mut self, records: Vec<Record>) -> Result<Vec<IdentityId>> {
        let record_count = records.len();

        let mut groups: BTreeMap<GroupKey, RecordGroup> = BTreeMap::new();
        for record in records {
            let key = (record.first_init, record.last.clone(), record.suffix.clone());
            groups.entry(key).or_default().push(Arc::new(record));
        }
        tracing::info!(records = record_count, groups = groups.len(), "clustering records");

        let mut from_singletons = Vec::new();
        let mut from_groups = Vec::new();

        for (key, group) in groups {
            if group.len() == 1 {
                from_singletons.push(self.registry.create_identity(group, self.ctx)?);
            } else {
                let _span = tracing::debug_span!(
                    "group",
                    first_init = ?key.0,
                    last = %key.1,
                    suffix = %key.2,
                    size = group.len()
                )
                .entered();
                from_groups.extend(self.resolve_group(group)?);
            }
        }

        self.classify(Stage::Singletons, &from_singletons);
        self.classify(Stage::NonSingletons, &from_groups);

        let mut identities = from_singletons;
        identities.extend(from_groups);
        self.sort_for_presentation(&mut identities);
        self.classify(Stage::AllIdentities, &identities);

        tracing::info!(identities = identities.len(), "clustering finished");
        Ok(identities)
    }

    fn classify(&mut self, stage: Stage, identities: &[IdentityId]) {
        self.ctx.classify(stage, identities, self.registry);
    }

    fn sort_for_presentation(&self, identities: &mut [IdentityId]) {
        let registry = &*self.registry;
        identities.sort_by_cached_key(|id| {
            registry.identity(*id).map(|identity| {
                let (last, first, middle, suffix) = identity.sort_key();
                let first_line = identity.records().iter().map(|r| r.line).min();
                (
                    last.to_string(),
                    first.to_string(),
                    middle.to_string(),
                    suffix.to_string(),
                    first_line,
                )
            })
        });
    }

    // ========================================================================
    // GROUP RESOLVER
    // ========================================================================

    /// Resolve a group of >1 records sharing (first initial, last, suffix)
    pub fn resolve_group(&mut self, group: RecordGroup) -> Result<Vec<IdentityId>> {
        let (with_middle, without_middle): (RecordGroup, RecordGroup) =
            group.into_iter().partition(|r| r.has_middle());

        let no_middle = self.no_middle_pipeline(without_middle)?;
        let middle = self.middle_pipeline(with_middle)?;
        self.classify(Stage::MiddlePresent, &middle);
        self.classify(Stage::NoMiddle, &no_middle);

        let no_middle = self.repair_duplicate_firms(no_middle)?;
        let middle = self.repair_duplicate_firms(middle)?;

        Ok(self.cross_merge(middle, no_middle))
    }

    // ========================================================================
    // NO-MIDDLE PIPELINE
    // ========================================================================

    /// Full first names group by exact string. Bare initials attach to the
    /// only full-first identity if there is exactly one, otherwise they form
    /// their own (deliberately coarse) identity.
    pub fn no_middle_pipeline(&mut self, records: RecordGroup) -> Result<Vec<IdentityId>> {
        let (initial_only, full_first): (RecordGroup, RecordGroup) =
            records.into_iter().partition(|r| r.is_first_init);

        let mut by_first: BTreeMap<String, RecordGroup> = BTreeMap::new();
        for record in full_first {
            by_first.entry(record.first.clone()).or_default().push(record);
        }
        let full_ids = self.build(by_first.into_values())?;

        let mut initial_ids = Vec::new();
        if !initial_only.is_empty() {
            if full_ids.len() == 1 {
                let target = full_ids[0];
                for record in initial_only {
                    self.registry.associate(target, record, self.ctx)?;
                }
            } else {
                initial_ids.push(self.registry.create_identity(initial_only, self.ctx)?);
            }
        }

        self.classify(Stage::NoMiddleFirstFull, &full_ids);
        self.classify(Stage::NoMiddleFirstInitial, &initial_ids);

        let mut identities = full_ids;
        identities.extend(initial_ids);
        Ok(identities)
    }

    // ========================================================================
    // MIDDLE PIPELINE
    // ========================================================================

    /// Bucket by (first initial, middle initial) and resolve each bucket
    pub fn middle_pipeline(&mut self, records: RecordGroup) -> Result<Vec<IdentityId>> {
        let mut buckets: BTreeMap<(Option<char>, Option<char>), RecordGroup> = BTreeMap::new();
        for record in records {
            buckets
                .entry((record.first_init, record.middle_init))
                .or_default()
                .push(record);
        }

        let mut from_singletons = Vec::new();
        let mut from_buckets = Vec::new();
        for bucket in buckets.into_values() {
            let outcome = resolve_bucket(bucket);
            let singleton = matches!(outcome, CascadeOutcome::Singleton(_));
            let ids = self.build_outcome(outcome)?;
            if singleton {
                from_singletons.extend(ids);
            } else {
                from_buckets.extend(ids);
            }
        }

        self.classify(Stage::MiddleSingletons, &from_singletons);
        self.classify(Stage::MiddleNonSingletons, &from_buckets);

        let mut identities = from_singletons;
        identities.extend(from_buckets);
        Ok(identities)
    }

    /// Turn a cascade outcome into identities, classifying the ambiguous ones
    fn build_outcome(&mut self, outcome: CascadeOutcome) -> Result<Vec<IdentityId>> {
        match outcome {
            CascadeOutcome::Singleton(record) => self.build([vec![record]]),

            CascadeOutcome::EquivalenceClasses(classes) => {
                let ids = self.build(classes)?;
                self.classify(Stage::MiddleUnambiguous, &ids);
                Ok(ids)
            }

            CascadeOutcome::DualInitialPlusClasses { dual_initial, classes } => {
                let blob = self.build([dual_initial])?;
                let ids = self.build(classes)?;
                self.classify(Stage::DualInitialCulprit, &blob);
                self.classify(Stage::UnambiguousWithDualInitialRemoved, &ids);

                let mut all = blob;
                all.extend(ids);
                self.classify(Stage::MiddleAmbiguous, &all);
                Ok(all)
            }

            CascadeOutcome::FullyAmbiguous {
                dual_initial,
                by_full_name,
            } => {
                let blob = if dual_initial.is_empty() {
                    Vec::new()
                } else {
                    self.build([dual_initial])?
                };
                let ids = self.build(by_full_name)?;
                self.classify(Stage::DualInitialNonCulprit, &blob);
                self.classify(Stage::TrulyAmbiguous, &ids);

                let mut all = blob;
                all.extend(ids);
                self.classify(Stage::MiddleAmbiguous, &all);
                Ok(all)
            }
        }
    }

    fn build<I>(&mut self, groups: I) -> Result<Vec<IdentityId>>
    where
        I: IntoIterator<Item = RecordGroup>,
    {
        let mut ids = Vec::new();
        for group in groups {
            if !group.is_empty() {
                ids.push(self.registry.create_identity(group, self.ctx)?);
            }
        }
        Ok(ids)
    }

    // ========================================================================
    // DUPLICATE-FIRM REPAIR
    // ========================================================================

    /// Dissolve every identity flagged for a duplicate firm link into one
    /// identity per exact full display name. Unflagged identities pass through.
    ///
    /// Assumes two records with the same full name never share a firm. This is
    /// not verified; a rebuilt identity that is flagged again is kept as is.
    pub fn repair_duplicate_firms(&mut self, identities: Vec<IdentityId>) -> Result<Vec<IdentityId>> {
        let mut repaired = Vec::with_capacity(identities.len());
        let mut rebuilt = Vec::new();

        for id in identities {
            let (flagged, name) = match self.registry.identity(id) {
                Some(identity) => (identity.is_flagged(), identity.to_string()),
                None => continue,
            };
            if !flagged {
                repaired.push(id);
                continue;
            }

            let records = self.registry.discard(id);
            let replacements = self.build(group_by_full_name(records))?;

            for replacement in &replacements {
                if let Some(identity) = self.registry.identity(*replacement) {
                    if identity.is_flagged() {
                        tracing::warn!(
                            identity = %replacement,
                            name = %identity,
                            "rebuilt identity still links a firm twice; same full name on one board"
                        );
                    }
                }
            }

            self.ctx.dissolved(id, name, replacements.clone());
            rebuilt.extend(replacements.iter().copied());
            repaired.extend(replacements);
        }

        self.classify(Stage::RebuiltFromDuplicateFirm, &rebuilt);
        Ok(repaired)
    }

    // ========================================================================
    // CROSS-PIPELINE MERGE
    // ========================================================================

    /// Fold no-middle identities into the unique middle identity sharing
    /// (first, last, suffix), unless the two share a board. Bare-initial first
    /// names never take part. Each middle identity gets at most one attempt.
    pub fn cross_merge(&mut self, with_middle: Vec<IdentityId>, without_middle: Vec<IdentityId>) -> Vec<IdentityId> {
        let mut index: BTreeMap<(String, String, String), Vec<IdentityId>> = BTreeMap::new();
        for id in &with_middle {
            if let Some(identity) = self.registry.identity(*id) {
                if !identity.is_first_init() {
                    let key = (
                        identity.first().to_string(),
                        identity.last().to_string(),
                        identity.suffix().to_string(),
                    );
                    index.entry(key).or_default().push(*id);
                }
            }
        }

        let mut unmerged = Vec::new();
        for id in without_middle {
            let key = match self.registry.identity(id) {
                Some(identity) if !identity.is_first_init() => (
                    identity.first().to_string(),
                    identity.last().to_string(),
                    identity.suffix().to_string(),
                ),
                Some(_) => {
                    unmerged.push(id);
                    continue;
                }
                None => continue,
            };

            let target = match index.get_mut(&key) {
                Some(candidates) if candidates.len() == 1 => candidates.pop(),
                _ => None,
            };

            let merged = match target {
                Some(target) => self.registry.absorb(target, id, self.ctx),
                None => false,
            };
            if !merged {
                unmerged.push(id);
            }
        }

        let mut identities = with_middle;
        identities.extend(unmerged);
        identities
    }
}

/// Convenience wrapper: run the engine once over `records`
pub fn cluster_records(
    records: Vec<Record>,
    registry: &mut BoardRegistry,
    ctx: &mut ClusterContext,
) -> Result<Vec<IdentityId>> {
    ClusteringEngine::new(registry, ctx).run(records)
}

// ============================================================================
// TESTS
// ============================================================================
