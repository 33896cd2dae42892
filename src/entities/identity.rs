// 👤 Identity Entity - one believed-real person
//
// "Names only widen": an initial is replaced by a spelled-out name when one is
// merged in, never the reverse. Last name and suffix are fixed at creation.

use crate::entities::{IdentityId, OrganizationId};
use crate::record::{is_initial, name_len, Record};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// IDENTITY ENTITY
// ============================================================================

#[derive(Debug, Clone)]
pub struct Identity {
    /// Stable registry slot - never reused
    pub id: IdentityId,

    first: String,
    middle: String,
    last: String,
    suffix: String,

    /// Records merged in, in merge order (never empty)
    records: Vec<Arc<Record>>,

    /// Board memberships
    organizations: BTreeSet<OrganizationId>,

    /// Sticky: set the first time a firm link is added twice
    duplicate_firm: bool,
}

impl Identity {
    /// Seed an identity from its first record. Organization links are added
    /// separately through the registry so both sides stay consistent.
    pub(crate) fn new(id: IdentityId, seed: Arc<Record>) -> Self {
        Identity {
            id,
            first: seed.first.clone(),
            middle: seed.middle.clone(),
            last: seed.last.clone(),
            suffix: seed.suffix.clone(),
            records: vec![seed],
            organizations: BTreeSet::new(),
            duplicate_firm: false,
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn middle(&self) -> &str {
        &self.middle
    }

    pub fn last(&self) -> &str {
        &self.last
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn is_first_init(&self) -> bool {
        is_initial(&self.first)
    }

    pub fn has_middle(&self) -> bool {
        !self.middle.is_empty()
    }

    pub fn records(&self) -> &[Arc<Record>] {
        &self.records
    }

    pub fn organizations(&self) -> &BTreeSet<OrganizationId> {
        &self.organizations
    }

    pub fn is_flagged(&self) -> bool {
        self.duplicate_firm
    }

    /// Absorb a record, widening first/middle when the record's is longer
    pub(crate) fn associate(&mut self, record: Arc<Record>) {
        debug_assert_eq!(record.last, self.last);
        debug_assert_eq!(record.suffix, self.suffix);

        if name_len(&record.first) > name_len(&self.first) {
            self.first = record.first.clone();
        }
        if name_len(&record.middle) > name_len(&self.middle) {
            self.middle = record.middle.clone();
        }
        self.records.push(record);
    }

    /// Returns false (and raises the flag) when the link already existed
    pub(crate) fn add_organization(&mut self, organization: OrganizationId) -> bool {
        if self.organizations.insert(organization) {
            true
        } else {
            self.duplicate_firm = true;
            false
        }
    }

    pub(crate) fn take_organizations(&mut self) -> BTreeSet<OrganizationId> {
        std::mem::take(&mut self.organizations)
    }

    pub(crate) fn take_records(&mut self) -> Vec<Arc<Record>> {
        std::mem::take(&mut self.records)
    }

    // ========================================================================
    // ACCESSORS FOR SERIALIZATION / REPORTING
    // ========================================================================

    /// Longest alias ever merged in; ties go to the first seen
    pub fn label(&self) -> &str {
        let mut best: Option<&str> = None;
        for record in &self.records {
            match best {
                Some(current) if name_len(&record.full_name) <= name_len(current) => {}
                _ => best = Some(record.full_name.as_str()),
            }
        }
        best.unwrap_or("")
    }

    /// Distinct display strings merged into this identity
    pub fn aliases(&self) -> BTreeSet<&str> {
        self.records.iter().map(|r| r.full_name.as_str()).collect()
    }

    /// Number of boards shared with another identity
    pub fn shared_organizations(&self, other: &Identity) -> usize {
        self.organizations.intersection(&other.organizations).count()
    }

    /// Deterministic presentation order: (last, first, middle, suffix)
    pub fn sort_key(&self) -> (&str, &str, &str, &str) {
        (&self.last, &self.first, &self.middle, &self.suffix)
    }

    /// Multi-line description used by the audit trail
    pub fn describe(&self) -> String {
        let aliases: Vec<&str> = self.aliases().into_iter().collect();
        let entries: Vec<String> = self.records.iter().map(|r| r.to_string()).collect();
        let addresses: BTreeSet<&str> = self.records.iter().map(|r| r.address.as_str()).collect();

        format!(
            "{}\n\taliases: {}\n\tentries: {}\n\taddresses: {}\n\n",
            self,
            aliases.join(", "),
            entries.join(", "),
            addresses.into_iter().collect::<Vec<_>>().join(", "),
        )
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = [&self.first, &self.middle, &self.last, &self.suffix];
        let name: Vec<&str> = parts
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| p.as_str())
            .collect();
        write!(f, "{}", name.join(" "))
    }
}

// ============================================================================
// TESTS
// ============================================================================
