// 🗂️ Board Registry - index-based owner of Identities and Organizations
//
// All link mutations go through here so that an Identity's forward links and
// each Organization's back-references never drift apart.
//
// Single writer (the clustering engine) for the whole run, so no locking.

use crate::entities::{Identity, IdentityId, Organization, OrganizationId};
use crate::error::{DirectorshipError, Result};
use crate::record::Record;
use crate::report::ClusterContext;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct BoardRegistry {
    /// Identity slots; a discarded identity leaves `None` behind
    identities: Vec<Option<Identity>>,

    organizations: Vec<Organization>,

    /// firm id -> organization
    firm_index: HashMap<String, OrganizationId>,
}

impl BoardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // ORGANIZATIONS
    // ========================================================================

    /// Get or create the organization for a firm id (first-seen name wins)
    pub fn ensure_organization(&mut self, firm_id: &str, firm_name: &str) -> OrganizationId {
        if let Some(id) = self.firm_index.get(firm_id) {
            return *id;
        }
        let id = OrganizationId(self.organizations.len());
        self.organizations
            .push(Organization::new(id, firm_id.to_string(), firm_name.to_string()));
        self.firm_index.insert(firm_id.to_string(), id);
        id
    }

    pub fn organization_for_firm(&self, firm_id: &str) -> Option<OrganizationId> {
        self.firm_index.get(firm_id).copied()
    }

    pub fn organization(&self, id: OrganizationId) -> Option<&Organization> {
        self.organizations.get(id.0)
    }

    pub fn organizations(&self) -> &[Organization] {
        &self.organizations
    }

    /// Directors shared by two organizations
    pub fn organization_co_membership(&self, a: OrganizationId, b: OrganizationId) -> usize {
        match (self.organization(a), self.organization(b)) {
            (Some(a), Some(b)) => a.shared_directors(b),
            _ => 0,
        }
    }

    // ========================================================================
    // IDENTITIES
    // ========================================================================

    pub fn identity(&self, id: IdentityId) -> Option<&Identity> {
        self.identities.get(id.0).and_then(|slot| slot.as_ref())
    }

    fn identity_mut(&mut self, id: IdentityId) -> Option<&mut Identity> {
        self.identities.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    /// All identities that have not been merged away or dissolved
    pub fn live_identities(&self) -> impl Iterator<Item = &Identity> {
        self.identities.iter().filter_map(|slot| slot.as_ref())
    }

    /// Boards shared by two identities
    pub fn co_membership(&self, a: IdentityId, b: IdentityId) -> usize {
        match (self.identity(a), self.identity(b)) {
            (Some(a), Some(b)) => a.shared_organizations(b),
            _ => 0,
        }
    }

    fn firm_of(&self, record: &Record) -> Result<OrganizationId> {
        self.organization_for_firm(&record.firm_id)
            .ok_or_else(|| DirectorshipError::UnknownFirm {
                firm_id: record.firm_id.clone(),
                line: record.line,
            })
    }

    /// Build one identity from a non-empty set of records: the first seeds it,
    /// the rest are associated, and every record's firm is linked.
    ///
    /// # Panics
    /// If `records` is empty.
    pub fn create_identity(
        &mut self,
        records: Vec<Arc<Record>>,
        ctx: &mut ClusterContext,
    ) -> Result<IdentityId> {
        let mut records = records.into_iter();
        let seed = records
            .next()
            .expect("an identity is never created from zero records");

        let firm = self.firm_of(&seed)?;
        let id = IdentityId(self.identities.len());
        self.identities.push(Some(Identity::new(id, seed)));
        self.link(id, firm, ctx);

        for record in records {
            self.associate(id, record, ctx)?;
        }
        Ok(id)
    }

    /// Merge one more record into an existing identity and link its firm
    pub fn associate(
        &mut self,
        id: IdentityId,
        record: Arc<Record>,
        ctx: &mut ClusterContext,
    ) -> Result<()> {
        let firm = self.firm_of(&record)?;
        if let Some(identity) = self.identity_mut(id) {
            identity.associate(record);
        }
        self.link(id, firm, ctx);
        Ok(())
    }

    /// Link an identity to an organization on both sides. A repeated link is
    /// not an error: it flags the identity as a likely false fusion.
    pub fn link(&mut self, id: IdentityId, organization: OrganizationId, ctx: &mut ClusterContext) {
        let Some(identity) = self.identities.get_mut(id.0).and_then(|slot| slot.as_mut()) else {
            return;
        };
        let already_flagged = identity.is_flagged();
        let added = identity.add_organization(organization);

        if !added && !already_flagged {
            let name = identity.to_string();
            let firm_id = self
                .organizations
                .get(organization.0)
                .map(|o| o.firm_id.as_str())
                .unwrap_or_default();
            ctx.duplicate_firm(id, name, firm_id);
        }

        if let Some(org) = self.organizations.get_mut(organization.0) {
            org.add_director(id);
        }
    }

    /// Remove every organization link of an identity, on both sides
    pub fn sever(&mut self, id: IdentityId) {
        let Some(identity) = self.identity_mut(id) else {
            return;
        };
        for organization in identity.take_organizations() {
            if let Some(org) = self.organizations.get_mut(organization.0) {
                org.remove_director(id);
            }
        }
    }

    /// Sever and drop an identity, handing back its records
    pub fn discard(&mut self, id: IdentityId) -> Vec<Arc<Record>> {
        self.sever(id);
        self.identities
            .get_mut(id.0)
            .and_then(|slot| slot.take())
            .map(|mut identity| identity.take_records())
            .unwrap_or_default()
    }

    /// Guarded cross-merge: `into` (has a middle) absorbs `from` (has none)
    /// unless they share a board. Returns whether the merge happened.
    ///
    /// # Panics
    /// If `into` lacks a middle name or `from` has one. That combination is a
    /// caller bug, not a data condition.
    pub fn absorb(&mut self, into: IdentityId, from: IdentityId, ctx: &mut ClusterContext) -> bool {
        let (Some(absorbing), Some(absorbed)) = (self.identity(into), self.identity(from)) else {
            return false;
        };
        assert!(
            absorbing.has_middle(),
            "identity {} has no middle name and is trying to absorb",
            absorbing
        );
        assert!(
            !absorbed.has_middle(),
            "identity {} to be absorbed has a middle name",
            absorbed
        );

        let shared = absorbing.shared_organizations(absorbed);
        if shared > 0 {
            ctx.merge_rejected(into, from, shared);
            return false;
        }

        let absorbing_name = absorbing.to_string();
        let absorbed_name = absorbed.to_string();

        let organizations: Vec<OrganizationId> = absorbed.organizations().iter().copied().collect();
        let records = self.discard(from);
        if let Some(identity) = self.identity_mut(into) {
            for record in records {
                identity.associate(record);
            }
        }
        for organization in organizations {
            self.link(into, organization, ctx);
        }

        ctx.merged(into, from, absorbing_name, absorbed_name);
        true
    }
}

// ============================================================================
// TESTS
// ============================================================================
