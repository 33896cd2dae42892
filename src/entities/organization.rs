// 🏢 Organization Entity - one firm and the identities on its board

use crate::entities::{IdentityId, OrganizationId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub firm_id: String,
    pub firm_name: String,

    /// Back-references, kept consistent with each Identity's forward links
    directors: BTreeSet<IdentityId>,
}

impl Organization {
    pub(crate) fn new(id: OrganizationId, firm_id: String, firm_name: String) -> Self {
        Organization {
            id,
            firm_id,
            firm_name,
            directors: BTreeSet::new(),
        }
    }

    pub fn directors(&self) -> &BTreeSet<IdentityId> {
        &self.directors
    }

    pub(crate) fn add_director(&mut self, identity: IdentityId) {
        self.directors.insert(identity);
    }

    pub(crate) fn remove_director(&mut self, identity: IdentityId) {
        self.directors.remove(&identity);
    }

    /// Number of directors sitting on both boards
    pub fn shared_directors(&self, other: &Organization) -> usize {
        self.directors.intersection(&other.directors).count()
    }

    /// Label used in firm edge lists
    pub fn label(&self) -> &str {
        &self.firm_id
    }
}

impl fmt::Display for Organization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.firm_id)
    }
}
