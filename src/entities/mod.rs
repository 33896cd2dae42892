// Entity Models
//
// Identity <-> Organization is a cyclic relationship (directors sit on boards,
// boards list their directors). Neither side holds the other directly: both
// refer to stable index ids owned by the BoardRegistry.

pub mod identity;
pub mod organization;
pub mod registry;

pub use identity::Identity;
pub use organization::Organization;
pub use registry::BoardRegistry;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle to an Identity slot in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IdentityId(pub usize);

/// Stable handle to an Organization in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrganizationId(pub usize);

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "identity#{}", self.0)
    }
}

impl fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "organization#{}", self.0)
    }
}
