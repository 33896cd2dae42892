// Directorship - Core Library
// Clusters raw board-membership records into director identities.
// Exposes all modules for use in the CLI and tests.

pub mod audit;       // Per-stage audit trail + report.json
pub mod cascade;     // Ambiguity cascade over one middle-initial bucket
pub mod clustering;  // Group resolver, pipelines, repair, cross-merge
pub mod config;      // Column layout + void sentinel
pub mod entities;    // Identity / Organization registry
pub mod error;
pub mod export;      // Edge lists + alias lists
pub mod graph;       // Co-membership weight matrices
pub mod names;       // Name compatibility relation
pub mod reader;      // Headered CSV → Records
pub mod record;
pub mod report;      // ClusterContext, events, ClusterReport

// Re-export commonly used types
pub use audit::write_audit;
pub use cascade::{CascadeOutcome, CompatibilityRelation, RecordGroup};
pub use clustering::{cluster_records, ClusteringEngine};
pub use config::{ColumnLayout, RunConfig, DEFAULT_VOID_SENTINEL};
pub use entities::{BoardRegistry, Identity, IdentityId, Organization, OrganizationId};
pub use error::{DirectorshipError, Result};
pub use export::{write_aliases, write_edge_list};
pub use graph::CoMembershipGraph;
pub use names::names_compatible;
pub use reader::{read_directorships, read_directorships_from, Dataset};
pub use record::{RawRecord, Record};
pub use report::{ClassifiedIdentity, ClusterContext, ClusterEvent, ClusterReport, Stage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
