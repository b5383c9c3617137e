//! The administrative tenant hierarchy.
//!
//! Every piece of data in the console belongs to a node of a strict tree:
//!
//! ```text
//! bureau > region > zone > woreda > kebele > institution
//! ```
//!
//! # Core Types
//!
//! - [`TenantId`] - Opaque identifier of a node
//! - [`TenantType`] - The closed set of administrative levels
//! - [`TenantNode`] - One node as delivered by the backend
//! - [`TenantHierarchy`] - The validated tree with ancestor and subtree queries
//! - [`SubtreeIndex`] - Precomputed subtree membership used by the data filter
//!
//! # Examples
//!
//! ```
//! use bureau_access::tenant::{TenantHierarchy, TenantId, TenantNode, TenantType};
//!
//! let hierarchy = TenantHierarchy::from_nodes(vec![
//!     TenantNode::new("bureau", TenantType::Bureau, "Bureau", None),
//!     TenantNode::new("r-1", TenantType::Region, "Region", Some("bureau".into())),
//! ])
//! .unwrap();
//!
//! let region = TenantId::new("r-1");
//! assert_eq!(hierarchy.tenant_type(&region), Some(TenantType::Region));
//! assert_eq!(hierarchy.ancestors(&region).count(), 1);
//! ```

mod hierarchy;
mod id;
mod level;

pub use hierarchy::{Ancestors, SubtreeIndex, TenantHierarchy, TenantNode};
pub use id::TenantId;
pub use level::TenantType;
