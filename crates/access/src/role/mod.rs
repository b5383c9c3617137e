//! Roles and the role delegation hierarchy.
//!
//! # Core Types
//!
//! - [`RoleName`] - Exact-match role identifier
//! - [`Role`] - Grants bundled under a name and anchored to a hierarchy level
//! - [`RoleHierarchy`] - Which roles each role may provision
//! - [`RoleCatalog`] - Built-in and custom roles validated against the
//!   [`PermissionRegistry`](crate::permission::PermissionRegistry)
//!
//! # Built-in Roles
//!
//! | Role | Anchor | Provisions |
//! |------|--------|------------|
//! | `SYSTEM_ADMIN` | bureau | `REGIONAL_ADMIN` |
//! | `REGIONAL_ADMIN` | region | `ZONE_ADMIN` |
//! | `ZONE_ADMIN` | zone | `WOREDA_ADMIN` |
//! | `WOREDA_ADMIN` | woreda | `KEBELE_ADMIN` |
//! | `KEBELE_ADMIN` | kebele | `INSTITUTION_ADMIN` |
//! | `INSTITUTION_ADMIN` | institution | `INSTRUCTOR`, `REGISTRAR`, `ACCOUNTANT`, `STUDENT` |
//! | `INSTRUCTOR`, `REGISTRAR`, `ACCOUNTANT`, `STUDENT` | institution | nothing |

mod catalog;
mod hierarchy;
mod model;

pub use catalog::RoleCatalog;
pub use hierarchy::RoleHierarchy;
pub use model::{BUILTIN_ROLES, Role, RoleName, builtin};
