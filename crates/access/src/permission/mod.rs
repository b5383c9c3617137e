//! Permissions: the grant model, the module registry and the resolver.
//!
//! A [`Permission`] grants one [`Action`] on one module, optionally for a
//! single resource type, at a [`Scope`]. Sessions collect grants from their
//! roles and from direct assignments; [`EffectivePermissions`] folds them
//! into the set every gate, filter and menu decision reads.
//!
//! # Override Rule
//!
//! Grants are keyed by `(module, action, resourceType ?? any)`. Role grants
//! are applied in role order and direct grants last, so a direct grant always
//! replaces a role grant with the same key, whether it widens or narrows it.
//!
//! # Examples
//!
//! ```
//! use bureau_access::permission::{Action, ModuleName, PermissionCheck, Scope};
//!
//! let check = PermissionCheck::new("students", Action::View).for_resource("transcript");
//! assert_eq!(check.module, ModuleName::new("students"));
//! assert_eq!(check.to_string(), "students:view:transcript");
//! assert!(Scope::Children < Scope::All);
//! ```

mod registry;
mod resolver;
mod types;

pub use registry::{ModuleCapabilities, PermissionRegistry};
pub use resolver::EffectivePermissions;
pub use types::{Action, ModuleName, Permission, PermissionCheck, PermissionKey, Scope};
