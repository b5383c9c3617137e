//! Bureau Console Access Engine
//!
//! This crate decides what a signed-in user of the education bureau console
//! may do and see. It models the administrative hierarchy
//! (bureau, region, zone, woreda, kebele, institution), resolves a user's
//! roles and direct grants into an effective permission set, narrows data to
//! the user's place in the hierarchy, and composes the navigation menu.
//!
//! # Features
//!
//! - **Tenant Hierarchy**: Validated tree with ancestor walks and subtree indexes
//! - **Roles**: Built-in roles anchored to levels, custom roles, delegation table
//! - **Permissions**: Module/action/resource-type grants with `own`, `children`
//!   and `all` scopes, direct grants overriding role grants
//! - **Scope Resolution**: Drill-down selection of zone, woreda and school
//! - **Data Scoping**: Filtering tenant-tagged records to the effective scope
//! - **Gates and Menus**: Predicate gates and permission-aware navigation
//!
//! # Architecture
//!
//! - [`tenant`] - Tenant identifiers, levels and the hierarchy
//! - [`role`] - Role definitions, the managed-roles table and the role catalog
//! - [`permission`] - Grant model, module registry and permission resolver
//! - [`session`] - The authenticated session supplied by the login layer
//! - [`scope`] - Drill-down selection and effective tenant resolution
//! - [`filter`] - Scope-based record filtering
//! - [`gate`] - Access gates for guarded elements
//! - [`menu`] - Menu registry and composer
//! - [`catalog`] - Loading the backend's access configuration
//! - [`error`] - Error types for all construction-time validation
//!
//! # Quick Start
//!
//! ```
//! use bureau_access::filter::{TenantTagged, scope_data};
//! use bureau_access::permission::{Action, EffectivePermissions, Permission, PermissionCheck, Scope};
//! use bureau_access::role::{Role, builtin};
//! use bureau_access::scope::ScopeSelection;
//! use bureau_access::session::Session;
//! use bureau_access::tenant::{TenantHierarchy, TenantId, TenantNode, TenantType};
//!
//! let hierarchy = TenantHierarchy::from_nodes(vec![
//!     TenantNode::new("b", TenantType::Bureau, "Bureau", None),
//!     TenantNode::new("r1", TenantType::Region, "Region 1", Some("b".into())),
//!     TenantNode::new("z1", TenantType::Zone, "Zone 1", Some("r1".into())),
//!     TenantNode::new("w1", TenantType::Woreda, "Woreda 1", Some("z1".into())),
//!     TenantNode::new("s1", TenantType::Institution, "School 1", Some("w1".into())),
//! ])
//! .unwrap();
//!
//! let session = Session::builder()
//!     .id("u-1")
//!     .role(
//!         Role::builtin(builtin::ZONE_ADMIN)
//!             .unwrap()
//!             .with_permission(Permission::new("students", Action::View, Scope::Children)),
//!     )
//!     .tenant("z1", TenantType::Zone, "Zone 1")
//!     .build()
//!     .unwrap();
//!
//! let permissions = EffectivePermissions::resolve(&session);
//! let check = PermissionCheck::new("students", Action::View);
//! assert!(permissions.has_permission(&check));
//!
//! struct Student {
//!     school: TenantId,
//! }
//! impl TenantTagged for Student {
//!     fn tenant_tag(&self) -> Option<&TenantId> {
//!         Some(&self.school)
//!     }
//! }
//!
//! let selection = ScopeSelection::default()
//!     .select_woreda(&TenantId::new("w1"), &session, &hierarchy)
//!     .unwrap();
//! let effective = selection.effective_tenant(&session);
//! let students = vec![Student { school: TenantId::new("s1") }];
//! let scope = permissions.scope_for(&check).unwrap();
//! assert_eq!(scope_data(&students, &effective, scope, &hierarchy).len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod catalog;
pub mod error;
pub mod filter;
pub mod gate;
pub mod menu;
pub mod permission;
pub mod role;
pub mod scope;
pub mod session;
pub mod tenant;

// Re-export commonly used types at crate root
pub use catalog::{AccessCatalog, AccessContext};
pub use error::{AccessError, AccessResult};
pub use filter::{ScopeFilter, TenantTagged, scope_data, scope_data_by};
pub use gate::{AccessGate, GateRequirement};
pub use menu::{MenuGroup, MenuItem, MenuRegistry, ModuleEntry, build_menu};
pub use permission::{Action, EffectivePermissions, Permission, PermissionCheck, Scope};
pub use role::{Role, RoleCatalog, RoleHierarchy, RoleName};
pub use scope::{EffectiveTenant, ScopeSelection, SelectionCell, effective_tenant};
pub use session::Session;
pub use tenant::{TenantHierarchy, TenantId, TenantNode, TenantType};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
