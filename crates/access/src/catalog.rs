//! Loading the access configuration delivered by the backend.
//!
//! An [`AccessCatalog`] is the raw document: tenant nodes, module
//! capabilities, role definitions, an optional delegation table and the menu
//! registry. [`AccessCatalog::build`] validates it into an [`AccessContext`],
//! the set of runtime structures every decision reads.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AccessError, AccessResult};
use crate::menu::{self, MenuGroup, MenuRegistry};
use crate::permission::{EffectivePermissions, ModuleCapabilities, PermissionRegistry};
use crate::role::{Role, RoleCatalog, RoleHierarchy};
use crate::session::Session;
use crate::tenant::{TenantHierarchy, TenantNode};

/// The access configuration document.
///
/// # Examples
///
/// ```
/// use bureau_access::catalog::AccessCatalog;
/// use bureau_access::role::{RoleName, builtin};
///
/// let json = r#"{
///     "tenants": [
///         {"id": "b", "type": "bureau", "name": "Education Bureau"},
///         {"id": "r-1", "type": "region", "name": "Region 1", "parentId": "b"}
///     ],
///     "modules": [
///         {"module": "students", "actions": {"view": ["own", "children", "all"]}}
///     ],
///     "roles": [
///         {"name": "REGIONAL_ADMIN", "permissions": [
///             {"module": "students", "action": "view", "scope": "children"}
///         ]}
///     ]
/// }"#;
///
/// let context = AccessCatalog::from_json(json).unwrap().build().unwrap();
/// let regional = context.roles().get(&RoleName::new(builtin::REGIONAL_ADMIN)).unwrap();
/// assert_eq!(regional.permissions.len(), 1);
/// assert_eq!(context.hierarchy().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessCatalog {
    /// Tenant nodes in any order.
    #[serde(default)]
    pub tenants: Vec<TenantNode>,
    /// Actions and scopes each module supports.
    #[serde(default)]
    pub modules: Vec<ModuleCapabilities>,
    /// Role definitions: grants for built-in roles and custom roles.
    #[serde(default)]
    pub roles: Vec<Role>,
    /// Delegation table; the standard table applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_roles: Option<RoleHierarchy>,
    /// Navigation registry.
    #[serde(default)]
    pub menu: MenuRegistry,
}

impl AccessCatalog {
    /// Parses a catalog document.
    pub fn from_json(json: &str) -> AccessResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validates the document into runtime structures.
    ///
    /// Fails on the first invalid tenant node, role grant or delegation
    /// entry.
    pub fn build(self) -> AccessResult<AccessContext> {
        let hierarchy = TenantHierarchy::from_nodes(self.tenants)?;
        let registry = PermissionRegistry::from_modules(self.modules);

        let mut roles = RoleCatalog::new(registry);
        for role in self.roles {
            roles.register(role)?;
        }
        if let Some(table) = self.managed_roles {
            roles.set_hierarchy(table)?;
        }

        info!(
            tenants = hierarchy.len(),
            roles = roles.roles().len(),
            menu_modules = self.menu.len(),
            "Access catalog loaded"
        );
        Ok(AccessContext {
            hierarchy,
            roles,
            menu: self.menu,
        })
    }
}

/// Validated runtime structures built from an [`AccessCatalog`].
#[derive(Debug, Clone)]
pub struct AccessContext {
    hierarchy: TenantHierarchy,
    roles: RoleCatalog,
    menu: MenuRegistry,
}

impl AccessContext {
    /// Assembles a context from already validated parts.
    pub fn new(hierarchy: TenantHierarchy, roles: RoleCatalog, menu: MenuRegistry) -> Self {
        Self {
            hierarchy,
            roles,
            menu,
        }
    }

    /// The tenant hierarchy.
    pub fn hierarchy(&self) -> &TenantHierarchy {
        &self.hierarchy
    }

    /// The role catalog.
    pub fn roles(&self) -> &RoleCatalog {
        &self.roles
    }

    /// The menu registry.
    pub fn menu(&self) -> &MenuRegistry {
        &self.menu
    }

    /// Checks a session against this context.
    ///
    /// The home tenant must exist at the claimed level, and every role the
    /// session carries must pass [`RoleCatalog::check_session_role`].
    /// Direct grants are not restricted.
    pub fn validate_session(&self, session: &Session) -> Result<(), AccessError> {
        session.validate_against(&self.hierarchy)?;
        for role in session.roles() {
            if let Err(err) = self.roles.check_session_role(role) {
                warn!(
                    session_id = %session.id(),
                    role = %role.name,
                    error = %err,
                    "Rejected session role"
                );
                return Err(err.into());
            }
        }
        Ok(())
    }

    /// Returns `true` if the session holds a role the catalog anchors at the
    /// bureau.
    pub fn is_super_user(&self, session: &Session) -> bool {
        session
            .roles()
            .iter()
            .filter_map(|role| self.roles.get(&role.name))
            .any(Role::is_root_anchored)
    }

    /// Resolves a session's grants.
    ///
    /// Grants a role carries are used only when they pass the catalog's
    /// checks. Otherwise, and for roles sent by name only, the catalog's
    /// grants for that role apply. Roles missing from the catalog grant
    /// nothing.
    pub fn permissions_for(&self, session: &Session) -> EffectivePermissions {
        let role_grants: Vec<&Role> = session
            .roles()
            .iter()
            .filter_map(|role| {
                let known = self.roles.get(&role.name)?;
                if role.permissions.is_empty() || self.roles.check_session_role(role).is_err() {
                    Some(known)
                } else {
                    Some(role)
                }
            })
            .collect();
        let effective = EffectivePermissions::from_grants(
            role_grants.iter().flat_map(|role| role.permissions.iter()),
            session.direct_permissions(),
        );
        debug!(
            session_id = %session.id(),
            effective = effective.len(),
            "Resolved permissions with catalog role grants"
        );
        effective
    }

    /// Composes the session's menu from this context's registry, with the
    /// super-role bypass decided by [`is_super_user`](Self::is_super_user).
    pub fn build_menu(
        &self,
        session: &Session,
        permissions: &EffectivePermissions,
    ) -> Vec<MenuGroup> {
        menu::compose(&self.menu, session, permissions, self.is_super_user(session))
    }
}
