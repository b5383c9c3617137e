//! The role catalog: built-in roles plus custom roles from the backend,
//! validated against the permission registry.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::hierarchy::RoleHierarchy;
use super::model::{BUILTIN_ROLES, Role, RoleName};
use crate::error::CatalogError;
use crate::permission::{PermissionRegistry, Scope};
use crate::tenant::TenantType;

/// Every role known to the console and the delegation table between them.
///
/// The catalog starts with the built-in roles (no grants) and the standard
/// delegation table. Role definitions returned by the backend are added with
/// [`register`](Self::register); a definition for a built-in name replaces
/// that role's grants.
#[derive(Debug, Clone)]
pub struct RoleCatalog {
    roles: Vec<Role>,
    index: HashMap<RoleName, usize>,
    hierarchy: RoleHierarchy,
    registry: PermissionRegistry,
}

impl RoleCatalog {
    /// Creates a catalog with the built-in roles and the standard delegation table.
    pub fn new(registry: PermissionRegistry) -> Self {
        let mut catalog = Self {
            roles: Vec::with_capacity(BUILTIN_ROLES.len()),
            index: HashMap::new(),
            hierarchy: RoleHierarchy::standard(),
            registry,
        };
        for (name, anchor) in BUILTIN_ROLES {
            catalog.insert(Role::new(name, anchor));
        }
        catalog
    }

    fn insert(&mut self, role: Role) {
        self.index.insert(role.name.clone(), self.roles.len());
        self.roles.push(role);
    }

    /// Validates and adds a role definition.
    ///
    /// Fails when a grant is not supported by the registry, when a role not
    /// anchored at the bureau carries an unrestricted grant, when a custom
    /// role has no anchor, or when a custom role name is registered twice.
    pub fn register(&mut self, role: Role) -> Result<(), CatalogError> {
        let builtin = role.name.builtin_anchor();
        let anchor = match (builtin, role.anchor_type) {
            (Some(expected), Some(actual)) if expected != actual => {
                return Err(CatalogError::AnchorMismatch {
                    role: role.name,
                    expected,
                    actual,
                });
            }
            (Some(anchor), _) | (None, Some(anchor)) => anchor,
            (None, None) => return Err(CatalogError::MissingAnchor { role: role.name }),
        };
        self.check_grants(&role, anchor)?;

        let role = Role {
            anchor_type: Some(anchor),
            ..role
        };

        match self.index.get(&role.name).copied() {
            Some(slot) if builtin.is_some() => {
                debug!(
                    role = %role.name,
                    grants = role.permissions.len(),
                    "Replaced built-in role grants"
                );
                self.roles[slot] = role;
            }
            Some(_) => return Err(CatalogError::DuplicateRole { role: role.name }),
            None => {
                debug!(role = %role.name, anchor = %anchor, "Registered custom role");
                self.insert(role);
            }
        }
        Ok(())
    }

    /// Checks a role as carried by a session against its catalog entry.
    ///
    /// The role must be in the catalog, a declared anchor must match the
    /// catalog's, and any grants it carries must pass the checks applied by
    /// [`register`](Self::register).
    pub fn check_session_role(&self, role: &Role) -> Result<(), CatalogError> {
        let known = self.get(&role.name).ok_or_else(|| CatalogError::UnknownRole {
            role: role.name.clone(),
        })?;
        let expected = known.anchor().ok_or_else(|| CatalogError::MissingAnchor {
            role: role.name.clone(),
        })?;
        if let Some(actual) = role.anchor_type.filter(|actual| *actual != expected) {
            return Err(CatalogError::AnchorMismatch {
                role: role.name.clone(),
                expected,
                actual,
            });
        }
        self.check_grants(role, expected)
    }

    fn check_grants(&self, role: &Role, anchor: TenantType) -> Result<(), CatalogError> {
        for permission in &role.permissions {
            self.registry.validate(permission)?;
            if permission.scope == Scope::All && anchor != TenantType::Bureau {
                return Err(CatalogError::UnrestrictedScopeNotAllowed {
                    role: role.name.clone(),
                    anchor,
                    module: permission.module.clone(),
                });
            }
        }
        Ok(())
    }

    /// Replaces the delegation table after checking every name it references.
    pub fn set_hierarchy(&mut self, hierarchy: RoleHierarchy) -> Result<(), CatalogError> {
        if let Some(unknown) = hierarchy
            .referenced_roles()
            .find(|name| !self.index.contains_key(*name))
        {
            warn!(role = %unknown, "Rejected delegation table with unknown role");
            return Err(CatalogError::UnknownRole {
                role: unknown.clone(),
            });
        }
        self.hierarchy = hierarchy;
        Ok(())
    }

    /// Looks up a role.
    pub fn get(&self, name: &RoleName) -> Option<&Role> {
        self.index.get(name).map(|&slot| &self.roles[slot])
    }

    /// All roles: built-ins in table order, then custom roles in registration order.
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// The delegation table.
    pub fn hierarchy(&self) -> &RoleHierarchy {
        &self.hierarchy
    }

    /// The permission registry roles are validated against.
    pub fn registry(&self) -> &PermissionRegistry {
        &self.registry
    }

    /// The roles `creator` may provision. Unknown creators manage nothing.
    pub fn managed_roles(&self, creator: &RoleName) -> Vec<&Role> {
        self.hierarchy
            .managed_roles(creator)
            .iter()
            .filter_map(|name| self.get(name))
            .collect()
    }

    /// Returns `true` if `creator` may provision `target`.
    pub fn can_manage(&self, creator: &RoleName, target: &RoleName) -> bool {
        self.hierarchy.can_manage(creator, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::{Action, ModuleCapabilities, Permission};
    use crate::role::builtin;

    fn registry() -> PermissionRegistry {
        PermissionRegistry::new()
            .with_module(
                ModuleCapabilities::new("hr")
                    .action(Action::View, [Scope::Own, Scope::Children, Scope::All])
                    .action(Action::Edit, [Scope::Own, Scope::Children, Scope::All]),
            )
            .with_module(ModuleCapabilities::new("library").action(Action::View, [Scope::Own]))
    }

    #[test]
    fn test_builtins_present() {
        let catalog = RoleCatalog::new(registry());
        assert_eq!(catalog.roles().len(), BUILTIN_ROLES.len());
        let zone = catalog.get(&RoleName::new(builtin::ZONE_ADMIN)).unwrap();
        assert_eq!(zone.anchor(), Some(TenantType::Zone));
        assert!(zone.permissions.is_empty());
    }

    #[test]
    fn test_register_replaces_builtin_grants() {
        let mut catalog = RoleCatalog::new(registry());
        catalog
            .register(
                Role::builtin(builtin::ZONE_ADMIN)
                    .unwrap()
                    .with_permission(Permission::new("hr", Action::View, Scope::Children)),
            )
            .unwrap();
        let zone = catalog.get(&RoleName::new(builtin::ZONE_ADMIN)).unwrap();
        assert_eq!(zone.permissions.len(), 1);
        assert_eq!(catalog.roles().len(), BUILTIN_ROLES.len());
    }

    #[test]
    fn test_register_rejects_unrestricted_scope_below_bureau() {
        let mut catalog = RoleCatalog::new(registry());
        let err = catalog
            .register(
                Role::builtin(builtin::REGIONAL_ADMIN)
                    .unwrap()
                    .with_permission(Permission::new("hr", Action::View, Scope::All)),
            )
            .unwrap_err();
        assert!(matches!(err, CatalogError::UnrestrictedScopeNotAllowed { .. }));

        catalog
            .register(
                Role::builtin(builtin::SYSTEM_ADMIN)
                    .unwrap()
                    .with_permission(Permission::new("hr", Action::View, Scope::All)),
            )
            .unwrap();
    }

    #[test]
    fn test_register_custom_role() {
        let mut catalog = RoleCatalog::new(registry());
        catalog
            .register(
                Role::new("LIBRARIAN", TenantType::Institution)
                    .with_permission(Permission::new("library", Action::View, Scope::Own)),
            )
            .unwrap();
        assert!(catalog.get(&RoleName::new("LIBRARIAN")).is_some());

        let dup = catalog.register(Role::new("LIBRARIAN", TenantType::Institution));
        assert!(matches!(dup, Err(CatalogError::DuplicateRole { .. })));
    }

    #[test]
    fn test_register_validation_failures() {
        let mut catalog = RoleCatalog::new(registry());
        let unanchored = Role {
            name: RoleName::new("GUEST"),
            anchor_type: None,
            permissions: Vec::new(),
        };
        assert!(matches!(
            catalog.register(unanchored),
            Err(CatalogError::MissingAnchor { .. })
        ));

        let moved = Role::new(builtin::ZONE_ADMIN, TenantType::Region);
        assert!(matches!(
            catalog.register(moved),
            Err(CatalogError::AnchorMismatch { .. })
        ));

        let unsupported = Role::new("LIBRARIAN", TenantType::Institution)
            .with_permission(Permission::new("library", Action::Delete, Scope::Own));
        assert!(matches!(
            catalog.register(unsupported),
            Err(CatalogError::UnsupportedAction { .. })
        ));
    }

    #[test]
    fn test_check_session_role() {
        let mut catalog = RoleCatalog::new(registry());
        catalog
            .register(Role::new("HR_AUDITOR", TenantType::Zone))
            .unwrap();

        let named = Role::builtin(builtin::ZONE_ADMIN)
            .unwrap()
            .with_permission(Permission::new("hr", Action::View, Scope::Children));
        assert!(catalog.check_session_role(&named).is_ok());

        let widened = Role::builtin(builtin::ZONE_ADMIN)
            .unwrap()
            .with_permission(Permission::new("hr", Action::View, Scope::All));
        assert!(matches!(
            catalog.check_session_role(&widened),
            Err(CatalogError::UnrestrictedScopeNotAllowed { .. })
        ));

        let promoted = Role::new("HR_AUDITOR", TenantType::Bureau);
        assert!(matches!(
            catalog.check_session_role(&promoted),
            Err(CatalogError::AnchorMismatch { .. })
        ));

        let invented = Role::new("OVERSEER", TenantType::Bureau);
        assert!(matches!(
            catalog.check_session_role(&invented),
            Err(CatalogError::UnknownRole { .. })
        ));
    }

    #[test]
    fn test_managed_roles() {
        let catalog = RoleCatalog::new(registry());
        let managed: Vec<_> = catalog
            .managed_roles(&RoleName::new(builtin::WOREDA_ADMIN))
            .into_iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(managed, vec![builtin::KEBELE_ADMIN]);
        assert!(catalog.managed_roles(&RoleName::new("NOBODY")).is_empty());
    }

    #[test]
    fn test_set_hierarchy_rejects_unknown_role() {
        let mut catalog = RoleCatalog::new(registry());
        let table = RoleHierarchy::new().with_entry(builtin::INSTITUTION_ADMIN, ["LIBRARIAN"]);
        assert_eq!(
            catalog.set_hierarchy(table.clone()),
            Err(CatalogError::UnknownRole {
                role: RoleName::new("LIBRARIAN")
            })
        );

        catalog
            .register(Role::new("LIBRARIAN", TenantType::Institution))
            .unwrap();
        catalog.set_hierarchy(table).unwrap();
        assert!(catalog.can_manage(
            &RoleName::new(builtin::INSTITUTION_ADMIN),
            &RoleName::new("LIBRARIAN")
        ));
    }
}
