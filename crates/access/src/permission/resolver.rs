//! Materializes a session's effective grant set.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::types::{Action, ModuleName, Permission, PermissionCheck, PermissionKey, Scope};
use crate::session::Session;

/// The effective grants of one session.
///
/// Built by [`resolve`](Self::resolve): role grants are applied in role order,
/// then direct grants, each later grant replacing an earlier one with the
/// same [`PermissionKey`]. The map is ordered, so resolving the same session
/// twice yields equal values.
///
/// # Examples
///
/// ```
/// use bureau_access::permission::{Action, EffectivePermissions, Permission, PermissionCheck, Scope};
/// use bureau_access::role::{Role, builtin};
/// use bureau_access::session::Session;
/// use bureau_access::tenant::TenantType;
///
/// let session = Session::builder()
///     .id("u-1")
///     .role(
///         Role::builtin(builtin::ZONE_ADMIN)
///             .unwrap()
///             .with_permission(Permission::new("hr", Action::Edit, Scope::Own)),
///     )
///     .direct_permission(Permission::new("hr", Action::Edit, Scope::Children))
///     .tenant("z-1", TenantType::Zone, "Zone 1")
///     .build()
///     .unwrap();
///
/// let effective = EffectivePermissions::resolve(&session);
/// let check = PermissionCheck::new("hr", Action::Edit);
/// assert!(effective.has_permission(&check));
/// assert_eq!(effective.scope_for(&check), Some(Scope::Children));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectivePermissions {
    grants: BTreeMap<PermissionKey, Permission>,
}

impl EffectivePermissions {
    /// Resolves the effective grants of a session.
    pub fn resolve(session: &Session) -> Self {
        let role_grants = session
            .roles()
            .iter()
            .flat_map(|role| role.permissions.iter());
        let resolved = Self::from_grants(role_grants, session.direct_permissions());
        debug!(
            session_id = %session.id(),
            roles = session.roles().len(),
            direct = session.direct_permissions().len(),
            effective = resolved.len(),
            "Resolved effective permissions"
        );
        resolved
    }

    /// Resolves from explicit role and direct grant lists.
    pub fn from_grants<'a>(
        role_grants: impl IntoIterator<Item = &'a Permission>,
        direct_grants: impl IntoIterator<Item = &'a Permission>,
    ) -> Self {
        let mut grants = BTreeMap::new();
        for grant in role_grants {
            grants.insert(grant.key(), grant.clone());
        }
        for grant in direct_grants {
            if let Some(previous) = grants.insert(grant.key(), grant.clone()) {
                trace!(replaced = %previous, by = %grant, "Direct grant overrides role grant");
            }
        }
        Self { grants }
    }

    /// Returns `true` if some grant satisfies the check.
    pub fn has_permission(&self, check: &PermissionCheck) -> bool {
        self.matching(check).next().is_some()
    }

    /// Returns `true` if the module can be viewed at all.
    pub fn has_module_access(&self, module: &ModuleName) -> bool {
        self.grants
            .values()
            .any(|grant| &grant.module == module && grant.action == Action::View)
    }

    /// The scope of the most specific grant satisfying the check.
    ///
    /// A grant for exactly the checked resource type decides first, then a
    /// grant covering every resource type. A check naming no resource type
    /// falls back to the widest typed grant only when no untyped grant
    /// exists.
    pub fn scope_for(&self, check: &PermissionCheck) -> Option<Scope> {
        let base = PermissionKey {
            module: check.module.clone(),
            action: check.action,
            resource_type: None,
        };
        if let Some(resource_type) = &check.resource_type {
            let exact = PermissionKey {
                resource_type: Some(resource_type.clone()),
                ..base.clone()
            };
            if let Some(grant) = self.grants.get(&exact) {
                return Some(grant.scope);
            }
        }
        match self.grants.get(&base) {
            Some(grant) => Some(grant.scope),
            None => self.matching(check).map(|grant| grant.scope).max(),
        }
    }

    /// Looks up the grant stored under a key.
    pub fn get(&self, key: &PermissionKey) -> Option<&Permission> {
        self.grants.get(key)
    }

    /// Iterates over the effective grants in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.grants.values()
    }

    /// Number of effective grants.
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// Returns `true` when nothing is granted.
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    fn matching<'a>(
        &'a self,
        check: &'a PermissionCheck,
    ) -> impl Iterator<Item = &'a Permission> + 'a {
        self.grants
            .values()
            .filter(move |grant| check.is_satisfied_by(grant))
    }
}
