//! Role names, role definitions and the built-in role table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::permission::Permission;
use crate::tenant::TenantType;

/// Built-in role names.
pub mod builtin {
    /// Bureau-wide administrator; the only root-anchored role.
    pub const SYSTEM_ADMIN: &str = "SYSTEM_ADMIN";
    /// Regional education office administrator.
    pub const REGIONAL_ADMIN: &str = "REGIONAL_ADMIN";
    /// Zonal education office administrator.
    pub const ZONE_ADMIN: &str = "ZONE_ADMIN";
    /// Woreda education office administrator.
    pub const WOREDA_ADMIN: &str = "WOREDA_ADMIN";
    /// Kebele administrator.
    pub const KEBELE_ADMIN: &str = "KEBELE_ADMIN";
    /// School administrator.
    pub const INSTITUTION_ADMIN: &str = "INSTITUTION_ADMIN";
    /// Teaching staff.
    pub const INSTRUCTOR: &str = "INSTRUCTOR";
    /// Student records office.
    pub const REGISTRAR: &str = "REGISTRAR";
    /// School finance office.
    pub const ACCOUNTANT: &str = "ACCOUNTANT";
    /// Enrolled student.
    pub const STUDENT: &str = "STUDENT";
}

/// Built-in roles and the level each is anchored to, in table order.
pub const BUILTIN_ROLES: [(&str, TenantType); 10] = [
    (builtin::SYSTEM_ADMIN, TenantType::Bureau),
    (builtin::REGIONAL_ADMIN, TenantType::Region),
    (builtin::ZONE_ADMIN, TenantType::Zone),
    (builtin::WOREDA_ADMIN, TenantType::Woreda),
    (builtin::KEBELE_ADMIN, TenantType::Kebele),
    (builtin::INSTITUTION_ADMIN, TenantType::Institution),
    (builtin::INSTRUCTOR, TenantType::Institution),
    (builtin::REGISTRAR, TenantType::Institution),
    (builtin::ACCOUNTANT, TenantType::Institution),
    (builtin::STUDENT, TenantType::Institution),
];

/// Name of a role, compared exactly (`ZONE_ADMIN`, `REGISTRAR`, ...).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleName(String);

impl RoleName {
    /// Creates a role name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the anchor of a built-in role, or `None` for custom roles.
    pub fn builtin_anchor(&self) -> Option<TenantType> {
        BUILTIN_ROLES
            .iter()
            .find(|(name, _)| *name == self.0)
            .map(|(_, anchor)| *anchor)
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoleName({})", self.0)
    }
}

impl From<&str> for RoleName {
    fn from(s: &str) -> Self {
        RoleName::new(s)
    }
}

impl From<String> for RoleName {
    fn from(s: String) -> Self {
        RoleName::new(s)
    }
}

/// A named bundle of grants tied to a hierarchy level.
///
/// Sessions from the backend may omit `anchorType` for built-in roles. The
/// built-in table is authoritative for those names either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Role name.
    pub name: RoleName,
    /// Level a holder of the role is expected to be scoped to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_type: Option<TenantType>,
    /// Grants carried by the role.
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl Role {
    /// Creates a role with an explicit anchor and no grants.
    pub fn new(name: impl Into<RoleName>, anchor: TenantType) -> Self {
        Self {
            name: name.into(),
            anchor_type: Some(anchor),
            permissions: Vec::new(),
        }
    }

    /// Creates a built-in role with no grants, or `None` for an unknown name.
    pub fn builtin(name: &str) -> Option<Self> {
        let name = RoleName::new(name);
        let anchor = name.builtin_anchor()?;
        Some(Self {
            name,
            anchor_type: Some(anchor),
            permissions: Vec::new(),
        })
    }

    /// Adds a grant.
    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permissions.push(permission);
        self
    }

    /// Adds several grants.
    pub fn with_permissions(mut self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        self.permissions.extend(permissions);
        self
    }

    /// The anchor level. Built-in names always report the built-in anchor;
    /// custom roles report the declared one.
    pub fn anchor(&self) -> Option<TenantType> {
        self.name.builtin_anchor().or(self.anchor_type)
    }

    /// Returns `true` for the bureau-anchored super-role.
    pub fn is_root_anchored(&self) -> bool {
        self.anchor() == Some(TenantType::Bureau)
    }
}
