//! The authenticated session as supplied by the login layer.
//!
//! A [`Session`] is an immutable snapshot: the user's roles, any grants made
//! to the user directly, and the tenant node the user is anchored to. Every
//! decision in this crate takes the session as an explicit argument.

use serde::{Deserialize, Serialize};

use crate::error::{AccessError, HierarchyError, ValidationError};
use crate::permission::Permission;
use crate::role::{Role, RoleName};
use crate::tenant::{TenantHierarchy, TenantId, TenantType};

/// An authenticated user and their home tenant.
///
/// # Examples
///
/// ```
/// use bureau_access::role::{Role, builtin};
/// use bureau_access::session::Session;
/// use bureau_access::tenant::TenantType;
///
/// let session = Session::builder()
///     .id("u-17")
///     .email("zone.admin@example.org")
///     .role(Role::builtin(builtin::ZONE_ADMIN).unwrap())
///     .tenant("zone-3", TenantType::Zone, "East Zone")
///     .build()
///     .unwrap();
///
/// assert!(session.has_role(&builtin::ZONE_ADMIN.into()));
/// assert!(!session.is_super_user());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    roles: Vec<Role>,
    #[serde(default)]
    direct_permissions: Vec<Permission>,
    tenant_type: TenantType,
    tenant_id: TenantId,
    #[serde(default)]
    tenant_name: String,
}

impl Session {
    /// Creates a builder.
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Parses a session document in the login layer's JSON format.
    pub fn from_json(json: &str) -> Result<Self, AccessError> {
        Ok(serde_json::from_str(json)?)
    }

    /// User identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// User email.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Roles held, in the order the login layer supplied them.
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Grants made to the user directly.
    pub fn direct_permissions(&self) -> &[Permission] {
        &self.direct_permissions
    }

    /// The level of the user's home tenant.
    pub fn tenant_type(&self) -> TenantType {
        self.tenant_type
    }

    /// The user's home tenant.
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// Display name of the home tenant.
    pub fn tenant_name(&self) -> &str {
        &self.tenant_name
    }

    /// Returns `true` if the user holds a role with this name.
    pub fn has_role(&self, name: &RoleName) -> bool {
        self.roles.iter().any(|role| &role.name == name)
    }

    /// Returns `true` if the user holds at least one of the listed roles.
    pub fn has_any_role(&self, names: &[RoleName]) -> bool {
        names.iter().any(|name| self.has_role(name))
    }

    /// Returns `true` if the user holds the bureau-anchored super-role.
    ///
    /// Custom roles are judged by the anchor the session declares; use
    /// [`AccessContext::is_super_user`](crate::catalog::AccessContext::is_super_user)
    /// to judge them by the catalog.
    pub fn is_super_user(&self) -> bool {
        self.roles.iter().any(Role::is_root_anchored)
    }

    /// Returns `true` when the session carries no grants at all.
    pub fn is_unprivileged(&self) -> bool {
        self.direct_permissions.is_empty() && self.roles.iter().all(|r| r.permissions.is_empty())
    }

    /// Checks that the home tenant exists and is at the claimed level.
    pub fn validate_against(&self, hierarchy: &TenantHierarchy) -> Result<(), AccessError> {
        let actual = hierarchy.tenant_type(&self.tenant_id).ok_or_else(|| {
            HierarchyError::UnknownTenant {
                tenant_id: self.tenant_id.clone(),
            }
        })?;
        if actual != self.tenant_type {
            return Err(ValidationError::TenantTypeMismatch {
                tenant_id: self.tenant_id.clone(),
                claimed: self.tenant_type,
                actual,
            }
            .into());
        }
        Ok(())
    }
}

/// Builder for sessions assembled in code rather than parsed.
#[derive(Debug, Default)]
pub struct SessionBuilder {
    id: Option<String>,
    email: Option<String>,
    roles: Vec<Role>,
    direct_permissions: Vec<Permission>,
    tenant: Option<(TenantId, TenantType, String)>,
}

impl SessionBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the user ID.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the email.
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Adds a role.
    pub fn role(mut self, role: Role) -> Self {
        self.roles.push(role);
        self
    }

    /// Adds a direct grant.
    pub fn direct_permission(mut self, permission: Permission) -> Self {
        self.direct_permissions.push(permission);
        self
    }

    /// Sets the home tenant.
    pub fn tenant(
        mut self,
        tenant_id: impl Into<TenantId>,
        tenant_type: TenantType,
        tenant_name: impl Into<String>,
    ) -> Self {
        self.tenant = Some((tenant_id.into(), tenant_type, tenant_name.into()));
        self
    }

    /// Builds the session, returning an error if required fields are missing.
    pub fn build(self) -> Result<Session, ValidationError> {
        let id = self.id.ok_or_else(|| ValidationError::MissingRequiredField {
            field: "id".to_string(),
        })?;
        let (tenant_id, tenant_type, tenant_name) =
            self.tenant
                .ok_or_else(|| ValidationError::MissingRequiredField {
                    field: "tenantId".to_string(),
                })?;

        Ok(Session {
            id,
            email: self.email.unwrap_or_default(),
            roles: self.roles,
            direct_permissions: self.direct_permissions,
            tenant_type,
            tenant_id,
            tenant_name,
        })
    }
}
