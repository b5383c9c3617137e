//! Access gate: decides whether a guarded element may be shown.
//!
//! A [`GateRequirement`] may name a permission check, a list of allowed
//! roles, both, or neither. When both are present they are ANDed. A
//! requirement with neither always allows. Denial is a plain `false` (or
//! `None` from [`AccessGate::render`]), never an error.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::permission::{EffectivePermissions, PermissionCheck};
use crate::role::RoleName;
use crate::session::Session;

/// What a guarded element requires.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateRequirement {
    /// Permission that must be held.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<PermissionCheck>,
    /// The session must hold at least one of these roles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_roles: Option<Vec<RoleName>>,
}

impl GateRequirement {
    /// A requirement that always allows.
    pub fn none() -> Self {
        Self::default()
    }

    /// Requires a permission.
    pub fn permission(check: PermissionCheck) -> Self {
        Self {
            permission: Some(check),
            allowed_roles: None,
        }
    }

    /// Requires one of the listed roles.
    pub fn roles<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleName>,
    {
        Self {
            permission: None,
            allowed_roles: Some(roles.into_iter().map(Into::into).collect()),
        }
    }

    /// Adds a role list to an existing requirement.
    pub fn with_roles<I, R>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleName>,
    {
        self.allowed_roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }
}

/// Evaluates requirements for one session.
///
/// # Examples
///
/// ```
/// use bureau_access::gate::{AccessGate, GateRequirement};
/// use bureau_access::permission::{Action, EffectivePermissions, Permission, PermissionCheck, Scope};
/// use bureau_access::session::Session;
/// use bureau_access::tenant::TenantType;
///
/// let session = Session::builder()
///     .id("u-3")
///     .direct_permission(Permission::new("reports", Action::Export, Scope::Own))
///     .tenant("w-1", TenantType::Woreda, "Woreda 1")
///     .build()
///     .unwrap();
/// let permissions = EffectivePermissions::resolve(&session);
/// let gate = AccessGate::new(&session, &permissions);
///
/// let export = GateRequirement::permission(PermissionCheck::new("reports", Action::Export));
/// assert_eq!(gate.render(&export, || "Export"), Some("Export"));
/// assert!(!gate.allows(&GateRequirement::roles(["SYSTEM_ADMIN"])));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AccessGate<'a> {
    session: &'a Session,
    permissions: &'a EffectivePermissions,
}

impl<'a> AccessGate<'a> {
    /// Binds a gate to a session and its resolved grants.
    pub fn new(session: &'a Session, permissions: &'a EffectivePermissions) -> Self {
        Self {
            session,
            permissions,
        }
    }

    /// The session this gate evaluates.
    pub fn session(&self) -> &'a Session {
        self.session
    }

    /// Returns `true` when every present condition holds.
    pub fn allows(&self, requirement: &GateRequirement) -> bool {
        let permitted = requirement
            .permission
            .as_ref()
            .is_none_or(|check| self.permissions.has_permission(check));
        let role_ok = requirement
            .allowed_roles
            .as_deref()
            .is_none_or(|roles| self.session.has_any_role(roles));
        let allowed = permitted && role_ok;
        if !allowed {
            trace!(
                session_id = %self.session.id(),
                permitted,
                role_ok,
                "Gate denied"
            );
        }
        allowed
    }

    /// Produces the guarded value only when the requirement is met.
    pub fn render<T>(&self, requirement: &GateRequirement, content: impl FnOnce() -> T) -> Option<T> {
        self.allows(requirement).then(content)
    }
}
