//! Error types for the access engine.
//!
//! Decisions (`has_permission`, `scope_data`, `build_menu`, ...) never fail:
//! a denied check is a normal outcome. The types here cover the points where
//! inputs are turned into runtime structures: building the tenant hierarchy,
//! registering roles against the permission registry, changing the drill-down
//! selection and assembling sessions.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

use crate::permission::{Action, ModuleName, Scope};
use crate::role::RoleName;
use crate::tenant::{TenantId, TenantType};

/// The top-level error type for the access engine.
#[derive(Error, Debug)]
pub enum AccessError {
    /// Tenant hierarchy construction errors
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    /// Role and permission catalog errors
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Drill-down selection errors
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// Builder validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Malformed catalog or session documents
    #[error("malformed document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised while building a [`TenantHierarchy`](crate::tenant::TenantHierarchy).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    /// Two nodes share the same identifier.
    #[error("duplicate tenant node: {tenant_id}")]
    DuplicateNode { tenant_id: TenantId },

    /// A non-root node was declared without a parent.
    #[error("tenant {tenant_id} ({tenant_type}) has no parent")]
    MissingParent {
        tenant_id: TenantId,
        tenant_type: TenantType,
    },

    /// A node references a parent that does not exist.
    #[error("tenant {tenant_id} references unknown parent {parent_id}")]
    UnknownParent {
        tenant_id: TenantId,
        parent_id: TenantId,
    },

    /// The parent is not at a level allowed directly above the child.
    #[error("tenant {tenant_id} ({tenant_type}) cannot be placed under a {parent_type}")]
    InvalidParentLevel {
        tenant_id: TenantId,
        tenant_type: TenantType,
        parent_type: TenantType,
    },

    /// The bureau node was given a parent.
    #[error("bureau {tenant_id} cannot have a parent")]
    RootWithParent { tenant_id: TenantId },

    /// More than one bureau root was declared.
    #[error("multiple bureau roots: {first} and {second}")]
    MultipleRoots { first: TenantId, second: TenantId },

    /// The referenced tenant is not part of the hierarchy.
    #[error("unknown tenant: {tenant_id}")]
    UnknownTenant { tenant_id: TenantId },
}

/// Errors raised while registering roles and permissions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The permission references a module missing from the registry.
    #[error("unknown module: {module}")]
    UnknownModule { module: ModuleName },

    /// The module does not support the requested action.
    #[error("module {module} does not support action {action}")]
    UnsupportedAction { module: ModuleName, action: Action },

    /// The module does not allow the requested scope for the action.
    #[error("module {module} does not allow scope {scope} for action {action}")]
    UnsupportedScope {
        module: ModuleName,
        action: Action,
        scope: Scope,
    },

    /// Only the bureau-anchored role may hold unrestricted grants.
    #[error("role {role} anchored at {anchor} cannot hold an unrestricted grant on {module}")]
    UnrestrictedScopeNotAllowed {
        role: RoleName,
        anchor: TenantType,
        module: ModuleName,
    },

    /// A role was declared with a different anchor than the one it is known by.
    #[error("role {role} is anchored at {expected}, not {actual}")]
    AnchorMismatch {
        role: RoleName,
        expected: TenantType,
        actual: TenantType,
    },

    /// A role was registered twice.
    #[error("duplicate role: {role}")]
    DuplicateRole { role: RoleName },

    /// A custom role was registered without an anchor level.
    #[error("role {role} has no anchor level")]
    MissingAnchor { role: RoleName },

    /// The managed-role table references a role the catalog does not know.
    #[error("unknown role: {role}")]
    UnknownRole { role: RoleName },
}

/// Errors raised when a drill-down selection would leave the session's subtree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// The selected tenant does not exist.
    #[error("unknown tenant: {tenant_id}")]
    UnknownTenant { tenant_id: TenantId },

    /// The selected tenant is at a different level than the selector expects.
    #[error("tenant {tenant_id} is a {actual}, expected a {expected}")]
    WrongLevel {
        tenant_id: TenantId,
        expected: TenantType,
        actual: TenantType,
    },

    /// The selected tenant is outside the permitted subtree.
    #[error("tenant {tenant_id} is outside the scope of {scope_root}")]
    OutOfScope {
        tenant_id: TenantId,
        scope_root: TenantId,
    },
}

/// Errors raised by builders when required inputs are missing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Missing required field.
    #[error("missing required field: {field}")]
    MissingRequiredField { field: String },

    /// The session's tenant does not match the hierarchy.
    #[error("session tenant {tenant_id} is a {actual}, but the session claims {claimed}")]
    TenantTypeMismatch {
        tenant_id: TenantId,
        claimed: TenantType,
        actual: TenantType,
    },
}

/// Result type alias for access engine operations.
pub type AccessResult<T> = Result<T, AccessError>;
