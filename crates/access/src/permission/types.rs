//! Permission value types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Name of a functional module of the console (e.g. `hr`, `students`, `finance`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleName(String);

impl ModuleName {
    /// Creates a module name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleName({})", self.0)
    }
}

impl From<&str> for ModuleName {
    fn from(s: &str) -> Self {
        ModuleName::new(s)
    }
}

impl From<String> for ModuleName {
    fn from(s: String) -> Self {
        ModuleName::new(s)
    }
}

/// Actions that can be granted on a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// See the module and list its records.
    View,
    /// Create new records.
    Create,
    /// Modify existing records.
    Edit,
    /// Remove records.
    Delete,
    /// Approve submitted records (transfers, leave requests, results).
    Approve,
    /// Export records to files.
    Export,
    /// Bulk import records.
    Import,
    /// Administer module settings and user assignments.
    Manage,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::View => write!(f, "view"),
            Action::Create => write!(f, "create"),
            Action::Edit => write!(f, "edit"),
            Action::Delete => write!(f, "delete"),
            Action::Approve => write!(f, "approve"),
            Action::Export => write!(f, "export"),
            Action::Import => write!(f, "import"),
            Action::Manage => write!(f, "manage"),
        }
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "view" => Ok(Action::View),
            "create" => Ok(Action::Create),
            "edit" => Ok(Action::Edit),
            "delete" => Ok(Action::Delete),
            "approve" => Ok(Action::Approve),
            "export" => Ok(Action::Export),
            "import" => Ok(Action::Import),
            "manage" => Ok(Action::Manage),
            _ => Err(format!("unknown action: {}", s)),
        }
    }
}

/// The breadth of data a grant covers.
///
/// Variants are ordered from narrowest to widest, so `max` picks the widest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Only records tagged with the user's exact tenant.
    Own,
    /// Records of the user's tenant and every descendant.
    Children,
    /// Every record.
    All,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Own => write!(f, "own"),
            Scope::Children => write!(f, "children"),
            Scope::All => write!(f, "all"),
        }
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "own" => Ok(Scope::Own),
            "children" => Ok(Scope::Children),
            "all" => Ok(Scope::All),
            _ => Err(format!("unknown scope: {}", s)),
        }
    }
}

/// A single grant: an action on a module, optionally narrowed to one
/// resource type, with a data scope.
///
/// A grant without a resource type covers every resource type of the module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    /// The module the grant applies to.
    pub module: ModuleName,
    /// The granted action.
    pub action: Action,
    /// Optional resource type within the module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    /// Data breadth of the grant.
    pub scope: Scope,
}

impl Permission {
    /// Creates a grant covering every resource type of the module.
    pub fn new(module: impl Into<ModuleName>, action: Action, scope: Scope) -> Self {
        Self {
            module: module.into(),
            action,
            resource_type: None,
            scope,
        }
    }

    /// Narrows the grant to a single resource type.
    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    /// Returns the override key of this grant.
    pub fn key(&self) -> PermissionKey {
        PermissionKey {
            module: self.module.clone(),
            action: self.action,
            resource_type: self.resource_type.clone(),
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.module,
            self.action,
            self.resource_type.as_deref().unwrap_or("any"),
            self.scope
        )
    }
}

/// Identity of a grant for override purposes: `(module, action, resourceType ?? any)`.
///
/// A later grant with the same key replaces an earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PermissionKey {
    /// Module.
    pub module: ModuleName,
    /// Action.
    pub action: Action,
    /// Resource type; `None` stands for "any".
    pub resource_type: Option<String>,
}

/// A permission requirement to test against a resolved grant set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionCheck {
    /// Required module.
    pub module: ModuleName,
    /// Required action.
    pub action: Action,
    /// Required resource type; `None` accepts a grant for any resource type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
}

impl PermissionCheck {
    /// Creates a check for an action on a module.
    pub fn new(module: impl Into<ModuleName>, action: Action) -> Self {
        Self {
            module: module.into(),
            action,
            resource_type: None,
        }
    }

    /// Restricts the check to a resource type.
    pub fn for_resource(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    /// Returns `true` if `grant` satisfies this check.
    ///
    /// Module and action must match. The resource type matches when the check
    /// does not name one, when both name the same one, or when the grant
    /// covers every resource type.
    pub fn is_satisfied_by(&self, grant: &Permission) -> bool {
        if grant.module != self.module || grant.action != self.action {
            return false;
        }
        match (&self.resource_type, &grant.resource_type) {
            (None, _) | (_, None) => true,
            (Some(wanted), Some(granted)) => wanted == granted,
        }
    }
}

impl fmt::Display for PermissionCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.resource_type {
            Some(rt) => write!(f, "{}:{}:{}", self.module, self.action, rt),
            None => write!(f, "{}:{}", self.module, self.action),
        }
    }
}
