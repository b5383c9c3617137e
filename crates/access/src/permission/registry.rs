//! The permission registry: which actions each module supports and which
//! scopes those actions may carry.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::types::{Action, ModuleName, Permission, Scope};
use crate::error::CatalogError;

/// Supported actions and scopes of one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleCapabilities {
    /// The module.
    pub module: ModuleName,
    /// Each supported action with the scopes it may be granted at.
    pub actions: BTreeMap<Action, BTreeSet<Scope>>,
}

impl ModuleCapabilities {
    /// Creates a module with no supported actions.
    pub fn new(module: impl Into<ModuleName>) -> Self {
        Self {
            module: module.into(),
            actions: BTreeMap::new(),
        }
    }

    /// Adds an action with the scopes it may carry.
    pub fn action(mut self, action: Action, scopes: impl IntoIterator<Item = Scope>) -> Self {
        self.actions.entry(action).or_default().extend(scopes);
        self
    }

    /// Returns `true` if the module supports `action` at `scope`.
    pub fn supports(&self, action: Action, scope: Scope) -> bool {
        self.actions
            .get(&action)
            .is_some_and(|scopes| scopes.contains(&scope))
    }
}

/// Registry of every module the console exposes.
///
/// # Examples
///
/// ```
/// use bureau_access::permission::{Action, ModuleCapabilities, Permission, PermissionRegistry, Scope};
///
/// let registry = PermissionRegistry::new().with_module(
///     ModuleCapabilities::new("hr")
///         .action(Action::View, [Scope::Own, Scope::Children])
///         .action(Action::Edit, [Scope::Own]),
/// );
///
/// assert!(registry.validate(&Permission::new("hr", Action::View, Scope::Children)).is_ok());
/// assert!(registry.validate(&Permission::new("hr", Action::Edit, Scope::Children)).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionRegistry {
    modules: BTreeMap<ModuleName, ModuleCapabilities>,
}

impl PermissionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from a list of module declarations.
    ///
    /// A module declared twice has its actions merged.
    pub fn from_modules(modules: impl IntoIterator<Item = ModuleCapabilities>) -> Self {
        let mut registry = Self::new();
        for module in modules {
            registry.register(module);
        }
        registry
    }

    /// Adds a module and returns the registry.
    pub fn with_module(mut self, module: ModuleCapabilities) -> Self {
        self.register(module);
        self
    }

    /// Adds a module, merging with any existing declaration.
    pub fn register(&mut self, module: ModuleCapabilities) {
        match self.modules.get_mut(&module.module) {
            Some(existing) => {
                for (action, scopes) in module.actions {
                    existing.actions.entry(action).or_default().extend(scopes);
                }
            }
            None => {
                self.modules.insert(module.module.clone(), module);
            }
        }
    }

    /// Looks up a module.
    pub fn get(&self, module: &ModuleName) -> Option<&ModuleCapabilities> {
        self.modules.get(module)
    }

    /// Iterates over registered modules in name order.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleCapabilities> {
        self.modules.values()
    }

    /// Returns `true` if no module is registered.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Checks that a grant names a registered module, a supported action and
    /// an allowed scope.
    pub fn validate(&self, permission: &Permission) -> Result<(), CatalogError> {
        let module = self
            .modules
            .get(&permission.module)
            .ok_or_else(|| CatalogError::UnknownModule {
                module: permission.module.clone(),
            })?;
        let scopes =
            module
                .actions
                .get(&permission.action)
                .ok_or_else(|| CatalogError::UnsupportedAction {
                    module: permission.module.clone(),
                    action: permission.action,
                })?;
        if !scopes.contains(&permission.scope) {
            return Err(CatalogError::UnsupportedScope {
                module: permission.module.clone(),
                action: permission.action,
                scope: permission.scope,
            });
        }
        Ok(())
    }
}
