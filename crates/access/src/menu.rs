//! Menu composition.
//!
//! Modules register a category, an optional module-level permission and a
//! tree of [`MenuItem`]s. [`build_menu`] folds the registry into the grouped
//! navigation a given session may see.
//!
//! # Filtering Rules
//!
//! - A module whose required permission fails contributes nothing.
//! - An item is kept only if its permission, role and tenant-level filters
//!   all pass.
//! - A parent whose children were all removed is dropped unless it links
//!   somewhere itself.
//! - The bureau-anchored super-role bypasses every filter.
//!
//! Categories appear in the order they were first registered and items keep
//! their registration order. Categories left without items are omitted.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::gate::{AccessGate, GateRequirement};
use crate::permission::{EffectivePermissions, ModuleName, PermissionCheck};
use crate::role::RoleName;
use crate::session::Session;
use crate::tenant::TenantType;

/// A navigation entry, possibly with nested entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    /// Stable identifier.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Route the entry links to; group headers may have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Permission required to see the entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<PermissionCheck>,
    /// Roles allowed to see the entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_roles: Option<Vec<RoleName>>,
    /// Home tenant levels allowed to see the entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_tenant_types: Option<Vec<TenantType>>,
    /// Nested entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuItem>,
}

impl MenuItem {
    /// Creates an unrestricted entry.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            path: None,
            permission: None,
            allowed_roles: None,
            allowed_tenant_types: None,
            children: Vec::new(),
        }
    }

    /// Sets the route.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Requires a permission.
    pub fn with_permission(mut self, check: PermissionCheck) -> Self {
        self.permission = Some(check);
        self
    }

    /// Restricts the entry to the listed roles.
    pub fn with_roles<I, R>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleName>,
    {
        self.allowed_roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }

    /// Restricts the entry to sessions anchored at the listed levels.
    pub fn with_tenant_types(mut self, types: impl IntoIterator<Item = TenantType>) -> Self {
        self.allowed_tenant_types = Some(types.into_iter().collect());
        self
    }

    /// Adds a nested entry.
    pub fn with_child(mut self, child: MenuItem) -> Self {
        self.children.push(child);
        self
    }

    /// The gate requirement formed by the permission and role filters.
    pub fn requirement(&self) -> GateRequirement {
        GateRequirement {
            permission: self.permission.clone(),
            allowed_roles: self.allowed_roles.clone(),
        }
    }

    fn admits_tenant_type(&self, tenant_type: TenantType) -> bool {
        self.allowed_tenant_types
            .as_ref()
            .is_none_or(|types| types.contains(&tenant_type))
    }
}

/// A module's contribution to the navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleEntry {
    /// The module contributing the entries.
    pub module: ModuleName,
    /// Navigation category (e.g. "Academics", "Administration").
    pub category: String,
    /// Permission gating the whole module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_permission: Option<PermissionCheck>,
    /// Top-level entries of the module.
    #[serde(default)]
    pub menu_items: Vec<MenuItem>,
}

impl ModuleEntry {
    /// Creates an ungated module entry.
    pub fn new(module: impl Into<ModuleName>, category: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            category: category.into(),
            required_permission: None,
            menu_items: Vec::new(),
        }
    }

    /// Gates the module behind a permission.
    pub fn with_required_permission(mut self, check: PermissionCheck) -> Self {
        self.required_permission = Some(check);
        self
    }

    /// Adds a top-level entry.
    pub fn with_item(mut self, item: MenuItem) -> Self {
        self.menu_items.push(item);
        self
    }
}

/// Registered modules in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MenuRegistry {
    modules: Vec<ModuleEntry>,
}

impl MenuRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module; its category is placed after those seen before.
    pub fn register(&mut self, entry: ModuleEntry) {
        self.modules.push(entry);
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_module(mut self, entry: ModuleEntry) -> Self {
        self.register(entry);
        self
    }

    /// Registered modules.
    pub fn modules(&self) -> &[ModuleEntry] {
        &self.modules
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// The visible entries of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuGroup {
    /// Category name.
    pub category: String,
    /// Visible entries.
    pub items: Vec<MenuItem>,
}

/// Composes the navigation visible to a session.
///
/// # Examples
///
/// ```
/// use bureau_access::menu::{MenuItem, MenuRegistry, ModuleEntry, build_menu};
/// use bureau_access::permission::{Action, EffectivePermissions, Permission, PermissionCheck, Scope};
/// use bureau_access::session::Session;
/// use bureau_access::tenant::TenantType;
///
/// let registry = MenuRegistry::new().with_module(
///     ModuleEntry::new("students", "Academics")
///         .with_required_permission(PermissionCheck::new("students", Action::View))
///         .with_item(MenuItem::new("students.list", "Students").with_path("/students")),
/// );
/// let session = Session::builder()
///     .id("u")
///     .direct_permission(Permission::new("students", Action::View, Scope::Own))
///     .tenant("s-1", TenantType::Institution, "School 1")
///     .build()
///     .unwrap();
///
/// let menu = build_menu(&registry, &session, &EffectivePermissions::resolve(&session));
/// assert_eq!(menu.len(), 1);
/// assert_eq!(menu[0].category, "Academics");
/// ```
pub fn build_menu(
    registry: &MenuRegistry,
    session: &Session,
    permissions: &EffectivePermissions,
) -> Vec<MenuGroup> {
    compose(registry, session, permissions, session.is_super_user())
}

pub(crate) fn compose(
    registry: &MenuRegistry,
    session: &Session,
    permissions: &EffectivePermissions,
    bypass: bool,
) -> Vec<MenuGroup> {
    let composer = Composer {
        gate: AccessGate::new(session, permissions),
        tenant_type: session.tenant_type(),
        bypass,
    };

    let groups: Vec<MenuGroup> = registry
        .modules()
        .iter()
        .fold(Vec::new(), |mut groups: Vec<MenuGroup>, entry| {
            let visible = composer.module_items(entry);
            match groups.iter_mut().find(|g| g.category == entry.category) {
                Some(group) => group.items.extend(visible),
                None => groups.push(MenuGroup {
                    category: entry.category.clone(),
                    items: visible,
                }),
            }
            groups
        })
        .into_iter()
        .filter(|group| !group.items.is_empty())
        .collect();

    debug!(
        session_id = %session.id(),
        super_user = composer.bypass,
        modules = registry.len(),
        groups = groups.len(),
        "Built menu"
    );
    groups
}

struct Composer<'a> {
    gate: AccessGate<'a>,
    tenant_type: TenantType,
    bypass: bool,
}

impl Composer<'_> {
    fn module_items(&self, entry: &ModuleEntry) -> Vec<MenuItem> {
        if self.bypass {
            return entry.menu_items.clone();
        }
        let module_allowed = entry
            .required_permission
            .as_ref()
            .is_none_or(|check| self.gate.allows(&GateRequirement::permission(check.clone())));
        if !module_allowed {
            return Vec::new();
        }
        entry
            .menu_items
            .iter()
            .filter_map(|item| self.visible(item))
            .collect()
    }

    fn visible(&self, item: &MenuItem) -> Option<MenuItem> {
        if !item.admits_tenant_type(self.tenant_type) || !self.gate.allows(&item.requirement()) {
            return None;
        }
        let children: Vec<MenuItem> = item
            .children
            .iter()
            .filter_map(|child| self.visible(child))
            .collect();
        if !item.children.is_empty() && children.is_empty() && item.path.is_none() {
            return None;
        }
        Some(MenuItem {
            children,
            ..item.clone()
        })
    }
}
