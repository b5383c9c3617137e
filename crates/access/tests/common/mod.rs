//! Shared fixtures for the access engine integration tests.
//!
//! The fixture hierarchy:
//!
//! ```text
//! bureau
//! └── r1
//!     ├── z1
//!     │   ├── w1
//!     │   │   └── k1
//!     │   │       └── s1
//!     │   └── w2
//!     │       └── s2
//!     └── z2
//!         └── w3
//!             └── s3
//! ```

#![allow(dead_code)]

use bureau_access::filter::TenantTagged;
use bureau_access::permission::{Action, ModuleCapabilities, Permission, PermissionRegistry, Scope};
use bureau_access::role::{Role, RoleCatalog};
use bureau_access::session::Session;
use bureau_access::tenant::{TenantHierarchy, TenantId, TenantNode, TenantType};

/// Builds the fixture hierarchy.
pub fn bureau_hierarchy() -> TenantHierarchy {
    let node = |id: &str, tenant_type: TenantType, parent: Option<&str>| {
        TenantNode::new(id, tenant_type, id.to_uppercase(), parent.map(TenantId::new))
    };
    TenantHierarchy::from_nodes(vec![
        node("bureau", TenantType::Bureau, None),
        node("r1", TenantType::Region, Some("bureau")),
        node("z1", TenantType::Zone, Some("r1")),
        node("z2", TenantType::Zone, Some("r1")),
        node("w1", TenantType::Woreda, Some("z1")),
        node("w2", TenantType::Woreda, Some("z1")),
        node("w3", TenantType::Woreda, Some("z2")),
        node("k1", TenantType::Kebele, Some("w1")),
        node("s1", TenantType::Institution, Some("k1")),
        node("s2", TenantType::Institution, Some("w2")),
        node("s3", TenantType::Institution, Some("w3")),
    ])
    .expect("fixture hierarchy is valid")
}

/// Module capabilities used across the tests.
pub fn permission_registry() -> PermissionRegistry {
    let every_scope = [Scope::Own, Scope::Children, Scope::All];
    PermissionRegistry::new()
        .with_module(
            ModuleCapabilities::new("hr")
                .action(Action::View, every_scope)
                .action(Action::Edit, every_scope)
                .action(Action::Approve, every_scope),
        )
        .with_module(
            ModuleCapabilities::new("students")
                .action(Action::View, every_scope)
                .action(Action::Create, [Scope::Own])
                .action(Action::Export, every_scope),
        )
        .with_module(ModuleCapabilities::new("finance").action(Action::View, every_scope))
}

/// A role catalog over [`permission_registry`].
pub fn role_catalog() -> RoleCatalog {
    RoleCatalog::new(permission_registry())
}

/// A session holding one built-in role with extra grants.
pub fn session_with(
    role: &str,
    tenant_id: &str,
    tenant_type: TenantType,
    grants: Vec<Permission>,
) -> Session {
    Session::builder()
        .id(format!("user-{}", tenant_id))
        .email(format!("{}@bureau.example", tenant_id))
        .role(
            Role::builtin(role)
                .expect("built-in role")
                .with_permissions(grants),
        )
        .tenant(tenant_id, tenant_type, tenant_id.to_uppercase())
        .build()
        .expect("fixture session is valid")
}

/// A record owned by a tenant, as returned by a list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub label: String,
    pub tenant: Option<TenantId>,
}

impl TenantTagged for Record {
    fn tenant_tag(&self) -> Option<&TenantId> {
        self.tenant.as_ref()
    }
}

/// One record per fixture node, labelled with the node id.
pub fn record_per_tenant(hierarchy_ids: &[&str]) -> Vec<Record> {
    hierarchy_ids
        .iter()
        .map(|id| Record {
            label: id.to_string(),
            tenant: Some(TenantId::new(*id)),
        })
        .collect()
}

/// Labels of the kept records, in input order.
pub fn labels(records: &[&Record]) -> Vec<String> {
    records.iter().map(|r| r.label.clone()).collect()
}
