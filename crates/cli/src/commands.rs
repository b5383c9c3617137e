//! Command implementations.
//!
//! Each command reads the loaded catalog and session and produces a
//! serializable report; printing is left to `main`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use bureau_access::catalog::{AccessCatalog, AccessContext};
use bureau_access::filter::scope_data_by;
use bureau_access::menu::MenuGroup;
use bureau_access::permission::{Action, EffectivePermissions, Permission, PermissionCheck, Scope};
use bureau_access::role::RoleName;
use bureau_access::scope::{EffectiveTenant, ScopeSelection};
use bureau_access::session::Session;
use bureau_access::tenant::{TenantId, TenantType};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{CliConfig, Command};

/// A validated catalog together with the session being inspected.
#[derive(Debug)]
pub struct Workspace {
    context: AccessContext,
    session: Session,
    permissions: EffectivePermissions,
}

impl Workspace {
    /// Loads and validates the catalog and session named by the configuration.
    pub fn load(config: &CliConfig) -> Result<Self> {
        Self::from_files(&config.catalog, &config.session)
    }

    /// Loads and validates a catalog file and a session file.
    pub fn from_files(catalog: &Path, session: &Path) -> Result<Self> {
        let catalog_json = fs::read_to_string(catalog)
            .with_context(|| format!("Failed to read catalog {}", catalog.display()))?;
        let context = AccessCatalog::from_json(&catalog_json)
            .and_then(AccessCatalog::build)
            .with_context(|| format!("Invalid catalog {}", catalog.display()))?;

        let session_json = fs::read_to_string(session)
            .with_context(|| format!("Failed to read session {}", session.display()))?;
        let session = Session::from_json(&session_json)
            .with_context(|| format!("Invalid session {}", session.display()))?;
        context
            .validate_session(&session)
            .context("Session does not match the catalog")?;

        let permissions = context.permissions_for(&session);
        info!(
            session_id = %session.id(),
            tenant_id = %session.tenant_id(),
            grants = permissions.len(),
            "Session loaded"
        );
        Ok(Self {
            context,
            session,
            permissions,
        })
    }

    /// The loaded session.
    pub fn session(&self) -> &Session {
        &self.session
    }
}

/// Effective grants of the session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsReport<'a> {
    session_id: &'a str,
    tenant: EffectiveTenant,
    super_user: bool,
    permissions: Vec<&'a Permission>,
}

/// Outcome of a single permission check.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    check: String,
    allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<Scope>,
}

/// One role a creator may provision.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedRole {
    creator: RoleName,
    name: RoleName,
    #[serde(skip_serializing_if = "Option::is_none")]
    anchor_type: Option<TenantType>,
}

/// Records left after scoping.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeReport {
    effective_tenant: EffectiveTenant,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<Scope>,
    total: usize,
    records: Vec<Value>,
}

/// Runs a command and returns its report as JSON.
pub fn run(command: &Command, workspace: &Workspace) -> Result<Value> {
    let report = match command {
        Command::Permissions => serde_json::to_value(permissions(workspace))?,
        Command::Check {
            module,
            action,
            resource_type,
        } => serde_json::to_value(check(workspace, module, *action, resource_type.as_deref()))?,
        Command::ManagedRoles { role } => {
            serde_json::to_value(managed_roles(workspace, role.as_deref()))?
        }
        Command::Menu => serde_json::to_value(menu(workspace))?,
        Command::Scope {
            zone,
            woreda,
            school,
            records,
            module,
            action,
        } => {
            let selection = select(
                workspace,
                zone.as_deref(),
                woreda.as_deref(),
                school.as_deref(),
            )?;
            let records = read_records(records)?;
            serde_json::to_value(scope(workspace, &selection, records, module, *action))?
        }
    };
    Ok(report)
}

/// Lists the effective grants.
pub fn permissions(workspace: &Workspace) -> PermissionsReport<'_> {
    PermissionsReport {
        session_id: workspace.session.id(),
        tenant: EffectiveTenant::home(&workspace.session),
        super_user: workspace.context.is_super_user(&workspace.session),
        permissions: workspace.permissions.iter().collect(),
    }
}

/// Checks one permission.
pub fn check(
    workspace: &Workspace,
    module: &str,
    action: Action,
    resource_type: Option<&str>,
) -> CheckReport {
    let mut check = PermissionCheck::new(module, action);
    if let Some(resource_type) = resource_type {
        check = check.for_resource(resource_type);
    }
    CheckReport {
        check: check.to_string(),
        allowed: workspace.permissions.has_permission(&check),
        scope: workspace.permissions.scope_for(&check),
    }
}

/// Lists the roles `role` may provision, or those of every session role.
pub fn managed_roles(workspace: &Workspace, role: Option<&str>) -> Vec<ManagedRole> {
    let creators: Vec<RoleName> = match role {
        Some(role) => vec![RoleName::new(role)],
        None => workspace
            .session
            .roles()
            .iter()
            .map(|r| r.name.clone())
            .collect(),
    };
    let catalog = workspace.context.roles();
    creators
        .iter()
        .flat_map(|creator| {
            catalog
                .managed_roles(creator)
                .into_iter()
                .map(move |managed| ManagedRole {
                    creator: creator.clone(),
                    name: managed.name.clone(),
                    anchor_type: managed.anchor(),
                })
        })
        .collect()
}

/// Composes the visible menu.
pub fn menu(workspace: &Workspace) -> Vec<MenuGroup> {
    workspace
        .context
        .build_menu(&workspace.session, &workspace.permissions)
}

/// Applies the drill-down options in zone, woreda, school order.
pub fn select(
    workspace: &Workspace,
    zone: Option<&str>,
    woreda: Option<&str>,
    school: Option<&str>,
) -> Result<ScopeSelection> {
    let hierarchy = workspace.context.hierarchy();
    let session = &workspace.session;
    let mut selection = ScopeSelection::default();
    if let Some(zone) = zone {
        selection = selection
            .select_zone(&TenantId::new(zone), session, hierarchy)
            .context("Cannot select zone")?;
    }
    if let Some(woreda) = woreda {
        selection = selection
            .select_woreda(&TenantId::new(woreda), session, hierarchy)
            .context("Cannot select woreda")?;
    }
    if let Some(school) = school {
        selection = selection
            .select_school(&TenantId::new(school), session, hierarchy)
            .context("Cannot select school")?;
    }
    Ok(selection)
}

/// Filters records to the scope granted for `module`/`action`.
///
/// Without a matching grant nothing is visible.
pub fn scope(
    workspace: &Workspace,
    selection: &ScopeSelection,
    records: Vec<Value>,
    module: &str,
    action: Action,
) -> ScopeReport {
    let effective = selection.effective_tenant(&workspace.session);
    let check = PermissionCheck::new(module, action);
    let granted = workspace.permissions.scope_for(&check);
    let total = records.len();

    let kept = match granted {
        Some(scope) => scope_data_by(
            &records,
            record_tenant,
            &effective,
            scope,
            workspace.context.hierarchy(),
        )
        .into_iter()
        .cloned()
        .collect(),
        None => {
            debug!(check = %check, "No grant, hiding every record");
            Vec::new()
        }
    };

    ScopeReport {
        effective_tenant: effective,
        scope: granted,
        total,
        records: kept,
    }
}

fn record_tenant(record: &Value) -> Option<TenantId> {
    record
        .get("tenantId")
        .and_then(Value::as_str)
        .map(TenantId::new)
        .filter(|id| !id.is_blank())
}

fn read_records(path: &Path) -> Result<Vec<Value>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read records {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Records file {} is not a JSON array", path.display()))
}
