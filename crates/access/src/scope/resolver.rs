//! Effective tenant resolution.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::selection::ScopeSelection;
use crate::session::Session;
use crate::tenant::{TenantId, TenantType};

/// The single tenant data operations are constrained to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveTenant {
    /// Tenant identifier.
    pub id: TenantId,
    /// Tenant level.
    #[serde(rename = "type")]
    pub tenant_type: TenantType,
}

impl EffectiveTenant {
    /// Creates an effective tenant.
    pub fn new(id: impl Into<TenantId>, tenant_type: TenantType) -> Self {
        Self {
            id: id.into(),
            tenant_type,
        }
    }

    /// The session's home tenant.
    pub fn home(session: &Session) -> Self {
        Self::new(session.tenant_id().clone(), session.tenant_type())
    }
}

/// Resolves the most specific tenant of the selection, falling back to the
/// session's home tenant.
///
/// The selection is trusted as given: the setters on [`ScopeSelection`] are
/// the only place that checks it stays inside the session's subtree.
///
/// # Examples
///
/// ```
/// use bureau_access::scope::{ScopeSelection, effective_tenant};
/// use bureau_access::session::Session;
/// use bureau_access::tenant::{TenantId, TenantType};
///
/// let session = Session::builder()
///     .id("u")
///     .tenant("z-1", TenantType::Zone, "Zone 1")
///     .build()
///     .unwrap();
///
/// let home = effective_tenant(&session, &ScopeSelection::default());
/// assert_eq!(home.id, TenantId::new("z-1"));
///
/// let drilled = ScopeSelection {
///     selected_woreda_id: Some(TenantId::new("w-4")),
///     ..Default::default()
/// };
/// let narrowed = effective_tenant(&session, &drilled);
/// assert_eq!(narrowed.tenant_type, TenantType::Woreda);
/// ```
pub fn effective_tenant(session: &Session, selection: &ScopeSelection) -> EffectiveTenant {
    let chain = [
        (&selection.selected_school_id, TenantType::Institution),
        (&selection.selected_woreda_id, TenantType::Woreda),
        (&selection.selected_zone_id, TenantType::Zone),
    ];
    let resolved = chain
        .into_iter()
        .find_map(|(id, tenant_type)| {
            id.as_ref()
                .map(|id| EffectiveTenant::new(id.clone(), tenant_type))
        })
        .unwrap_or_else(|| EffectiveTenant::home(session));
    trace!(
        session_id = %session.id(),
        tenant_id = %resolved.id,
        tenant_type = %resolved.tenant_type,
        "Resolved effective tenant"
    );
    resolved
}

impl ScopeSelection {
    /// Shorthand for [`effective_tenant`].
    pub fn effective_tenant(&self, session: &Session) -> EffectiveTenant {
        effective_tenant(session, self)
    }
}
