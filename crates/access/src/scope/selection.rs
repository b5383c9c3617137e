//! The in-session drill-down selection.
//!
//! While browsing, a user above school level may narrow their view to one
//! zone, then one woreda, then one school. [`ScopeSelection`] holds that
//! chain. Every change goes through a validating setter that returns the
//! next selection as a whole value, so a narrowing step and the clearing of
//! deeper levels are a single update.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SelectionError;
use crate::session::Session;
use crate::tenant::{TenantHierarchy, TenantId, TenantNode, TenantType};

/// A strictly narrowing zone → woreda → school selection.
///
/// # Examples
///
/// ```
/// use bureau_access::scope::ScopeSelection;
/// use bureau_access::session::Session;
/// use bureau_access::tenant::{TenantHierarchy, TenantId, TenantNode, TenantType};
///
/// let hierarchy = TenantHierarchy::from_nodes(vec![
///     TenantNode::new("b", TenantType::Bureau, "Bureau", None),
///     TenantNode::new("r1", TenantType::Region, "Region", Some("b".into())),
///     TenantNode::new("z1", TenantType::Zone, "Zone", Some("r1".into())),
///     TenantNode::new("w1", TenantType::Woreda, "Woreda", Some("z1".into())),
/// ])
/// .unwrap();
/// let session = Session::builder()
///     .id("u")
///     .tenant("r1", TenantType::Region, "Region")
///     .build()
///     .unwrap();
///
/// let selection = ScopeSelection::default()
///     .select_zone(&TenantId::new("z1"), &session, &hierarchy)
///     .unwrap()
///     .select_woreda(&TenantId::new("w1"), &session, &hierarchy)
///     .unwrap();
/// assert_eq!(selection.selected_woreda_id, Some(TenantId::new("w1")));
///
/// let reset = selection.select_zone(&TenantId::new("z1"), &session, &hierarchy).unwrap();
/// assert_eq!(reset.selected_woreda_id, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeSelection {
    /// Selected zone.
    #[serde(default)]
    pub selected_zone_id: Option<TenantId>,
    /// Selected woreda.
    #[serde(default)]
    pub selected_woreda_id: Option<TenantId>,
    /// Selected school.
    #[serde(default)]
    pub selected_school_id: Option<TenantId>,
}

impl ScopeSelection {
    /// Returns `true` when nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected_zone_id.is_none()
            && self.selected_woreda_id.is_none()
            && self.selected_school_id.is_none()
    }

    /// Selects a zone and clears the woreda and school.
    pub fn select_zone(
        &self,
        zone_id: &TenantId,
        session: &Session,
        hierarchy: &TenantHierarchy,
    ) -> Result<Self, SelectionError> {
        let bound = session.tenant_id();
        check_candidate(zone_id, TenantType::Zone, bound, hierarchy)?;
        Ok(Self {
            selected_zone_id: Some(zone_id.clone()),
            selected_woreda_id: None,
            selected_school_id: None,
        })
    }

    /// Selects a woreda inside the selected zone (or the home tenant) and
    /// clears the school.
    pub fn select_woreda(
        &self,
        woreda_id: &TenantId,
        session: &Session,
        hierarchy: &TenantHierarchy,
    ) -> Result<Self, SelectionError> {
        let bound = self.bound_for(TenantType::Woreda, session);
        check_candidate(woreda_id, TenantType::Woreda, bound, hierarchy)?;
        Ok(Self {
            selected_zone_id: self.selected_zone_id.clone(),
            selected_woreda_id: Some(woreda_id.clone()),
            selected_school_id: None,
        })
    }

    /// Selects a school inside the narrowest current selection.
    pub fn select_school(
        &self,
        school_id: &TenantId,
        session: &Session,
        hierarchy: &TenantHierarchy,
    ) -> Result<Self, SelectionError> {
        let bound = self.bound_for(TenantType::Institution, session);
        check_candidate(school_id, TenantType::Institution, bound, hierarchy)?;
        Ok(Self {
            selected_zone_id: self.selected_zone_id.clone(),
            selected_woreda_id: self.selected_woreda_id.clone(),
            selected_school_id: Some(school_id.clone()),
        })
    }

    /// Clears the zone and everything below it.
    pub fn clear_zone(&self) -> Self {
        Self::default()
    }

    /// Clears the woreda and the school, keeping the zone.
    pub fn clear_woreda(&self) -> Self {
        Self {
            selected_zone_id: self.selected_zone_id.clone(),
            ..Self::default()
        }
    }

    /// Clears the school only.
    pub fn clear_school(&self) -> Self {
        Self {
            selected_school_id: None,
            ..self.clone()
        }
    }

    /// Zones the user may pick.
    pub fn zone_options<'h>(
        &self,
        session: &Session,
        hierarchy: &'h TenantHierarchy,
    ) -> Vec<&'h TenantNode> {
        options(session.tenant_id(), TenantType::Zone, session, hierarchy)
    }

    /// Woredas the user may pick given the current zone.
    pub fn woreda_options<'h>(
        &self,
        session: &Session,
        hierarchy: &'h TenantHierarchy,
    ) -> Vec<&'h TenantNode> {
        let bound = self.bound_for(TenantType::Woreda, session);
        options(bound, TenantType::Woreda, session, hierarchy)
    }

    /// Schools the user may pick given the current zone and woreda.
    pub fn school_options<'h>(
        &self,
        session: &Session,
        hierarchy: &'h TenantHierarchy,
    ) -> Vec<&'h TenantNode> {
        let bound = self.bound_for(TenantType::Institution, session);
        options(bound, TenantType::Institution, session, hierarchy)
    }

    /// The deepest selected node strictly above `level`, else the home tenant.
    fn bound_for<'a>(&'a self, level: TenantType, session: &'a Session) -> &'a TenantId {
        let chain = [
            (TenantType::Woreda, &self.selected_woreda_id),
            (TenantType::Zone, &self.selected_zone_id),
        ];
        chain
            .into_iter()
            .filter(|(selected_level, _)| *selected_level < level)
            .find_map(|(_, id)| id.as_ref())
            .unwrap_or_else(|| session.tenant_id())
    }
}

fn check_candidate(
    candidate: &TenantId,
    expected: TenantType,
    bound: &TenantId,
    hierarchy: &TenantHierarchy,
) -> Result<(), SelectionError> {
    let actual = hierarchy
        .tenant_type(candidate)
        .ok_or_else(|| SelectionError::UnknownTenant {
            tenant_id: candidate.clone(),
        })?;
    if actual != expected {
        return Err(SelectionError::WrongLevel {
            tenant_id: candidate.clone(),
            expected,
            actual,
        });
    }
    if !hierarchy.is_within(candidate, bound) {
        return Err(SelectionError::OutOfScope {
            tenant_id: candidate.clone(),
            scope_root: bound.clone(),
        });
    }
    Ok(())
}

fn options<'h>(
    bound: &TenantId,
    level: TenantType,
    session: &Session,
    hierarchy: &'h TenantHierarchy,
) -> Vec<&'h TenantNode> {
    if session.tenant_type() >= level {
        return Vec::new();
    }
    hierarchy.descendants_of_type(bound, level)
}

/// Identifies the tenant context a selection was made under.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ContextKey {
    user_id: String,
    tenant_id: TenantId,
    tenant_type: TenantType,
}

impl ContextKey {
    fn of(session: &Session) -> Self {
        Self {
            user_id: session.id().to_string(),
            tenant_id: session.tenant_id().clone(),
            tenant_type: session.tenant_type(),
        }
    }
}

#[derive(Debug)]
struct CellState {
    context: Option<ContextKey>,
    selection: ScopeSelection,
}

/// Shared holder for the current user's selection.
///
/// Writers replace the whole selection under one write lock; readers always
/// observe either the previous or the next selection, never a mix.
#[derive(Debug)]
pub struct SelectionCell {
    state: RwLock<CellState>,
}

impl Default for SelectionCell {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionCell {
    /// Creates an empty cell not yet bound to a session.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(CellState {
                context: None,
                selection: ScopeSelection::default(),
            }),
        }
    }

    /// Returns a copy of the current selection.
    pub fn snapshot(&self) -> ScopeSelection {
        self.state.read().selection.clone()
    }

    /// Binds the cell to a session, clearing the selection when the user or
    /// their tenant changed since the last bind. Returns `true` on reset.
    pub fn reset_for(&self, session: &Session) -> bool {
        let key = ContextKey::of(session);
        let mut state = self.state.write();
        if state.context.as_ref() == Some(&key) {
            return false;
        }
        debug!(
            user_id = %key.user_id,
            tenant_id = %key.tenant_id,
            "Tenant context changed, clearing scope selection"
        );
        state.context = Some(key);
        state.selection = ScopeSelection::default();
        true
    }

    /// Clears the selection, e.g. on logout.
    pub fn clear(&self) {
        let mut state = self.state.write();
        state.context = None;
        state.selection = ScopeSelection::default();
    }

    /// Computes the next selection from the current one and stores it.
    ///
    /// When the session's tenant context changed, `change` starts from an
    /// empty selection. On error the stored selection and bound context are
    /// left untouched.
    pub fn update<F>(&self, session: &Session, change: F) -> Result<ScopeSelection, SelectionError>
    where
        F: FnOnce(&ScopeSelection) -> Result<ScopeSelection, SelectionError>,
    {
        let key = ContextKey::of(session);
        let mut state = self.state.write();
        let rebind = state.context.as_ref() != Some(&key);
        let empty = ScopeSelection::default();
        let next = change(if rebind { &empty } else { &state.selection })?;
        if rebind {
            debug!(
                user_id = %key.user_id,
                tenant_id = %key.tenant_id,
                "Tenant context changed, replacing scope selection"
            );
            state.context = Some(key);
        }
        state.selection = next.clone();
        Ok(next)
    }

    /// Selects a zone.
    pub fn select_zone(
        &self,
        zone_id: &TenantId,
        session: &Session,
        hierarchy: &TenantHierarchy,
    ) -> Result<ScopeSelection, SelectionError> {
        self.update(session, |current| {
            current.select_zone(zone_id, session, hierarchy)
        })
    }

    /// Selects a woreda.
    pub fn select_woreda(
        &self,
        woreda_id: &TenantId,
        session: &Session,
        hierarchy: &TenantHierarchy,
    ) -> Result<ScopeSelection, SelectionError> {
        self.update(session, |current| {
            current.select_woreda(woreda_id, session, hierarchy)
        })
    }

    /// Selects a school.
    pub fn select_school(
        &self,
        school_id: &TenantId,
        session: &Session,
        hierarchy: &TenantHierarchy,
    ) -> Result<ScopeSelection, SelectionError> {
        self.update(session, |current| {
            current.select_school(school_id, session, hierarchy)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hierarchy() -> TenantHierarchy {
        let node = |id: &str, t: TenantType, parent: Option<&str>| {
            TenantNode::new(id, t, id, parent.map(TenantId::new))
        };
        TenantHierarchy::from_nodes(vec![
            node("b", TenantType::Bureau, None),
            node("r1", TenantType::Region, Some("b")),
            node("r2", TenantType::Region, Some("b")),
            node("z1", TenantType::Zone, Some("r1")),
            node("z2", TenantType::Zone, Some("r1")),
            node("z3", TenantType::Zone, Some("r2")),
            node("w1", TenantType::Woreda, Some("z1")),
            node("w2", TenantType::Woreda, Some("z1")),
            node("w3", TenantType::Woreda, Some("z2")),
            node("k1", TenantType::Kebele, Some("w1")),
            node("s1", TenantType::Institution, Some("k1")),
            node("s2", TenantType::Institution, Some("w2")),
            node("s3", TenantType::Institution, Some("w3")),
        ])
        .unwrap()
    }

    fn session(tenant: &str, tenant_type: TenantType) -> Session {
        Session::builder()
            .id("u-1")
            .tenant(tenant, tenant_type, tenant)
            .build()
            .unwrap()
    }

    fn id(s: &str) -> TenantId {
        TenantId::new(s)
    }

    #[test]
    fn test_narrowing_chain() {
        let h = hierarchy();
        let s = session("r1", TenantType::Region);
        let sel = ScopeSelection::default()
            .select_zone(&id("z1"), &s, &h)
            .unwrap()
            .select_woreda(&id("w1"), &s, &h)
            .unwrap()
            .select_school(&id("s1"), &s, &h)
            .unwrap();
        assert_eq!(sel.selected_zone_id, Some(id("z1")));
        assert_eq!(sel.selected_woreda_id, Some(id("w1")));
        assert_eq!(sel.selected_school_id, Some(id("s1")));
    }

    #[test]
    fn test_new_zone_clears_deeper_levels() {
        let h = hierarchy();
        let s = session("r1", TenantType::Region);
        let sel = ScopeSelection::default()
            .select_zone(&id("z1"), &s, &h)
            .unwrap()
            .select_woreda(&id("w2"), &s, &h)
            .unwrap()
            .select_school(&id("s2"), &s, &h)
            .unwrap()
            .select_zone(&id("z2"), &s, &h)
            .unwrap();
        assert_eq!(
            sel,
            ScopeSelection {
                selected_zone_id: Some(id("z2")),
                selected_woreda_id: None,
                selected_school_id: None,
            }
        );
    }

    #[test]
    fn test_new_woreda_clears_school() {
        let h = hierarchy();
        let s = session("z1", TenantType::Zone);
        let sel = ScopeSelection::default()
            .select_woreda(&id("w2"), &s, &h)
            .unwrap()
            .select_school(&id("s2"), &s, &h)
            .unwrap()
            .select_woreda(&id("w1"), &s, &h)
            .unwrap();
        assert_eq!(sel.selected_school_id, None);
        assert_eq!(sel.selected_woreda_id, Some(id("w1")));
    }

    #[test]
    fn test_rejects_sideways_and_upward() {
        let h = hierarchy();
        let s = session("r1", TenantType::Region);
        assert_eq!(
            ScopeSelection::default().select_zone(&id("z3"), &s, &h),
            Err(SelectionError::OutOfScope {
                tenant_id: id("z3"),
                scope_root: id("r1"),
            })
        );

        let woreda_user = session("w1", TenantType::Woreda);
        assert!(matches!(
            ScopeSelection::default().select_zone(&id("z1"), &woreda_user, &h),
            Err(SelectionError::OutOfScope { .. })
        ));
    }

    #[test]
    fn test_school_must_be_inside_selected_woreda() {
        let h = hierarchy();
        let s = session("z1", TenantType::Zone);
        let sel = ScopeSelection::default()
            .select_woreda(&id("w1"), &s, &h)
            .unwrap();
        assert_eq!(
            sel.select_school(&id("s2"), &s, &h),
            Err(SelectionError::OutOfScope {
                tenant_id: id("s2"),
                scope_root: id("w1"),
            })
        );
    }

    #[test]
    fn test_rejects_wrong_level_and_unknown() {
        let h = hierarchy();
        let s = session("r1", TenantType::Region);
        assert!(matches!(
            ScopeSelection::default().select_zone(&id("w1"), &s, &h),
            Err(SelectionError::WrongLevel { .. })
        ));
        assert!(matches!(
            ScopeSelection::default().select_school(&id("nowhere"), &s, &h),
            Err(SelectionError::UnknownTenant { .. })
        ));
    }

    #[test]
    fn test_options_follow_selection() {
        let h = hierarchy();
        let s = session("r1", TenantType::Region);
        let names = |nodes: Vec<&TenantNode>| -> Vec<String> {
            nodes.into_iter().map(|n| n.id.to_string()).collect()
        };

        let empty = ScopeSelection::default();
        assert_eq!(names(empty.zone_options(&s, &h)), vec!["z1", "z2"]);

        let sel = empty
            .select_zone(&id("z1"), &s, &h)
            .unwrap()
            .select_woreda(&id("w1"), &s, &h)
            .unwrap();
        assert_eq!(names(sel.woreda_options(&s, &h)), vec!["w1", "w2"]);
        assert_eq!(names(sel.school_options(&s, &h)), vec!["s1"]);

        let school_user = session("s1", TenantType::Institution);
        assert!(empty.school_options(&school_user, &h).is_empty());
    }

    #[test]
    fn test_clear_helpers() {
        let h = hierarchy();
        let s = session("r1", TenantType::Region);
        let sel = ScopeSelection::default()
            .select_zone(&id("z1"), &s, &h)
            .unwrap()
            .select_woreda(&id("w1"), &s, &h)
            .unwrap()
            .select_school(&id("s1"), &s, &h)
            .unwrap();
        assert_eq!(sel.clear_school().selected_woreda_id, Some(id("w1")));
        assert_eq!(sel.clear_woreda().selected_zone_id, Some(id("z1")));
        assert!(sel.clear_woreda().selected_school_id.is_none());
        assert!(sel.clear_zone().is_empty());
    }

    #[test]
    fn test_cell_resets_on_context_change() {
        let h = hierarchy();
        let cell = SelectionCell::new();
        let regional = session("r1", TenantType::Region);
        assert!(cell.reset_for(&regional));
        assert!(!cell.reset_for(&regional));

        cell.select_zone(&id("z1"), &regional, &h).unwrap();
        assert_eq!(cell.snapshot().selected_zone_id, Some(id("z1")));

        let zonal = session("z1", TenantType::Zone);
        assert!(cell.reset_for(&zonal));
        assert!(cell.snapshot().is_empty());
    }

    #[test]
    fn test_cell_keeps_selection_on_error() {
        let h = hierarchy();
        let cell = SelectionCell::new();
        let s = session("r1", TenantType::Region);
        cell.select_zone(&id("z1"), &s, &h).unwrap();
        assert!(cell.select_woreda(&id("w3"), &s, &h).is_err());
        assert_eq!(cell.snapshot().selected_zone_id, Some(id("z1")));

        cell.clear();
        assert!(cell.snapshot().is_empty());
    }

    #[test]
    fn test_cell_failed_update_keeps_previous_context() {
        let h = hierarchy();
        let cell = SelectionCell::new();
        let regional = session("r1", TenantType::Region);
        cell.select_zone(&id("z1"), &regional, &h).unwrap();

        let zonal = session("z1", TenantType::Zone);
        assert!(cell.select_woreda(&id("w3"), &zonal, &h).is_err());
        assert_eq!(cell.snapshot().selected_zone_id, Some(id("z1")));
        assert!(!cell.reset_for(&regional));

        cell.select_woreda(&id("w1"), &zonal, &h).unwrap();
        assert_eq!(cell.snapshot().selected_zone_id, None);
        assert_eq!(cell.snapshot().selected_woreda_id, Some(id("w1")));
        assert!(!cell.reset_for(&zonal));
    }
}
