//! Data scoping: reduce a record collection to what the current scope may see.
//!
//! Records carry the id of the tenant that owns them, either directly
//! ([`TenantTagged`]) or through a lookup supplied by the caller
//! ([`scope_data_by`]). The rules per [`Scope`]:
//!
//! | Scope | Kept records |
//! |-------|--------------|
//! | `own` | tag equals the effective tenant |
//! | `children` | tag is the effective tenant or any descendant |
//! | `all` | every record, unchanged |
//!
//! Under `own` and `children` a record with no tag, or with a tag the
//! hierarchy does not know, is dropped.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::permission::Scope;
use crate::scope::EffectiveTenant;
use crate::tenant::{SubtreeIndex, TenantHierarchy, TenantId};

/// A record that names its owning tenant.
pub trait TenantTagged {
    /// The owning tenant, if the record carries one.
    fn tenant_tag(&self) -> Option<&TenantId>;
}

impl<T: TenantTagged + ?Sized> TenantTagged for &T {
    fn tenant_tag(&self) -> Option<&TenantId> {
        (**self).tenant_tag()
    }
}

/// Filters directly tagged records.
///
/// The subtree index for `children` scope is built once for the whole pass.
///
/// # Examples
///
/// ```
/// use bureau_access::filter::{TenantTagged, scope_data};
/// use bureau_access::permission::Scope;
/// use bureau_access::scope::EffectiveTenant;
/// use bureau_access::tenant::{TenantHierarchy, TenantId, TenantNode, TenantType};
///
/// struct Instructor {
///     name: &'static str,
///     office: TenantId,
/// }
///
/// impl TenantTagged for Instructor {
///     fn tenant_tag(&self) -> Option<&TenantId> {
///         Some(&self.office)
///     }
/// }
///
/// let hierarchy = TenantHierarchy::from_nodes(vec![
///     TenantNode::new("b", TenantType::Bureau, "Bureau", None),
///     TenantNode::new("r1", TenantType::Region, "R1", Some("b".into())),
///     TenantNode::new("r2", TenantType::Region, "R2", Some("b".into())),
/// ])
/// .unwrap();
/// let instructors = vec![
///     Instructor { name: "Abebe", office: TenantId::new("r1") },
///     Instructor { name: "Sara", office: TenantId::new("r2") },
/// ];
///
/// let visible = scope_data(
///     &instructors,
///     &EffectiveTenant::new("r1", TenantType::Region),
///     Scope::Children,
///     &hierarchy,
/// );
/// assert_eq!(visible.len(), 1);
/// assert_eq!(visible[0].name, "Abebe");
/// ```
pub fn scope_data<'r, R: TenantTagged>(
    records: &'r [R],
    effective: &EffectiveTenant,
    scope: Scope,
    hierarchy: &TenantHierarchy,
) -> Vec<&'r R> {
    let matcher = Matcher::build(effective, scope, hierarchy, |id| {
        Arc::new(hierarchy.subtree(id))
    });
    matcher.apply(records, |record| record.tenant_tag().cloned())
}

/// Filters records whose tenant is resolved through `tag`, e.g. by following
/// a parent reference to the record that carries the tenant id.
pub fn scope_data_by<'r, R, F>(
    records: &'r [R],
    tag: F,
    effective: &EffectiveTenant,
    scope: Scope,
    hierarchy: &TenantHierarchy,
) -> Vec<&'r R>
where
    F: Fn(&R) -> Option<TenantId>,
{
    let matcher = Matcher::build(effective, scope, hierarchy, |id| {
        Arc::new(hierarchy.subtree(id))
    });
    matcher.apply(records, tag)
}

/// A filter bound to one hierarchy that remembers subtree indexes between
/// passes.
///
/// Useful when many tables are scoped against the same few effective
/// tenants during one render.
#[derive(Debug)]
pub struct ScopeFilter<'h> {
    hierarchy: &'h TenantHierarchy,
    subtrees: Mutex<HashMap<TenantId, Arc<SubtreeIndex>>>,
}

impl<'h> ScopeFilter<'h> {
    /// Creates a filter over a hierarchy.
    pub fn new(hierarchy: &'h TenantHierarchy) -> Self {
        Self {
            hierarchy,
            subtrees: Mutex::new(HashMap::new()),
        }
    }

    /// The subtree index rooted at `id`, built on first use.
    ///
    /// Ids missing from the hierarchy get an empty index that is not cached.
    pub fn subtree(&self, id: &TenantId) -> Arc<SubtreeIndex> {
        if !self.hierarchy.contains(id) {
            return Arc::new(self.hierarchy.subtree(id));
        }
        let mut cache = self.subtrees.lock();
        Arc::clone(
            cache
                .entry(id.clone())
                .or_insert_with(|| Arc::new(self.hierarchy.subtree(id))),
        )
    }

    /// Number of cached subtree indexes.
    pub fn cached_subtrees(&self) -> usize {
        self.subtrees.lock().len()
    }

    /// Same as [`scope_data`], reusing cached subtree indexes.
    pub fn scope_data<'r, R: TenantTagged>(
        &self,
        records: &'r [R],
        effective: &EffectiveTenant,
        scope: Scope,
    ) -> Vec<&'r R> {
        let matcher = Matcher::build(effective, scope, self.hierarchy, |id| self.subtree(id));
        matcher.apply(records, |record| record.tenant_tag().cloned())
    }

    /// Same as [`scope_data_by`], reusing cached subtree indexes.
    pub fn scope_data_by<'r, R, F>(
        &self,
        records: &'r [R],
        tag: F,
        effective: &EffectiveTenant,
        scope: Scope,
    ) -> Vec<&'r R>
    where
        F: Fn(&R) -> Option<TenantId>,
    {
        let matcher = Matcher::build(effective, scope, self.hierarchy, |id| self.subtree(id));
        matcher.apply(records, tag)
    }
}

enum Matcher<'a> {
    Own {
        tenant: &'a TenantId,
        known: bool,
    },
    Children(Arc<SubtreeIndex>),
    All,
}

impl<'a> Matcher<'a> {
    fn build(
        effective: &'a EffectiveTenant,
        scope: Scope,
        hierarchy: &TenantHierarchy,
        subtree: impl FnOnce(&TenantId) -> Arc<SubtreeIndex>,
    ) -> Self {
        match scope {
            Scope::Own => Matcher::Own {
                tenant: &effective.id,
                known: hierarchy.contains(&effective.id),
            },
            Scope::Children => Matcher::Children(subtree(&effective.id)),
            Scope::All => Matcher::All,
        }
    }

    fn admits(&self, tag: Option<&TenantId>) -> bool {
        match (self, tag) {
            (Matcher::All, _) => true,
            (_, None) => false,
            (Matcher::Own { tenant, known }, Some(tag)) => *known && tag == *tenant,
            (Matcher::Children(index), Some(tag)) => index.contains(tag),
        }
    }

    fn apply<'r, R>(&self, records: &'r [R], tag: impl Fn(&R) -> Option<TenantId>) -> Vec<&'r R> {
        if matches!(self, Matcher::All) {
            return records.iter().collect();
        }
        let kept: Vec<&R> = records
            .iter()
            .filter(|record| self.admits(tag(*record).as_ref()))
            .collect();
        debug!(total = records.len(), kept = kept.len(), "Scoped records");
        kept
    }
}
