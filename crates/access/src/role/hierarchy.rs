//! Which roles may provision which other roles.
//!
//! The table here only narrows the role choices offered in user-management
//! forms. The backend holds its own copy and must re-check every assignment.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::model::{RoleName, builtin};

/// A directed "creator may provision" table.
///
/// # Examples
///
/// ```
/// use bureau_access::role::{RoleHierarchy, RoleName};
///
/// let table = RoleHierarchy::standard();
/// assert_eq!(
///     table.managed_roles(&RoleName::new("WOREDA_ADMIN")),
///     &[RoleName::new("KEBELE_ADMIN")]
/// );
/// assert!(table.managed_roles(&RoleName::new("STUDENT")).is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleHierarchy {
    managed: BTreeMap<RoleName, Vec<RoleName>>,
}

impl RoleHierarchy {
    /// Creates an empty table in which no role manages anything.
    pub fn new() -> Self {
        Self::default()
    }

    /// The bureau's standard delegation chain.
    pub fn standard() -> Self {
        Self::new()
            .with_entry(builtin::SYSTEM_ADMIN, [builtin::REGIONAL_ADMIN])
            .with_entry(builtin::REGIONAL_ADMIN, [builtin::ZONE_ADMIN])
            .with_entry(builtin::ZONE_ADMIN, [builtin::WOREDA_ADMIN])
            .with_entry(builtin::WOREDA_ADMIN, [builtin::KEBELE_ADMIN])
            .with_entry(builtin::KEBELE_ADMIN, [builtin::INSTITUTION_ADMIN])
            .with_entry(
                builtin::INSTITUTION_ADMIN,
                [
                    builtin::INSTRUCTOR,
                    builtin::REGISTRAR,
                    builtin::ACCOUNTANT,
                    builtin::STUDENT,
                ],
            )
    }

    /// Appends managed roles for a creator, skipping ones already listed.
    pub fn with_entry<I, R>(mut self, creator: impl Into<RoleName>, managed: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleName>,
    {
        let entry = self.managed.entry(creator.into()).or_default();
        for role in managed {
            let role = role.into();
            if !entry.contains(&role) {
                entry.push(role);
            }
        }
        self
    }

    /// Roles `creator` may provision, in table order. Unknown creators manage nothing.
    pub fn managed_roles(&self, creator: &RoleName) -> &[RoleName] {
        self.managed.get(creator).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns `true` if `creator` may provision `target`.
    pub fn can_manage(&self, creator: &RoleName, target: &RoleName) -> bool {
        self.managed_roles(creator).contains(target)
    }

    /// Iterates over every role named in the table, creators and managed alike.
    pub fn referenced_roles(&self) -> impl Iterator<Item = &RoleName> {
        self.managed
            .iter()
            .flat_map(|(creator, managed)| std::iter::once(creator).chain(managed.iter()))
    }
}
