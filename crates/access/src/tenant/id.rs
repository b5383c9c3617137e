//! Tenant identifier type.
//!
//! This module defines the [`TenantId`] type, an opaque identifier for a node
//! of the administrative hierarchy. Ancestry is not encoded in the identifier
//! itself; it lives in the [`TenantHierarchy`](super::TenantHierarchy).

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque identifier for a bureau, region, zone, woreda, kebele or institution.
///
/// Identifiers are assigned by the administrative backend and compared by
/// exact string equality. Records are tagged with the `TenantId` of the node
/// that owns them.
///
/// # Examples
///
/// ```
/// use bureau_access::tenant::TenantId;
///
/// let zone = TenantId::new("zone-07");
/// assert_eq!(zone.as_str(), "zone-07");
/// assert_eq!(zone, TenantId::from("zone-07"));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Creates a new tenant ID from the given string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the tenant ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the identifier is empty or only whitespace.
    ///
    /// Backends send blank strings for unassigned records; callers extracting
    /// tags should treat them as absent.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TenantId").field(&self.0).finish()
    }
}

impl From<&str> for TenantId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for TenantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for TenantId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_id_creation() {
        let tenant = TenantId::new("woreda-12");
        assert_eq!(tenant.as_str(), "woreda-12");
        assert_eq!(tenant.to_string(), "woreda-12");
        assert_eq!(format!("{:?}", tenant), "TenantId(\"woreda-12\")");
    }

    #[test]
    fn test_blank() {
        assert!(TenantId::new("").is_blank());
        assert!(TenantId::new("  ").is_blank());
        assert!(!TenantId::new("k-1").is_blank());
    }

    #[test]
    fn test_serde_transparent() {
        let tenant = TenantId::new("zone-1");
        let json = serde_json::to_string(&tenant).unwrap();
        assert_eq!(json, "\"zone-1\"");

        let parsed: TenantId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, tenant);
    }

    #[test]
    fn test_lookup_by_str() {
        use std::collections::HashMap;

        let names: HashMap<TenantId, &str> = [(TenantId::new("k-4"), "Kebele 4")].into();
        assert_eq!(names.get("k-4"), Some(&"Kebele 4"));
    }

    #[test]
    fn test_from_string() {
        let tenant: TenantId = "school-3".into();
        assert_eq!(tenant.as_str(), "school-3");

        let tenant2: TenantId = String::from("school-3").into();
        assert_eq!(tenant2, tenant);
    }
}
