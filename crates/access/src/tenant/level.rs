//! Administrative levels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The level of a node in the administrative hierarchy.
///
/// Levels are ordered from the root downwards:
/// `Bureau < Region < Zone < Woreda < Kebele < Institution`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantType {
    /// The education bureau itself; the single root.
    Bureau,
    /// Regional education office.
    Region,
    /// Zonal education office.
    Zone,
    /// Woreda (district) education office.
    Woreda,
    /// Kebele (neighbourhood) administration.
    Kebele,
    /// A school or other educational institution.
    Institution,
}

impl TenantType {
    /// All levels in root-to-leaf order.
    pub const ALL: [TenantType; 6] = [
        TenantType::Bureau,
        TenantType::Region,
        TenantType::Zone,
        TenantType::Woreda,
        TenantType::Kebele,
        TenantType::Institution,
    ];

    /// Returns the depth of this level, with the bureau at 0.
    pub fn depth(self) -> usize {
        match self {
            TenantType::Bureau => 0,
            TenantType::Region => 1,
            TenantType::Zone => 2,
            TenantType::Woreda => 3,
            TenantType::Kebele => 4,
            TenantType::Institution => 5,
        }
    }

    /// Returns the level immediately above this one.
    pub fn parent_level(self) -> Option<TenantType> {
        match self {
            TenantType::Bureau => None,
            TenantType::Region => Some(TenantType::Bureau),
            TenantType::Zone => Some(TenantType::Region),
            TenantType::Woreda => Some(TenantType::Zone),
            TenantType::Kebele => Some(TenantType::Woreda),
            TenantType::Institution => Some(TenantType::Kebele),
        }
    }

    /// Returns `true` if a node of this level may sit directly under `parent`.
    ///
    /// Every level attaches to its immediate predecessor. Institutions may
    /// also attach straight to a woreda, since many schools are administered
    /// by the woreda office without a kebele in between.
    pub fn accepts_parent(self, parent: TenantType) -> bool {
        if self.parent_level() == Some(parent) {
            return true;
        }
        self == TenantType::Institution && parent == TenantType::Woreda
    }

    /// Returns `true` for the root level.
    pub fn is_root(self) -> bool {
        self == TenantType::Bureau
    }

    /// Returns the lowercase wire name of this level.
    pub fn as_str(self) -> &'static str {
        match self {
            TenantType::Bureau => "bureau",
            TenantType::Region => "region",
            TenantType::Zone => "zone",
            TenantType::Woreda => "woreda",
            TenantType::Kebele => "kebele",
            TenantType::Institution => "institution",
        }
    }
}

impl fmt::Display for TenantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
