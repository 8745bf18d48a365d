//! Typed capability model for access checks.
//!
//! Capabilities are stored as a bitset on the user record and carried in JWT
//! claims, replacing stringly-typed permission names. Membership checks are
//! bit tests over an exhaustive enum.

use serde::{Deserialize, Serialize};

/// A single capability a user may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// May see every mentoring relationship in scope, subject to the
    /// resolver's tier rules (facilitators get a derived scope, tenant
    /// admins get the whole tenant).
    ViewAllRelationships,
    /// May create and end mentoring relationships.
    ManageRelationships,
    /// May operate across sibling tenants owned by the same agency.
    AgencyAccess,
}

impl Capability {
    /// All capabilities, in bit order.
    pub const ALL: [Self; 3] = [
        Self::ViewAllRelationships,
        Self::ManageRelationships,
        Self::AgencyAccess,
    ];

    /// Returns the bit assigned to this capability.
    #[must_use]
    pub const fn bit(self) -> i64 {
        match self {
            Self::ViewAllRelationships => 1 << 0,
            Self::ManageRelationships => 1 << 1,
            Self::AgencyAccess => 1 << 2,
        }
    }
}

/// A set of capabilities, stored as an `i64` bitset.
///
/// The database column `users.capabilities` and the `caps` JWT claim both
/// hold the raw bits.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CapabilitySet(i64);

impl CapabilitySet {
    /// The empty capability set.
    pub const EMPTY: Self = Self(0);

    /// Creates a set from raw bits. Unknown bits are preserved but never
    /// reported by [`contains`](Self::contains).
    #[must_use]
    pub const fn from_bits(bits: i64) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> i64 {
        self.0
    }

    /// Returns true if the set contains the given capability.
    #[must_use]
    pub const fn contains(self, cap: Capability) -> bool {
        self.0 & cap.bit() != 0
    }

    /// Returns a new set with the given capability added.
    #[must_use]
    pub const fn with(self, cap: Capability) -> Self {
        Self(self.0 | cap.bit())
    }

    /// Returns a new set with the given capability removed.
    #[must_use]
    pub const fn without(self, cap: Capability) -> Self {
        Self(self.0 & !cap.bit())
    }

    /// Returns true if no known capability is present.
    #[must_use]
    pub fn is_empty(self) -> bool {
        Capability::ALL.iter().all(|c| !self.contains(*c))
    }

    /// Iterates over the capabilities present in the set.
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl From<Capability> for CapabilitySet {
    fn from(cap: Capability) -> Self {
        Self::EMPTY.with(cap)
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}
