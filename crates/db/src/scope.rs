//! Relationship scope model.
//!
//! The scope resolver answers one question: which mentoring relationships may
//! this caller read or act upon within a tenant? The answer is either the
//! whole tenant or a finite id set, and every entity-store query consumes it
//! through the same [`RelationshipScope`] value so no store re-derives the
//! branch logic.

use catalyst_shared::{Capability, CapabilitySet};
use sea_orm::{ColumnTrait, QueryFilter};
use uuid::Uuid;

/// Role level of the facilitator tier. Users at exactly this level with the
/// view-all capability get a derived scope through their program enrollments
/// instead of the whole tenant.
pub const FACILITATOR_ROLE_LEVEL: i32 = 50;

/// Role level at or above which a caller gets the administrative override in
/// session-prep checks.
pub const ADMIN_OVERRIDE_ROLE_LEVEL: i32 = 70;

/// The scoping-relevant view of the requesting user.
///
/// Built explicitly from authenticated claims; the resolver takes all of its
/// inputs as parameters, there is no ambient request context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeUser {
    /// User id.
    pub id: Uuid,
    /// Authority tier (higher = more authority).
    pub role_level: i32,
    /// Capability bitset.
    pub capabilities: CapabilitySet,
}

impl ScopeUser {
    /// Creates a scope user from its parts.
    #[must_use]
    pub const fn new(id: Uuid, role_level: i32, capabilities: CapabilitySet) -> Self {
        Self {
            id,
            role_level,
            capabilities,
        }
    }

    /// Returns true if the caller carries the administrative override used
    /// by session-prep checks.
    #[must_use]
    pub const fn has_admin_override(&self) -> bool {
        self.role_level >= ADMIN_OVERRIDE_ROLE_LEVEL
    }
}

/// Which derivation path the resolver takes for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeTier {
    /// No view-all capability: direct participation only.
    Participant,
    /// View-all at the facilitator level: derived program -> mentor scope.
    Facilitator,
    /// View-all above (or below) the facilitator tier: whole tenant.
    TenantAdmin,
}

/// Classifies the derivation path for a user. Pure; the decision depends only
/// on the capability set and role level.
#[must_use]
pub fn scope_tier(user: &ScopeUser) -> ScopeTier {
    if !user.capabilities.contains(Capability::ViewAllRelationships) {
        ScopeTier::Participant
    } else if user.role_level == FACILITATOR_ROLE_LEVEL {
        ScopeTier::Facilitator
    } else {
        ScopeTier::TenantAdmin
    }
}

/// The authoritative answer of the scope resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationshipScope {
    /// Unrestricted within the tenant.
    All,
    /// Restricted to a finite (possibly empty) set of relationship ids.
    Ids(Vec<Uuid>),
}

impl RelationshipScope {
    /// An empty restricted scope. Callers short-circuit to empty responses
    /// and zeroed stats without touching the dependent stores.
    #[must_use]
    pub const fn empty() -> Self {
        Self::Ids(Vec::new())
    }

    /// Returns true for a restricted scope with no ids.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::All => false,
            Self::Ids(ids) => ids.is_empty(),
        }
    }

    /// Returns true if the scope permits acting on the given relationship.
    #[must_use]
    pub fn permits(&self, relationship_id: Uuid) -> bool {
        match self {
            Self::All => true,
            Self::Ids(ids) => ids.contains(&relationship_id),
        }
    }

    /// Applies the scope to a query as a filter on the given relationship-id
    /// column. `All` adds no filter; an explicit id set becomes an `IN`
    /// restriction. Caller-supplied filters are always ANDed on top, so a
    /// caller can narrow but never widen its scope.
    #[must_use]
    pub fn apply<Q, C>(&self, query: Q, column: C) -> Q
    where
        Q: QueryFilter,
        C: ColumnTrait,
    {
        match self {
            Self::All => query,
            Self::Ids(ids) => query.filter(column.is_in(ids.iter().copied())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role_level: i32, caps: CapabilitySet) -> ScopeUser {
        ScopeUser::new(Uuid::new_v4(), role_level, caps)
    }

    #[test]
    fn test_participant_tier_without_view_all() {
        // Even an elevated role level stays a participant without view-all.
        let caps = CapabilitySet::from(Capability::ManageRelationships);
        assert_eq!(scope_tier(&user(80, caps)), ScopeTier::Participant);
        assert_eq!(
            scope_tier(&user(20, CapabilitySet::EMPTY)),
            ScopeTier::Participant
        );
    }

    #[test]
    fn test_facilitator_tier_at_exact_level() {
        let caps = CapabilitySet::from(Capability::ViewAllRelationships);
        assert_eq!(
            scope_tier(&user(FACILITATOR_ROLE_LEVEL, caps)),
            ScopeTier::Facilitator
        );
    }

    #[test]
    fn test_admin_tier_off_facilitator_level() {
        let caps = CapabilitySet::from(Capability::ViewAllRelationships);
        assert_eq!(scope_tier(&user(80, caps)), ScopeTier::TenantAdmin);
        assert_eq!(scope_tier(&user(70, caps)), ScopeTier::TenantAdmin);
    }

    #[test]
    fn test_admin_override_threshold() {
        let u = user(ADMIN_OVERRIDE_ROLE_LEVEL, CapabilitySet::EMPTY);
        assert!(u.has_admin_override());
        let u = user(ADMIN_OVERRIDE_ROLE_LEVEL - 1, CapabilitySet::EMPTY);
        assert!(!u.has_admin_override());
    }

    #[test]
    fn test_all_scope_permits_everything() {
        let scope = RelationshipScope::All;
        assert!(!scope.is_empty());
        assert!(scope.permits(Uuid::new_v4()));
    }

    #[test]
    fn test_id_scope_permits_members_only() {
        let inside = Uuid::new_v4();
        let scope = RelationshipScope::Ids(vec![inside]);
        assert!(scope.permits(inside));
        assert!(!scope.permits(Uuid::new_v4()));
    }

    #[test]
    fn test_empty_scope() {
        let scope = RelationshipScope::empty();
        assert!(scope.is_empty());
        assert!(!scope.permits(Uuid::new_v4()));
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn prop_no_view_all_is_always_participant(role_level in -100i32..200) {
                let caps = CapabilitySet::from(Capability::ManageRelationships);
                prop_assert_eq!(scope_tier(&user(role_level, caps)), ScopeTier::Participant);
            }

            #[test]
            fn prop_view_all_tier_splits_on_facilitator_level(role_level in -100i32..200) {
                let caps = CapabilitySet::from(Capability::ViewAllRelationships);
                let expected = if role_level == FACILITATOR_ROLE_LEVEL {
                    ScopeTier::Facilitator
                } else {
                    ScopeTier::TenantAdmin
                };
                prop_assert_eq!(scope_tier(&user(role_level, caps)), expected);
            }

            #[test]
            fn prop_id_scope_permits_exactly_its_members(
                raw in proptest::collection::vec(any::<u128>(), 0..8),
            ) {
                let ids: Vec<Uuid> = raw.into_iter().map(Uuid::from_u128).collect();
                let scope = RelationshipScope::Ids(ids.clone());
                for id in &ids {
                    prop_assert!(scope.permits(*id));
                }
                prop_assert_eq!(scope.is_empty(), ids.is_empty());
                prop_assert!(!scope.permits(Uuid::new_v4()));
            }
        }
    }
}
