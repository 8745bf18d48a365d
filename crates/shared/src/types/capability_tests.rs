//! Unit tests for the capability bitset.

use crate::types::{Capability, CapabilitySet};
use proptest::prelude::*;

#[test]
fn test_empty_set_contains_nothing() {
    let set = CapabilitySet::EMPTY;
    assert!(set.is_empty());
    for cap in Capability::ALL {
        assert!(!set.contains(cap));
    }
}

#[test]
fn test_with_adds_capability() {
    let set = CapabilitySet::EMPTY.with(Capability::ViewAllRelationships);
    assert!(set.contains(Capability::ViewAllRelationships));
    assert!(!set.contains(Capability::ManageRelationships));
    assert!(!set.contains(Capability::AgencyAccess));
}

#[test]
fn test_without_removes_capability() {
    let set: CapabilitySet = Capability::ALL.into_iter().collect();
    let reduced = set.without(Capability::AgencyAccess);
    assert!(reduced.contains(Capability::ViewAllRelationships));
    assert!(reduced.contains(Capability::ManageRelationships));
    assert!(!reduced.contains(Capability::AgencyAccess));
}

#[test]
fn test_bits_are_distinct() {
    for (i, a) in Capability::ALL.iter().enumerate() {
        for b in &Capability::ALL[i + 1..] {
            assert_ne!(a.bit(), b.bit());
            assert_eq!(a.bit() & b.bit(), 0);
        }
    }
}

#[test]
fn test_from_bits_round_trips() {
    let set: CapabilitySet = [
        Capability::ViewAllRelationships,
        Capability::AgencyAccess,
    ]
    .into_iter()
    .collect();

    let restored = CapabilitySet::from_bits(set.bits());
    assert_eq!(restored, set);
    assert_eq!(
        restored.iter().collect::<Vec<_>>(),
        vec![Capability::ViewAllRelationships, Capability::AgencyAccess]
    );
}

#[test]
fn test_serde_is_transparent() {
    let set = CapabilitySet::from_bits(3);
    let json = serde_json::to_string(&set).unwrap();
    assert_eq!(json, "3");
    let back: CapabilitySet = serde_json::from_str(&json).unwrap();
    assert_eq!(back, set);
}

proptest! {
    #[test]
    fn prop_with_then_contains(bits in any::<i64>(), idx in 0usize..3) {
        let cap = Capability::ALL[idx];
        let set = CapabilitySet::from_bits(bits).with(cap);
        prop_assert!(set.contains(cap));
    }

    #[test]
    fn prop_without_then_absent(bits in any::<i64>(), idx in 0usize..3) {
        let cap = Capability::ALL[idx];
        let set = CapabilitySet::from_bits(bits).without(cap);
        prop_assert!(!set.contains(cap));
    }
}
