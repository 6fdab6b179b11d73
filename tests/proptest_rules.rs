//! Property-based tests using proptest
//!
//! These tests verify the correctness of the address normalizer and the
//! reconciler's set arithmetic using randomized inputs.

use proptest::prelude::*;
use sgsync::ingress::diff::diff;
use sgsync::ingress::model::{CidrBlock, PermissionSet, RulePlan};
use std::collections::BTreeSet;

/// Generate an arbitrary dotted-quad IPv4 address
fn arb_ipv4() -> impl Strategy<Value = String> {
    (0u8..=255, 0u8..=255, 0u8..=255, 0u8..=255)
        .prop_map(|(a, b, c, d)| format!("{a}.{b}.{c}.{d}"))
}

/// Generate an arbitrary CIDR string, sometimes slashed, sometimes bare
fn arb_cidr_input() -> impl Strategy<Value = String> {
    prop_oneof![
        arb_ipv4(),
        (arb_ipv4(), 0u8..=32).prop_map(|(ip, bits)| format!("{ip}/{bits}")),
    ]
}

/// Generate a permission set out of random CIDRs and peer ids
fn arb_permission_set() -> impl Strategy<Value = PermissionSet> {
    (
        prop::collection::btree_set(arb_cidr_input().prop_map(|c| CidrBlock::normalize(&c)), 0..20),
        prop::collection::btree_set("sg-[0-9a-f]{8}", 0..10),
    )
        .prop_map(|(cidrs, peers)| PermissionSet { cidrs, peers })
}

/// Model of the apply engine: removals first, then additions, over a set.
fn apply_to_sets(live: &PermissionSet, plan: &RulePlan) -> PermissionSet {
    let cidrs: BTreeSet<CidrBlock> = live
        .cidrs
        .difference(&plan.cidrs_to_remove)
        .cloned()
        .chain(plan.cidrs_to_add.iter().cloned())
        .collect();
    let peers: BTreeSet<String> = live
        .peers
        .difference(&plan.peers_to_remove)
        .cloned()
        .chain(plan.peers_to_add.iter().cloned())
        .collect();
    PermissionSet { cidrs, peers }
}

proptest! {
    /// A bare address always normalizes to a /32 host network
    #[test]
    fn bare_address_normalizes_to_host_network(ip in arb_ipv4()) {
        let normalized = CidrBlock::normalize(&ip);
        prop_assert_eq!(normalized.as_str(), format!("{}/32", ip));
    }

    /// Slashed input is never rewritten
    #[test]
    fn slashed_input_is_untouched(ip in arb_ipv4(), bits in 0u8..=32) {
        let input = format!("{ip}/{bits}");
        let normalized = CidrBlock::normalize(&input);
        prop_assert_eq!(normalized.as_str(), input.as_str());
    }

    /// Normalization is idempotent
    #[test]
    fn normalization_is_idempotent(input in arb_cidr_input()) {
        let once = CidrBlock::normalize(&input);
        let twice = CidrBlock::normalize(once.as_str());
        prop_assert_eq!(once, twice);
    }

    /// Applying diff(desired, live) over live yields exactly desired
    #[test]
    fn applying_the_diff_reaches_the_desired_set(
        desired in arb_permission_set(),
        live in arb_permission_set()
    ) {
        let plan = diff(&desired, &live);
        let reached = apply_to_sets(&live, &plan);
        prop_assert_eq!(reached, desired);
    }

    /// Diffing a set against itself yields an empty plan, and an empty plan
    /// only ever comes out of equal sets
    #[test]
    fn empty_plan_iff_sets_are_equal(
        a in arb_permission_set(),
        b in arb_permission_set()
    ) {
        prop_assert!(diff(&a, &a).is_empty());
        let plan = diff(&a, &b);
        prop_assert_eq!(plan.is_empty(), a == b);
    }

    /// The plan never mentions an entry that is in both sets
    #[test]
    fn unchanged_entries_never_appear_in_the_plan(
        desired in arb_permission_set(),
        live in arb_permission_set()
    ) {
        let plan = diff(&desired, &live);
        for cidr in desired.cidrs.intersection(&live.cidrs) {
            prop_assert!(!plan.cidrs_to_add.contains(cidr));
            prop_assert!(!plan.cidrs_to_remove.contains(cidr));
        }
        for peer in desired.peers.intersection(&live.peers) {
            prop_assert!(!plan.peers_to_add.contains(peer));
            prop_assert!(!plan.peers_to_remove.contains(peer));
        }
    }

    /// Re-diffing after a clean apply is always empty (idempotence at the
    /// set level)
    #[test]
    fn second_diff_after_apply_is_empty(
        desired in arb_permission_set(),
        live in arb_permission_set()
    ) {
        let reached = apply_to_sets(&live, &diff(&desired, &live));
        prop_assert!(diff(&desired, &reached).is_empty());
    }
}
