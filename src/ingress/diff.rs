//! Reconciler
//!
//! Pure set difference between the desired and live rule sets. Equality is
//! exact string/id equality after normalization — no ordering, no
//! partial-overlap heuristics. An empty plan is the signal that no mutating
//! call is needed.

use super::model::{PermissionSet, RulePlan};

/// Compute the minimal add/remove plan turning `live` into `desired`.
pub fn diff(desired: &PermissionSet, live: &PermissionSet) -> RulePlan {
    RulePlan {
        cidrs_to_add: desired.cidrs.difference(&live.cidrs).cloned().collect(),
        cidrs_to_remove: live.cidrs.difference(&desired.cidrs).cloned().collect(),
        peers_to_add: desired.peers.difference(&live.peers).cloned().collect(),
        peers_to_remove: live.peers.difference(&desired.peers).cloned().collect(),
    }
}
