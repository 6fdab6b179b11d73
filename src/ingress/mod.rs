//! Ingress rule reconciliation
//!
//! Keeps a remote security group's ingress permissions for one port/protocol
//! synchronized with a declared set of CIDR blocks and named peer groups.
//! Every invocation re-reads live state, resolves names, computes the minimal
//! diff and applies it — fetch → resolve → diff → apply, strictly in
//! sequence, with no state kept between invocations. Running the whole
//! sequence again after any partial failure converges on the same rule set,
//! which is what lets an external scheduler retry freely.
//!
//! Two reconcilers racing on the same group in a read-diff-write sequence
//! can undo each other; there is no coordination primitive here. The remote
//! group is the single source of truth and the single-writer assumption is
//! the caller's to uphold.
//!
//! # Module Structure
//!
//! - [`model`] - CIDR blocks, permission sets, plans, the declared config
//! - [`describe`] - typed projections of remote response bodies
//! - [`fetch`] - live rule fetcher (lenient: errors read as "no rules yet")
//! - [`resolve`] - peer name → id resolution with scope-widening fallback
//! - [`diff`] - minimal add/remove plan between desired and live
//! - [`apply`] - batched revoke/authorize calls, convergent errors swallowed

pub mod apply;
pub mod describe;
pub mod diff;
pub mod fetch;
pub mod model;
pub mod resolve;

use crate::api::ApiClient;
use crate::error::Result;
use model::{DesiredIngress, PermissionSet, RulePlan};
use serde::Serialize;

/// What one reconciliation pass decided and did.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileOutcome {
    /// The plan that was (or, for a dry run, would be) applied.
    pub plan: RulePlan,
    /// The live rule set the plan was computed against.
    pub live: PermissionSet,
    /// Peer names that resolved to no group and were left out of the
    /// desired set.
    pub unresolved: Vec<String>,
}

/// Compute the plan for `desired` without mutating anything.
pub async fn plan(client: &ApiClient, desired: &DesiredIngress) -> Result<ReconcileOutcome> {
    let live = fetch::fetch_live(client, &desired.group_id, desired.port).await;
    let resolution = resolve::resolve_peers(
        client,
        &desired.peer_names,
        desired.vpc_id.as_deref(),
    )
    .await?;

    let wanted = PermissionSet {
        cidrs: desired.normalized_cidrs(),
        peers: resolution.ids,
    };
    let plan = diff::diff(&wanted, &live);

    Ok(ReconcileOutcome {
        plan,
        live,
        unresolved: resolution.unresolved,
    })
}

/// Full reconciliation: plan, then apply the plan.
pub async fn reconcile(client: &ApiClient, desired: &DesiredIngress) -> Result<ReconcileOutcome> {
    let outcome = plan(client, desired).await?;
    apply::apply(client, &desired.group_id, desired.port, &outcome.plan).await?;
    Ok(outcome)
}

/// Delete-hook semantics: reconcile against an empty desired set, removing
/// every live rule for the port.
pub async fn clear(client: &ApiClient, group_id: &str, port: u16) -> Result<ReconcileOutcome> {
    let desired = DesiredIngress {
        group_id: group_id.to_string(),
        port,
        cidrs: Vec::new(),
        peer_names: Vec::new(),
        vpc_id: None,
    };
    reconcile(client, &desired).await
}
