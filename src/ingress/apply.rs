//! Apply engine
//!
//! Turns a [`RulePlan`] into the minimal number of mutating calls: one
//! batched revoke for every removal, then one batched authorize for every
//! addition, each entry occupying an indexed parameter slot. The two
//! convergent remote errors — duplicate-on-add and not-found-on-remove —
//! mean the desired end state is already reached and are swallowed here;
//! everything else propagates so the caller's scheduler can retry the whole
//! reconciliation. Re-running diff + apply from scratch is always safe, so
//! no partial progress is tracked.

use super::model::{CidrBlock, RulePlan};
use crate::api::ApiClient;
use crate::error::Result;
use std::collections::BTreeSet;

/// Apply `plan` to `group_id`:`port`. Removals run before additions.
pub async fn apply(client: &ApiClient, group_id: &str, port: u16, plan: &RulePlan) -> Result<()> {
    if plan.is_empty() {
        tracing::debug!("no rule changes for {group_id}:{port}");
        return Ok(());
    }

    if !plan.cidrs_to_remove.is_empty() || !plan.peers_to_remove.is_empty() {
        let params = permission_params(group_id, port, &plan.cidrs_to_remove, &plan.peers_to_remove);
        match client.query("RevokeSecurityGroupIngress", params).await {
            Ok(_) => {
                tracing::info!(
                    "revoked {} cidrs, {} peers on {group_id}:{port}",
                    plan.cidrs_to_remove.len(),
                    plan.peers_to_remove.len()
                );
            }
            Err(err) if err.is_rule_absent() => {
                tracing::info!("rules to revoke already absent on {group_id}:{port}");
            }
            Err(err) => return Err(err),
        }
    }

    if !plan.cidrs_to_add.is_empty() || !plan.peers_to_add.is_empty() {
        let params = permission_params(group_id, port, &plan.cidrs_to_add, &plan.peers_to_add);
        match client.query("AuthorizeSecurityGroupIngress", params).await {
            Ok(_) => {
                tracing::info!(
                    "authorized {} cidrs, {} peers on {group_id}:{port}",
                    plan.cidrs_to_add.len(),
                    plan.peers_to_add.len()
                );
            }
            Err(err) if err.is_duplicate() => {
                tracing::info!("rules to authorize already present on {group_id}:{port}");
            }
            Err(err) => return Err(err),
        }
    }

    Ok(())
}

/// Flatten one batched permission into indexed parameter slots:
/// `IpPermissions.1.IpProtocol/FromPort/ToPort` plus
/// `IpPermissions.1.IpRanges.<n>.CidrIp` and `IpPermissions.1.Groups.<n>.GroupId`.
fn permission_params(
    group_id: &str,
    port: u16,
    cidrs: &BTreeSet<CidrBlock>,
    peers: &BTreeSet<String>,
) -> Vec<(String, String)> {
    let mut params = vec![
        ("GroupId".to_string(), group_id.to_string()),
        ("IpPermissions.1.IpProtocol".to_string(), "tcp".to_string()),
        ("IpPermissions.1.FromPort".to_string(), port.to_string()),
        ("IpPermissions.1.ToPort".to_string(), port.to_string()),
    ];
    for (n, cidr) in cidrs.iter().enumerate() {
        params.push((
            format!("IpPermissions.1.IpRanges.{}.CidrIp", n + 1),
            cidr.as_str().to_string(),
        ));
    }
    for (n, peer) in peers.iter().enumerate() {
        params.push((
            format!("IpPermissions.1.Groups.{}.GroupId", n + 1),
            peer.to_string(),
        ));
    }
    params
}
