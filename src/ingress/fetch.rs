//! Live rule fetcher
//!
//! Re-reads the remote authority's current ingress rules for one
//! `(group, port)` pair on every reconciliation — nothing is cached across
//! invocations. Failures collapse to the empty set: the reconciler then
//! re-adds whatever is desired, and removal only ever acts on rules that
//! were actually observed, so an unobserved rule can never be revoked.

use super::describe;
use super::model::{CidrBlock, PermissionSet};
use crate::api::ApiClient;

/// Fetch the live [`PermissionSet`] for `group_id`, filtered to TCP rules
/// whose from/to ports both equal `port`. Multiple matching rule entries are
/// merged into one logical set.
pub async fn fetch_live(client: &ApiClient, group_id: &str, port: u16) -> PermissionSet {
    let params = vec![("GroupId.1".to_string(), group_id.to_string())];
    let body = match client.query("DescribeSecurityGroups", params).await {
        Ok(body) => body,
        Err(err) => {
            tracing::warn!("fetching rules for {group_id} failed, assuming none: {err}");
            return PermissionSet::default();
        }
    };

    let groups = describe::security_groups(&body);
    let Some(group) = groups.iter().find(|g| g.id == group_id) else {
        tracing::warn!("group {group_id} not in describe response, assuming no rules");
        return PermissionSet::default();
    };

    let mut live = PermissionSet::default();
    for permission in &group.permissions {
        if permission.protocol != "tcp"
            || permission.from_port != Some(port)
            || permission.to_port != Some(port)
        {
            continue;
        }
        live.cidrs
            .extend(permission.cidrs.iter().map(|c| CidrBlock::normalize(c)));
        live.peers.extend(permission.peer_ids.iter().cloned());
    }

    tracing::debug!(
        "live rules for {group_id}:{port}: {} cidrs, {} peers",
        live.cidrs.len(),
        live.peers.len()
    );
    live
}
