//! Peer name resolution
//!
//! Declared configurations reference peer groups by human-readable name;
//! the remote authority wants ids. Resolution is scoped to a network — the
//! caller's explicit one, else the account's default — and widens to an
//! unscoped lookup when the scoped query finds nothing, tolerating groups
//! that live outside the assumed scope.
//!
//! A name that resolves to zero groups does not abort reconciliation; it is
//! reported in [`Resolution::unresolved`] and logged, so callers and tests
//! can observe the lenient outcome either way.

use super::describe::{self, SecurityGroup};
use crate::api::client::filter_params;
use crate::api::ApiClient;
use crate::error::Result;
use std::collections::BTreeSet;

/// Outcome of a name resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Deduplicated ids of every group a name matched.
    pub ids: BTreeSet<String>,
    /// Names that matched no group anywhere, in input order.
    pub unresolved: Vec<String>,
}

/// Resolve peer group names into ids, scoped to `vpc_id` when given, else to
/// the default network. A scoped query with zero matches is retried exactly
/// once without any scope filter.
pub async fn resolve_peers(
    client: &ApiClient,
    names: &[String],
    vpc_id: Option<&str>,
) -> Result<Resolution> {
    if names.is_empty() {
        return Ok(Resolution::default());
    }

    let scope = match vpc_id {
        Some(id) => Some(id.to_string()),
        None => default_vpc(client).await?,
    };

    let mut groups = groups_by_name(client, names, scope.as_deref()).await?;
    if groups.is_empty() && scope.is_some() {
        tracing::debug!(
            "no peer groups named {names:?} in scope {}, widening to unscoped lookup",
            scope.as_deref().unwrap_or_default()
        );
        groups = groups_by_name(client, names, None).await?;
    }

    let ids: BTreeSet<String> = groups.iter().map(|g| g.id.clone()).collect();
    let matched_names: BTreeSet<&str> = groups
        .iter()
        .filter_map(|g| g.name.as_deref())
        .collect();
    let unresolved: Vec<String> = names
        .iter()
        .filter(|n| !matched_names.contains(n.as_str()))
        .cloned()
        .collect();
    for name in &unresolved {
        tracing::warn!("peer group name {name:?} resolved to no group, skipping");
    }

    Ok(Resolution { ids, unresolved })
}

/// Discover the network flagged as default. `None` when the account has no
/// default network (resolution then runs unscoped from the start).
async fn default_vpc(client: &ApiClient) -> Result<Option<String>> {
    let params = filter_params(1, "isDefault", &["true"]);
    let body = client.query("DescribeVpcs", params).await?;
    Ok(describe::vpcs(&body)
        .into_iter()
        .find(|v| v.is_default)
        .map(|v| v.id))
}

async fn groups_by_name(
    client: &ApiClient,
    names: &[String],
    vpc_id: Option<&str>,
) -> Result<Vec<SecurityGroup>> {
    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut params = filter_params(1, "group-name", &name_refs);
    if let Some(vpc) = vpc_id {
        params.extend(filter_params(2, "vpc-id", &[vpc]));
    }
    let body = client.query("DescribeSecurityGroups", params).await?;
    Ok(describe::security_groups(&body))
}
