//! Rule-set domain types
//!
//! CIDR blocks, the flattened permission set for one `(group, port)` pair,
//! and the add/remove plan the reconciler produces.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// An IP network in `a.b.c.d/n` form.
///
/// A bare dotted-quad IPv4 address is rewritten to a `/32` network on the way
/// in; anything already carrying a slash passes through verbatim. No
/// bit-alignment validation is performed — the remote side is the authority
/// on what it accepts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct CidrBlock(String);

impl CidrBlock {
    pub fn normalize(input: &str) -> Self {
        let trimmed = input.trim();
        if is_bare_ipv4(trimmed) {
            Self(format!("{trimmed}/32"))
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CidrBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Four dot-separated decimal octets, no slash.
fn is_bare_ipv4(s: &str) -> bool {
    let mut octets = 0;
    for part in s.split('.') {
        if part.is_empty() || part.parse::<u8>().is_err() {
            return false;
        }
        octets += 1;
    }
    octets == 4
}

/// The flattened ingress rule set for one `(group, port)` pair: all allowed
/// CIDR blocks and all allowed peer group ids, with multiple same-port rule
/// entries on the wire treated as a single logical set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PermissionSet {
    pub cidrs: BTreeSet<CidrBlock>,
    pub peers: BTreeSet<String>,
}

impl PermissionSet {
    pub fn is_empty(&self) -> bool {
        self.cidrs.is_empty() && self.peers.is_empty()
    }
}

/// The minimal change set between a desired and a live [`PermissionSet`].
/// An empty plan means zero mutating calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RulePlan {
    pub cidrs_to_add: BTreeSet<CidrBlock>,
    pub cidrs_to_remove: BTreeSet<CidrBlock>,
    pub peers_to_add: BTreeSet<String>,
    pub peers_to_remove: BTreeSet<String>,
}

impl RulePlan {
    pub fn is_empty(&self) -> bool {
        self.cidrs_to_add.is_empty()
            && self.cidrs_to_remove.is_empty()
            && self.peers_to_add.is_empty()
            && self.peers_to_remove.is_empty()
    }
}

/// The declared configuration for one reconciliation: which group and port,
/// which CIDR blocks and which peer group names should be allowed in.
#[derive(Debug, Clone)]
pub struct DesiredIngress {
    pub group_id: String,
    pub port: u16,
    pub cidrs: Vec<String>,
    pub peer_names: Vec<String>,
    /// Scope for peer name resolution; the default network is discovered
    /// when absent.
    pub vpc_id: Option<String>,
}

impl DesiredIngress {
    /// The desired [`PermissionSet`] minus peers, which need remote
    /// resolution first.
    pub fn normalized_cidrs(&self) -> BTreeSet<CidrBlock> {
        self.cidrs
            .iter()
            .map(|c| CidrBlock::normalize(c))
            .collect()
    }
}
