//! sgsync — security group ingress reconciliation
//!
//! Keeps a remote security group's ingress permissions for a single
//! port/protocol pair synchronized with a declared set of allowed CIDR
//! blocks and named peer groups, against an `Action`-query API that answers
//! in namespace-free XML with no array markers.
//!
//! The pipeline per invocation: decode live state ([`xml`] + [`ingress`]),
//! normalize declared addresses, resolve peer names to ids, diff, and apply
//! the minimal set of mutating calls. No state is kept between invocations;
//! re-running the whole pipeline after any failure converges on the same
//! rule set.
//!
//! # Example
//!
//! ```ignore
//! use sgsync::api::{ApiClient, Credentials};
//! use sgsync::ingress::{self, model::DesiredIngress};
//!
//! async fn example() -> sgsync::error::Result<()> {
//!     let client = ApiClient::new("https://ec2.us-east-1.amazonaws.com", Credentials::new("token"))?;
//!     let desired = DesiredIngress {
//!         group_id: "sg-0123".to_string(),
//!         port: 5432,
//!         cidrs: vec!["10.0.0.0/16".to_string()],
//!         peer_names: vec!["web-sg".to_string()],
//!         vpc_id: None,
//!     };
//!     let outcome = ingress::reconcile(&client, &desired).await?;
//!     println!("applied: {:?}", outcome.plan);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod ingress;
pub mod xml;

/// Version injected at compile time via SGSYNC_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("SGSYNC_VERSION") {
    Some(v) => v,
    None => "dev",
};
