//! Remote query API module
//!
//! Everything needed to talk to the remote authority: credential resolution,
//! the form-encoded HTTP transport, and the `Action`-based query client.
//!
//! # Module Structure
//!
//! - [`auth`] - token resolution (environment, credentials file)
//! - [`client`] - query client building `Action`/`Version` form requests
//! - [`http`] - HTTP transport and remote error extraction

pub mod auth;
pub mod client;
pub mod http;

pub use auth::Credentials;
pub use client::ApiClient;
