//! Query API client
//!
//! Bundles credentials, the HTTP transport and the endpoint into one handle.
//! All calls go to a single endpoint as form-encoded `Action` queries; nested
//! request structures are flattened into indexed parameter slots
//! (`Filter.<n>.Name`, `Filter.<n>.Value.<m>`, …).

use super::auth::Credentials;
use super::http::HttpClient;
use crate::error::Result;

/// Wire protocol version sent with every query.
pub const API_VERSION: &str = "2016-11-15";

/// Main query API client
#[derive(Clone)]
pub struct ApiClient {
    pub credentials: Credentials,
    pub http: HttpClient,
    pub endpoint: String,
}

impl ApiClient {
    /// Create a new client against the given endpoint
    pub fn new(endpoint: &str, credentials: Credentials) -> Result<Self> {
        let http = HttpClient::new()?;
        Ok(Self {
            credentials,
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Issue one query: `Action` + `Version` plus the action-specific
    /// parameters. Returns the raw XML response body.
    pub async fn query(&self, action: &str, params: Vec<(String, String)>) -> Result<String> {
        let mut form = Vec::with_capacity(params.len() + 2);
        form.push(("Action".to_string(), action.to_string()));
        form.push(("Version".to_string(), API_VERSION.to_string()));
        form.extend(params);

        self.http
            .post_form(&self.endpoint, self.credentials.token(), &form)
            .await
    }
}

/// Encode one filter into its indexed parameter slots:
/// `Filter.<slot>.Name` plus `Filter.<slot>.Value.<m>` per value.
pub fn filter_params(slot: usize, name: &str, values: &[&str]) -> Vec<(String, String)> {
    let mut params = vec![(format!("Filter.{slot}.Name"), name.to_string())];
    for (m, value) in values.iter().enumerate() {
        params.push((format!("Filter.{}.Value.{}", slot, m + 1), value.to_string()));
    }
    params
}
