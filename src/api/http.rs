//! HTTP transport for the query API
//!
//! Every remote call is a `POST` of `application/x-www-form-urlencoded`
//! parameters to one fixed endpoint, with `Action` and `Version` keys plus
//! action-specific flat keys. Responses are XML; error bodies carry an
//! `<Error><Code>…</Code><Message>…</Message></Error>` wrapper which this
//! module turns into the typed [`Error`](crate::error::Error) taxonomy.

use crate::error::{Error, Result, CODE_GROUP_NOT_FOUND};
use crate::xml;
use reqwest::{Client, StatusCode};

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        format!(
            "{}... [truncated, {} bytes total]",
            &body[..MAX_LOG_BODY_LENGTH],
            body.len()
        )
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP client wrapper for query API calls
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("sgsync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// POST a form-encoded query and return the raw XML body.
    ///
    /// Non-success statuses and success bodies that nevertheless carry an
    /// error wrapper both map into the typed error taxonomy.
    pub async fn post_form(
        &self,
        url: &str,
        token: &str,
        params: &[(String, String)],
    ) -> Result<String> {
        if let Some((_, action)) = params.iter().find(|(k, _)| k == "Action") {
            tracing::debug!("POST {} Action={}", url, action);
        } else {
            tracing::debug!("POST {}", url);
        }

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .form(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = extract_error(status, &body);
            // Security: only log sanitized/truncated error body to avoid
            // leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(err);
        }

        // Some gateways answer 200 with an error wrapper in the body.
        if looks_like_error_body(&body) {
            let err = extract_error(status, &body);
            tracing::error!("API error in 2xx body: {}", sanitize_for_log(&body));
            return Err(err);
        }

        Ok(body)
    }
}

/// True when a response body is an error wrapper rather than a result.
fn looks_like_error_body(body: &str) -> bool {
    body.contains("<Errors>") || body.contains("<Error>")
}

/// Build a typed error from an error response body.
///
/// Prefers the structured `<Error><Code>/<Message>` fields; falls back to a
/// textual match for the known codes when the wrapper is too mangled to
/// parse, and finally to the HTTP status.
pub fn extract_error(status: StatusCode, body: &str) -> Error {
    if let Some(root) = xml::parse(body) {
        let error = if root.name == "Error" {
            Some(&root)
        } else {
            root.descendant("Error")
        };
        if let Some(error) = error {
            let code = error.child_text("Code").unwrap_or("Unknown").to_string();
            let message = error.child_text("Message").unwrap_or("").to_string();
            if code == CODE_GROUP_NOT_FOUND {
                return Error::GroupNotFound(message);
            }
            return Error::Api { code, message };
        }
    }

    // Lenient wrapper: match known codes textually.
    for code in [
        crate::error::CODE_PERMISSION_DUPLICATE,
        crate::error::CODE_PERMISSION_NOT_FOUND,
        CODE_GROUP_NOT_FOUND,
    ] {
        if body.contains(code) {
            if code == CODE_GROUP_NOT_FOUND {
                return Error::GroupNotFound(sanitize_for_log(body));
            }
            return Error::Api {
                code: code.to_string(),
                message: sanitize_for_log(body),
            };
        }
    }

    Error::Api {
        code: format!("HTTP{}", status.as_u16()),
        message: sanitize_for_log(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CODE_PERMISSION_DUPLICATE;

    const ERROR_BODY: &str = "<Response><Errors><Error>\
        <Code>InvalidPermission.Duplicate</Code>\
        <Message>the specified rule already exists</Message>\
        </Error></Errors><RequestID>req-1</RequestID></Response>";

    #[test]
    fn extracts_structured_code_and_message() {
        let err = extract_error(StatusCode::BAD_REQUEST, ERROR_BODY);
        assert!(err.is_duplicate());
        match err {
            Error::Api { code, message } => {
                assert_eq!(code, CODE_PERMISSION_DUPLICATE);
                assert_eq!(message, "the specified rule already exists");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn group_not_found_gets_its_own_variant() {
        let body = "<Response><Errors><Error>\
            <Code>InvalidGroupId.NotFound</Code>\
            <Message>sg-404 does not exist</Message>\
            </Error></Errors></Response>";
        let err = extract_error(StatusCode::BAD_REQUEST, body);
        assert!(matches!(err, Error::GroupNotFound(m) if m.contains("sg-404")));
    }

    #[test]
    fn textual_fallback_when_wrapper_is_mangled() {
        let body = "oops InvalidPermission.NotFound somewhere in plain text";
        let err = extract_error(StatusCode::BAD_REQUEST, body);
        assert!(err.is_rule_absent());
    }

    #[test]
    fn unknown_body_falls_back_to_http_status() {
        let err = extract_error(StatusCode::SERVICE_UNAVAILABLE, "gateway timeout");
        match err {
            Error::Api { code, .. } => assert_eq!(code, "HTTP503"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn error_wrapper_detection() {
        assert!(looks_like_error_body(ERROR_BODY));
        assert!(!looks_like_error_body(
            "<DescribeSecurityGroupsResponse></DescribeSecurityGroupsResponse>"
        ));
    }
}
