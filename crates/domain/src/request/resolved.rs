//! Resolved request descriptor

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::HttpMethod;

/// A fully resolved, placeholder-free request ready for transport.
///
/// Serializes to the proxy payload shape `{url, method, headers, body}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRequest {
    /// Absolute URL with the query string appended.
    #[serde(rename = "url")]
    pub final_url: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Resolved headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Parsed JSON body, `None` when not applicable.
    #[serde(default)]
    pub body: Option<Value>,
}

impl ResolvedRequest {
    /// Creates a descriptor with no headers and no body.
    #[must_use]
    pub fn new(method: HttpMethod, final_url: impl Into<String>) -> Self {
        Self {
            final_url: final_url.into(),
            method,
            headers: BTreeMap::new(),
            body: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_proxy_payload_shape() {
        let mut request = ResolvedRequest::new(HttpMethod::Post, "https://api.x.com/users");
        request
            .headers
            .insert("Authorization".to_string(), "Bearer t".to_string());
        request.body = Some(json!({"name": "ada"}));

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "url": "https://api.x.com/users",
                "method": "POST",
                "headers": {"Authorization": "Bearer t"},
                "body": {"name": "ada"}
            })
        );
    }

    #[test]
    fn test_absent_body_serializes_as_null() {
        let request = ResolvedRequest::new(HttpMethod::Get, "https://api.x.com");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["body"], Value::Null);
    }
}
