//! Proxy client implementation using reqwest.
//!
//! Posts each resolved request to `{proxy_url}/proxy` as
//! `{url, method, headers, body}` and hands back the status and decoded
//! body. The proxy performs the real outbound call.

use relay_application::ports::{ProxyClient, ProxyError, ProxyReply};
use relay_domain::ResolvedRequest;
use reqwest::{Client, Url};
use serde_json::{Value, json};

use crate::serialization::from_json;

const USER_AGENT: &str = concat!("Relay/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the proxy collaborator.
#[derive(Debug, Clone)]
pub struct ReqwestProxyClient {
    client: Client,
    endpoint: Url,
}

impl ReqwestProxyClient {
    /// Creates a client for the proxy at `proxy_url`.
    ///
    /// No timeout is applied; the proxy owns timeout policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created or the endpoint
    /// URL is invalid.
    pub fn new(proxy_url: &Url) -> Result<Self, ProxyError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProxyError::Other(e.to_string()))?;

        Self::with_client(client, proxy_url)
    }

    /// Creates a proxy client around an existing reqwest client.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL is invalid.
    pub fn with_client(client: Client, proxy_url: &Url) -> Result<Self, ProxyError> {
        let endpoint = proxy_endpoint(proxy_url)?;
        Ok(Self { client, endpoint })
    }

    /// Returns the URL requests are posted to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Connection-level failures are transport errors; everything else
    /// keeps its message.
    fn map_error(error: &reqwest::Error) -> ProxyError {
        if error.is_connect() || error.is_timeout() || error.is_request() {
            ProxyError::Transport(error.to_string())
        } else {
            ProxyError::Other(error.to_string())
        }
    }
}

impl ProxyClient for ReqwestProxyClient {
    async fn forward(&self, request: &ResolvedRequest) -> Result<ProxyReply, ProxyError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| Self::map_error(&e))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| Self::map_error(&e))?;
        tracing::debug!(status, bytes = text.len(), "proxy replied");

        Ok(ProxyReply::new(status, decode_payload(text)))
    }
}

/// Joins `/proxy` onto the base URL, keeping any base path.
fn proxy_endpoint(base: &Url) -> Result<Url, ProxyError> {
    let joined = format!("{}/proxy", base.as_str().trim_end_matches('/'));
    Url::parse(&joined).map_err(|e| ProxyError::Other(format!("invalid proxy URL {joined}: {e}")))
}

/// Decodes the proxy body as JSON, or wraps the raw text as `{"text": ...}`.
fn decode_payload(text: String) -> Value {
    from_json(&text).unwrap_or_else(|_| json!({ "text": text }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_endpoint_keeps_base_path() {
        let base = Url::parse("http://localhost:5000").unwrap();
        assert_eq!(proxy_endpoint(&base).unwrap().as_str(), "http://localhost:5000/proxy");

        let base = Url::parse("https://relay.example.com/api/").unwrap();
        assert_eq!(
            proxy_endpoint(&base).unwrap().as_str(),
            "https://relay.example.com/api/proxy"
        );
    }

    #[test]
    fn test_decode_payload() {
        assert_eq!(decode_payload(r#"{"a":1}"#.to_string()), json!({"a": 1}));
        assert_eq!(decode_payload("<html>".to_string()), json!({"text": "<html>"}));
        assert_eq!(decode_payload(String::new()), json!({"text": ""}));
    }
}
