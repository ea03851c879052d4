//! Request template type

use serde::{Deserialize, Serialize};

use super::{HttpMethod, QueryParam};

/// A request as the user authored it, placeholders and all.
///
/// Templates are not persisted on their own; they become history or
/// collection records when sent or saved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTemplate {
    /// Target URL, may contain placeholders.
    pub url: String,
    /// HTTP method.
    #[serde(default)]
    pub method: HttpMethod,
    /// Query parameters, in order.
    #[serde(default)]
    pub params: Vec<QueryParam>,
    /// Headers as a JSON object string or `Key: Value` lines.
    #[serde(default)]
    pub headers_text: String,
    /// Body text, expected to be JSON once resolved.
    #[serde(default)]
    pub body_text: String,
}

impl RequestTemplate {
    /// Creates a template with the given method and URL.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            ..Self::default()
        }
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push(QueryParam::new(key, value));
        self
    }

    /// Sets the raw headers text.
    #[must_use]
    pub fn with_headers(mut self, headers_text: impl Into<String>) -> Self {
        self.headers_text = headers_text.into();
        self
    }

    /// Sets the raw body text.
    #[must_use]
    pub fn with_body(mut self, body_text: impl Into<String>) -> Self {
        self.body_text = body_text.into();
        self
    }

    /// Returns the raw headers text, or `None` when blank.
    #[must_use]
    pub fn headers_text_opt(&self) -> Option<&str> {
        if self.headers_text.trim().is_empty() {
            None
        } else {
            Some(&self.headers_text)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder_helpers() {
        let template = RequestTemplate::new(HttpMethod::Post, "{{baseUrl}}/users")
            .with_param("id", "{{userId}}")
            .with_headers("Accept: application/json")
            .with_body(r#"{"name":"{{userName}}"}"#);

        assert_eq!(template.method, HttpMethod::Post);
        assert_eq!(template.params, vec![QueryParam::new("id", "{{userId}}")]);
        assert_eq!(template.headers_text_opt(), Some("Accept: application/json"));
    }

    #[test]
    fn test_blank_headers_text() {
        let template = RequestTemplate::new(HttpMethod::Get, "x").with_headers("  \n ");
        assert_eq!(template.headers_text_opt(), None);
    }

    #[test]
    fn test_deserialize_camel_case() {
        let template: RequestTemplate = serde_json::from_str(
            r#"{"url":"u","method":"PUT","headersText":"A: b","bodyText":"{}"}"#,
        )
        .unwrap();
        assert_eq!(template.method, HttpMethod::Put);
        assert_eq!(template.headers_text, "A: b");
        assert_eq!(template.body_text, "{}");
        assert!(template.params.is_empty());
    }
}
