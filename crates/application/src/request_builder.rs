//! Request Template Builder
//!
//! Turns a [`RequestTemplate`] into a [`ResolvedRequest`] using a single
//! variable snapshot. Only a malformed body is fatal; headers always have a
//! fallback parse.

use std::collections::BTreeMap;

use relay_domain::{QueryParam, RequestTemplate, ResolvedRequest};
use serde_json::Value;

use crate::error::BuildError;
use crate::variable_resolver::VariableResolver;

/// How the headers text was interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderSource {
    /// No headers were given.
    Empty,
    /// Parsed as a JSON object after resolution.
    Json,
    /// Parsed as `Key: Value` lines.
    Lines,
}

/// Builds resolved request descriptors from templates.
#[derive(Debug, Clone, Default)]
pub struct RequestBuilder {
    resolver: VariableResolver,
}

impl RequestBuilder {
    /// Creates a builder reading from the given resolver snapshot.
    #[must_use]
    pub const fn new(resolver: VariableResolver) -> Self {
        Self { resolver }
    }

    /// Returns the resolver used for every field.
    #[must_use]
    pub const fn resolver(&self) -> &VariableResolver {
        &self.resolver
    }

    /// Builds the descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MalformedBody`] when the method carries a body
    /// and the resolved body text is not valid JSON. No partial descriptor is
    /// produced in that case.
    pub fn build(&self, template: &RequestTemplate) -> Result<ResolvedRequest, BuildError> {
        let final_url = self.final_url(&template.url, &template.params);
        let (headers, source) = self.headers(&template.headers_text);
        tracing::debug!(?source, count = headers.len(), "parsed request headers");

        let body = if template.method.sends_body() {
            self.body(&template.body_text)?
        } else {
            None
        };

        Ok(ResolvedRequest {
            final_url,
            method: template.method,
            headers,
            body,
        })
    }

    /// Resolves the URL and appends the non-blank params, each key and value
    /// resolved and then percent-encoded.
    #[must_use]
    pub fn final_url(&self, url: &str, params: &[QueryParam]) -> String {
        let resolved = self.resolver.resolve_str(url);

        let query = params
            .iter()
            .filter(|p| !p.is_blank())
            .filter_map(|p| {
                let key = self.resolver.resolve_str(&p.key);
                if key.trim().is_empty() {
                    return None;
                }
                let value = self.resolver.resolve_str(&p.value);
                Some(format!("{}={}", encode_component(&key), encode_component(&value)))
            })
            .collect::<Vec<_>>()
            .join("&");

        if query.is_empty() {
            return resolved.into_owned();
        }

        let separator = if resolved.contains('?') { '&' } else { '?' };
        format!("{resolved}{separator}{query}")
    }

    /// Parses the headers text, trying a JSON object first and falling back
    /// to `Key: Value` lines. Results from the two paths are never mixed.
    #[must_use]
    pub fn headers(&self, headers_text: &str) -> (BTreeMap<String, String>, HeaderSource) {
        if headers_text.trim().is_empty() {
            return (BTreeMap::new(), HeaderSource::Empty);
        }

        let resolved = self.resolver.resolve_str(headers_text);
        match serde_json::from_str::<Value>(&resolved) {
            Ok(Value::Object(map)) => {
                let headers = map
                    .into_iter()
                    .map(|(name, value)| (name, header_value(value)))
                    .collect();
                (headers, HeaderSource::Json)
            }
            _ => (self.header_lines(headers_text), HeaderSource::Lines),
        }
    }

    fn header_lines(&self, headers_text: &str) -> BTreeMap<String, String> {
        headers_text
            .lines()
            .filter_map(|line| line.split_once(':'))
            .filter_map(|(name, value)| {
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                let value = self.resolver.resolve_str(value.trim()).into_owned();
                Some((name.to_string(), value))
            })
            .collect()
    }

    /// Resolves and parses the body text; blank text means no body.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MalformedBody`] if the resolved text is not JSON.
    pub fn body(&self, body_text: &str) -> Result<Option<Value>, BuildError> {
        if body_text.trim().is_empty() {
            return Ok(None);
        }

        let resolved = self.resolver.resolve_str(body_text);
        serde_json::from_str(&resolved)
            .map(Some)
            .map_err(|e| BuildError::MalformedBody(e.to_string()))
    }
}

/// Percent-encodes a query component, leaving `!'()*` literal along with
/// the unreserved characters, as browsers' `encodeURIComponent` does.
fn encode_component(raw: &str) -> String {
    const KEPT: [(&str, &str); 5] =
        [("%21", "!"), ("%27", "'"), ("%28", "("), ("%29", ")"), ("%2A", "*")];

    // A literal `%` is itself encoded, so every `%` in the output starts an escape.
    KEPT.iter()
        .fold(urlencoding::encode(raw).into_owned(), |encoded, (escape, literal)| {
            encoded.replace(escape, literal)
        })
}

/// JSON header values that are not strings are sent in their JSON form.
fn header_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
