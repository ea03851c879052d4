//! Query parameter types

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A query parameter key-value pair as typed by the user.
///
/// Both fields may contain `{{placeholders}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParam {
    /// The parameter key
    #[serde(default)]
    pub key: String,
    /// The parameter value
    #[serde(default)]
    pub value: String,
}

impl QueryParam {
    /// Creates a new query parameter.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Returns true if the key is empty or whitespace only.
    ///
    /// Blank rows are dropped when the query string is assembled.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.key.trim().is_empty()
    }
}

/// Parses `key=value`. The value may itself contain `=`.
impl FromStr for QueryParam {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split_once('=')
            .map(|(key, value)| Self::new(key, value))
            .ok_or_else(|| DomainError::InvalidPair(s.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_query_param_creation() {
        let param = QueryParam::new("page", "1");
        assert_eq!(param.key, "page");
        assert_eq!(param.value, "1");
        assert!(!param.is_blank());
    }

    #[test]
    fn test_blank_key() {
        assert!(QueryParam::new("", "x").is_blank());
        assert!(QueryParam::new("   ", "x").is_blank());
    }

    #[test]
    fn test_parse_pair() {
        let param: QueryParam = "filter=a=b".parse().unwrap();
        assert_eq!(param, QueryParam::new("filter", "a=b"));
        assert!("novalue".parse::<QueryParam>().is_err());
    }
}
