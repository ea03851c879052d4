//! Variable parser for {{variable}} syntax
//!
//! Parses strings to extract variable references with their positions.
//!
//! Grammar: `{{`, optional whitespace, a name of ASCII word characters, dots or
//! hyphens, optional whitespace, `}}`. Anything else between braces is
//! left alone as literal text.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_.\-]+)\s*\}\}").expect("placeholder pattern is valid")
});

/// Represents a parsed variable reference in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableReference {
    /// The variable name (without {{ }} and surrounding whitespace).
    pub name: String,

    /// Byte range in the original string where this reference appears.
    pub span: Range<usize>,
}

impl VariableReference {
    /// Creates a new variable reference.
    #[must_use]
    pub fn new(name: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// Parses a string and extracts all variable references, left to right.
///
/// Dotted names such as `{{user.id}}` are a single literal key; there is
/// no nested lookup.
///
/// # Examples
///
/// ```
/// use relay_application::variable_resolver::parser::parse_variables;
///
/// let refs = parse_variables("Hello {{name}}, your ID is {{ user.id }}");
/// assert_eq!(refs.len(), 2);
/// assert_eq!(refs[0].name, "name");
/// assert_eq!(refs[1].name, "user.id");
/// ```
#[must_use]
pub fn parse_variables(input: &str) -> Vec<VariableReference> {
    PLACEHOLDER
        .captures_iter(input)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            Some(VariableReference::new(name.as_str(), whole.range()))
        })
        .collect()
}

/// Returns true if the input string contains any variable references.
#[must_use]
pub fn has_variables(input: &str) -> bool {
    PLACEHOLDER.is_match(input)
}

/// Extracts just the variable names from the input without full parsing info.
#[must_use]
pub fn extract_variable_names(input: &str) -> Vec<String> {
    parse_variables(input).into_iter().map(|r| r.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_simple_variable() {
        let refs = parse_variables("{{name}}");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "name");
        assert_eq!(refs[0].span, 0..8);
    }

    #[test]
    fn test_parse_multiple_variables() {
        let refs = parse_variables("{{baseUrl}}/api/{{version}}/users/{{userId}}");
        let names: Vec<_> = refs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["baseUrl", "version", "userId"]);
    }

    #[test]
    fn test_parse_with_whitespace() {
        let refs = parse_variables("{{  name\t}}");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "name");
    }

    #[test]
    fn test_dotted_and_hyphenated_names() {
        let names = extract_variable_names("{{user.id}} {{api-key}} {{a_b}}");
        assert_eq!(names, vec!["user.id", "api-key", "a_b"]);
    }

    #[test]
    fn test_no_variables() {
        assert!(parse_variables("Hello, World!").is_empty());
    }

    #[test]
    fn test_unclosed_variable() {
        assert!(parse_variables("{{name").is_empty());
    }

    #[test]
    fn test_empty_variable() {
        assert!(parse_variables("{{}}").is_empty());
        assert!(parse_variables("{{   }}").is_empty());
    }

    #[test]
    fn test_names_outside_grammar_are_ignored() {
        assert!(parse_variables("{{$uuid}}").is_empty());
        assert!(parse_variables("{{two words}}").is_empty());
    }

    #[test]
    fn test_single_brace() {
        assert!(parse_variables("{name}").is_empty());
    }

    #[test]
    fn test_variable_in_json() {
        let refs = parse_variables(r#"{"name": "{{userName}}", "id": {{id}}}"#);
        let names: Vec<_> = refs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["userName", "id"]);
    }

    #[test]
    fn test_adjacent_variables() {
        let names = extract_variable_names("{{a}}{{b}}{{c}}");
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_has_variables() {
        assert!(has_variables("{{name}}"));
        assert!(has_variables("Hello {{ name }}!"));
        assert!(!has_variables("Hello World!"));
        assert!(!has_variables("{{incomplete"));
        assert!(!has_variables("{{}}"));
    }

    #[test]
    fn test_span_positions() {
        let input = "Hello {{name}}, welcome!";
        let refs = parse_variables(input);
        assert_eq!(refs.len(), 1);
        assert_eq!(&input[refs[0].span.clone()], "{{name}}");
    }
}
