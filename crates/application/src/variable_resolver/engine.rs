//! Variable resolution engine
//!
//! Substitutes `{{variable}}` references from a single variable snapshot.
//! Unknown variables become the empty string. Substitution is one pass over
//! the input: a value that itself contains `{{...}}` is not re-resolved.

use std::borrow::Cow;

use relay_domain::{Environment, VariableMap};
use serde_json::Value;

use super::parser::parse_variables;

/// Result of variable resolution for a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult {
    /// The resolved string with all references substituted.
    pub resolved: String,

    /// Names that were found in the snapshot, in order of appearance.
    pub resolved_variables: Vec<String>,

    /// Names that were not defined and were replaced by the empty string.
    pub unresolved: Vec<String>,
}

impl ResolutionResult {
    /// Creates a result for input with no variables.
    #[must_use]
    pub fn no_variables(input: &str) -> Self {
        Self {
            resolved: input.to_string(),
            resolved_variables: Vec::new(),
            unresolved: Vec::new(),
        }
    }

    /// Whether every referenced variable was defined.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Resolves placeholders against one immutable variable snapshot.
///
/// Building every field of a request from the same resolver guarantees
/// that no field sees a different version of the environment.
#[derive(Debug, Clone, Default)]
pub struct VariableResolver {
    variables: VariableMap,
}

impl VariableResolver {
    /// Creates a resolver over the given variables.
    #[must_use]
    pub const fn new(variables: VariableMap) -> Self {
        Self { variables }
    }

    /// Creates a resolver with no variables; every reference resolves to "".
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a resolver from the current environment, if any.
    #[must_use]
    pub fn from_environment(environment: Option<&Environment>) -> Self {
        environment.map_or_else(Self::empty, |env| Self::new(env.variables.clone()))
    }

    /// Returns the snapshot this resolver reads from.
    #[must_use]
    pub const fn variables(&self) -> &VariableMap {
        &self.variables
    }

    /// Resolves all references in `input`, returning the text only.
    #[must_use]
    pub fn resolve_str<'a>(&self, input: &'a str) -> Cow<'a, str> {
        substitute(input, &self.variables)
    }

    /// Resolves all references in `input` and reports which names were
    /// defined and which were not.
    #[must_use]
    pub fn resolve(&self, input: &str) -> ResolutionResult {
        let references = parse_variables(input);
        if references.is_empty() {
            return ResolutionResult::no_variables(input);
        }

        let (resolved_variables, unresolved): (Vec<_>, Vec<_>) = references
            .into_iter()
            .map(|r| r.name)
            .partition(|name| self.variables.contains_key(name));

        ResolutionResult {
            resolved: self.resolve_str(input).into_owned(),
            resolved_variables,
            unresolved,
        }
    }

    /// Resolves an optional string; `None` passes through untouched.
    #[must_use]
    pub fn resolve_opt(&self, input: Option<&str>) -> Option<String> {
        input.map(|s| self.resolve_str(s).into_owned())
    }

    /// Resolves a JSON value. Strings are resolved; any other value,
    /// including `null`, is returned unchanged.
    #[must_use]
    pub fn resolve_value(&self, value: &Value) -> Value {
        match value {
            Value::String(s) => Value::String(self.resolve_str(s).into_owned()),
            other => other.clone(),
        }
    }

    /// Names in `input` that the snapshot does not define.
    #[must_use]
    pub fn find_unresolved(&self, input: &str) -> Vec<String> {
        parse_variables(input)
            .into_iter()
            .map(|r| r.name)
            .filter(|name| !self.variables.contains_key(name))
            .collect()
    }
}

/// Resolves `input` against `variables` in one call.
///
/// ```
/// use relay_application::variable_resolver::resolve;
/// use relay_domain::VariableMap;
///
/// let mut vars = VariableMap::new();
/// vars.insert("host".to_string(), "localhost".to_string());
/// assert_eq!(resolve("http://{{host}}/{{missing}}", &vars), "http://localhost/");
/// ```
#[must_use]
pub fn resolve(input: &str, variables: &VariableMap) -> String {
    substitute(input, variables).into_owned()
}

fn substitute<'a>(input: &'a str, variables: &VariableMap) -> Cow<'a, str> {
    let references = parse_variables(input);
    if references.is_empty() {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len());
    let mut last_end = 0;
    for var_ref in &references {
        result.push_str(&input[last_end..var_ref.span.start]);
        if let Some(value) = variables.get(&var_ref.name) {
            result.push_str(value);
        }
        last_end = var_ref.span.end;
    }
    result.push_str(&input[last_end..]);

    Cow::Owned(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn vars(pairs: &[(&str, &str)]) -> VariableMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn create_test_resolver() -> VariableResolver {
        VariableResolver::new(vars(&[
            ("baseUrl", "https://api.x.com"),
            ("userId", "42"),
            ("token", "sk-123"),
            ("user.id", "dotted"),
            ("nested", "{{token}}"),
        ]))
    }

    #[test]
    fn test_resolve_no_variables() {
        let resolver = create_test_resolver();
        let result = resolver.resolve("Hello, World!");
        assert_eq!(result.resolved, "Hello, World!");
        assert!(result.is_complete());
        assert!(result.resolved_variables.is_empty());
    }

    #[test]
    fn test_plain_text_is_borrowed() {
        let resolver = create_test_resolver();
        assert!(matches!(resolver.resolve_str("no placeholders"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_resolve_known_variable() {
        let resolver = create_test_resolver();
        assert_eq!(resolver.resolve_str("{{userId}}"), "42");
        assert_eq!(
            resolver.resolve_str("{{baseUrl}}/users/{{userId}}"),
            "https://api.x.com/users/42"
        );
    }

    #[test]
    fn test_unknown_variable_becomes_empty() {
        let resolver = create_test_resolver();
        let result = resolver.resolve("a{{missing}}b");
        assert_eq!(result.resolved, "ab");
        assert_eq!(result.unresolved, vec!["missing"]);
        assert!(!result.is_complete());
    }

    #[test]
    fn test_mixed_resolved_unresolved() {
        let resolver = create_test_resolver();
        let result = resolver.resolve("{{baseUrl}}/{{unknown}}/users");
        assert_eq!(result.resolved, "https://api.x.com//users");
        assert_eq!(result.resolved_variables, vec!["baseUrl"]);
        assert_eq!(result.unresolved, vec!["unknown"]);
    }

    #[test]
    fn test_whitespace_inside_braces() {
        let resolver = create_test_resolver();
        assert_eq!(resolver.resolve_str("Bearer {{ token }}"), "Bearer sk-123");
    }

    #[test]
    fn test_dotted_name_is_literal_key() {
        let resolver = create_test_resolver();
        assert_eq!(resolver.resolve_str("{{user.id}}"), "dotted");
        assert_eq!(resolver.resolve_str("{{user.name}}"), "");
    }

    #[test]
    fn test_single_pass_substitution() {
        let resolver = create_test_resolver();
        assert_eq!(resolver.resolve_str("{{nested}}"), "{{token}}");
    }

    #[test]
    fn test_resolving_resolved_text_is_noop() {
        let resolver = create_test_resolver();
        let once = resolver.resolve_str("{{baseUrl}}/users/{{userId}}").into_owned();
        assert_eq!(resolver.resolve_str(&once), once);
    }

    #[test]
    fn test_deterministic() {
        let resolver = create_test_resolver();
        let input = "{{baseUrl}}?t={{token}}&x={{nope}}";
        assert_eq!(resolver.resolve(input), resolver.resolve(input));
    }

    #[test]
    fn test_resolve_value_passes_non_strings_through() {
        let resolver = create_test_resolver();
        assert_eq!(resolver.resolve_value(&Value::Null), Value::Null);
        assert_eq!(resolver.resolve_value(&json!(7)), json!(7));
        assert_eq!(resolver.resolve_value(&json!(["{{userId}}"])), json!(["{{userId}}"]));
        assert_eq!(resolver.resolve_value(&json!("id={{userId}}")), json!("id=42"));
    }

    #[test]
    fn test_resolve_opt() {
        let resolver = create_test_resolver();
        assert_eq!(resolver.resolve_opt(None), None);
        assert_eq!(resolver.resolve_opt(Some("{{userId}}")), Some("42".to_string()));
    }

    #[test]
    fn test_empty_resolver() {
        let resolver = VariableResolver::empty();
        assert_eq!(resolver.resolve_str("{{baseUrl}}/users"), "/users");
    }

    #[test]
    fn test_from_environment() {
        let env = Environment::new("dev", "Development", vars(&[("host", "localhost")]));
        assert_eq!(
            VariableResolver::from_environment(Some(&env)).resolve_str("{{host}}"),
            "localhost"
        );
        assert_eq!(
            VariableResolver::from_environment(None).resolve_str("{{host}}"),
            ""
        );
    }

    #[test]
    fn test_find_unresolved() {
        let resolver = create_test_resolver();
        let unresolved = resolver.find_unresolved("{{baseUrl}}/{{unknown}}/{{other}}");
        assert_eq!(unresolved, vec!["unknown", "other"]);
    }

    #[test]
    fn test_free_function_matches_resolver() {
        let variables = vars(&[("a", "1"), ("b", "2")]);
        let input = "{{a}}-{{b}}-{{c}}";
        assert_eq!(
            resolve(input, &variables),
            VariableResolver::new(variables.clone()).resolve_str(input)
        );
    }
}
