//! Environment variable types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Variables keyed by name (without `{{ }}`).
///
/// A `BTreeMap` keeps persisted output stable; order carries no meaning.
pub type VariableMap = BTreeMap<String, String>;

/// A named, switchable set of variables used to parameterize requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Opaque identifier, immutable once created.
    pub id: String,
    /// Human label (e.g., "Development"). Not required to be unique.
    pub name: String,
    /// Variables in this environment.
    #[serde(default)]
    pub variables: VariableMap,
}

impl Environment {
    /// Creates an environment with the given id, name and variables.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, variables: VariableMap) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            variables,
        }
    }

    /// The environments a fresh installation starts with.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(
                "dev",
                "Development",
                variables([("baseUrl", "dev.api.example.com"), ("token", "dev-token")]),
            ),
            Self::new(
                "staging",
                "Staging",
                variables([("baseUrl", "staging.api.example.com"), ("token", "staging-token")]),
            ),
            Self::new(
                "prod",
                "Production",
                variables([("baseUrl", "api.example.com"), ("token", "")]),
            ),
        ]
    }

    /// The variable keys every newly created environment is seeded with.
    #[must_use]
    pub fn starter_variables() -> VariableMap {
        variables([("baseUrl", ""), ("token", "")])
    }

    /// Adds or replaces a variable.
    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }

    /// Returns the value of a variable, if defined.
    #[must_use]
    pub fn get_variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// Applies a patch. Each present field replaces the current one wholesale.
    pub fn apply(&mut self, patch: EnvironmentPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(variables) = patch.variables {
            self.variables = variables;
        }
    }
}

/// Partial update for an [`Environment`].
///
/// `variables` is a full replacement of the map, not a per-key merge.
/// Callers that want to change one key build the merged map first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentPatch {
    /// New name, if changing.
    pub name: Option<String>,
    /// New variable map, if changing.
    pub variables: Option<VariableMap>,
}

impl EnvironmentPatch {
    /// A patch that only renames.
    #[must_use]
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            variables: None,
        }
    }

    /// A patch that only replaces the variables.
    #[must_use]
    pub const fn with_variables(variables: VariableMap) -> Self {
        Self {
            name: None,
            variables: Some(variables),
        }
    }

    /// Returns true if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.variables.is_none()
    }
}

fn variables<const N: usize>(pairs: [(&str, &str); N]) -> VariableMap {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
