//! Variable resolution module
//!
//! Provides parsing and resolution of `{{variable}}` syntax in strings.
//!
//! # Usage
//!
//! ```
//! use relay_application::variable_resolver::VariableResolver;
//! use relay_domain::{Environment, VariableMap};
//!
//! let mut env = Environment::new("dev", "Development", VariableMap::new());
//! env.set_variable("host", "localhost");
//!
//! let resolver = VariableResolver::from_environment(Some(&env));
//! let result = resolver.resolve("http://{{host}}/api");
//! assert_eq!(result.resolved, "http://localhost/api");
//! ```
//!
//! Known limitation: `{{foo.bar}}` looks up the literal key `foo.bar`;
//! there is no nested-property traversal.

pub mod engine;
pub mod parser;

pub use engine::{ResolutionResult, VariableResolver, resolve};
pub use parser::{VariableReference, extract_variable_names, has_variables, parse_variables};
