//! Relay Domain - Core business types
//!
//! This crate defines the domain model for the Relay API client.
//! All types here are pure Rust with no I/O dependencies.

pub mod environment;
pub mod error;
pub mod history;
pub mod identity;
pub mod outcome;
pub mod request;

pub use environment::{Environment, EnvironmentPatch, VariableMap};
pub use error::{DomainError, DomainResult};
pub use history::{Collection, CollectionItem, HistoryRecord, RecordFields};
pub use identity::Identity;
pub use outcome::{DispatchOutcome, FailureKind};
pub use request::{HttpMethod, QueryParam, RequestTemplate, ResolvedRequest};
