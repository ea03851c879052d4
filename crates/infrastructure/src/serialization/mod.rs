//! Deterministic JSON serialization for Relay data files.
//!
//! Keeps hand-inspected files readable by:
//! - Sorting object keys alphabetically (via `BTreeMap` in domain types)
//! - Using 2-space indentation
//! - Adding trailing newline

mod json;

pub use json::*;
