//! Dispatch outcome types.
//!
//! A dispatch never fails with an `Err`: transport and remote failures are
//! folded into [`DispatchOutcome::Failure`] with a user-facing message.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of handing a resolved request to the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// The proxy answered with a 2xx and no `error` field.
    Success {
        /// Decoded response body, or `{"text": raw}` when it was not JSON.
        payload: Value,
    },

    /// The request did not produce a usable response.
    Failure {
        /// Failure category.
        kind: FailureKind,
        /// Human-readable message.
        message: String,
    },
}

impl DispatchOutcome {
    /// Creates a Success outcome.
    #[must_use]
    pub const fn success(payload: Value) -> Self {
        Self::Success { payload }
    }

    /// Creates a Failure outcome with an explicit message.
    #[must_use]
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            message: message.into(),
        }
    }

    /// Returns true for a successful dispatch.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the payload if successful.
    #[must_use]
    pub const fn payload(&self) -> Option<&Value> {
        match self {
            Self::Success { payload } => Some(payload),
            Self::Failure { .. } => None,
        }
    }

    /// Returns the failure message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { message, .. } => Some(message),
        }
    }
}

/// Categories of dispatch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The local network is unavailable.
    NoConnectivity,

    /// The proxy could not be reached, or reported a CORS-class failure.
    NetworkOrCors,

    /// The proxy answered with a non-2xx status or an `error` field.
    Remote,

    /// Anything else.
    Other,
}

impl FailureKind {
    /// Returns the fixed message for kinds that have one.
    #[must_use]
    pub const fn canned_message(&self) -> Option<&'static str> {
        match self {
            Self::NoConnectivity => Some("No internet connection. Please check your network."),
            Self::NetworkOrCors => Some("CORS or network error: check API or proxy."),
            Self::Remote | Self::Other => None,
        }
    }
}
