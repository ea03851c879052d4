//! Request dispatcher.
//!
//! Hands resolved requests to the proxy and folds every way the exchange
//! can go wrong into a [`DispatchOutcome`]. Successful exchanges are passed
//! to the recorder on a detached task whose result the caller never sees;
//! dropping the dispatcher does not cancel it.

use std::sync::Arc;

use relay_domain::{DispatchOutcome, FailureKind, QueryParam, RequestTemplate, ResolvedRequest};
use serde_json::Value;
use tokio_util::task::TaskTracker;

use crate::error::BuildError;
use crate::ports::{NetworkStatus, ProxyClient, ProxyError, ProxyReply, RecordedExchange, Recorder};
use crate::request_builder::RequestBuilder;
use crate::variable_resolver::VariableResolver;

const GENERIC_FAILURE: &str = "Request failed.";

/// Authoring context kept alongside a dispatch so the recorder can store
/// what the user actually typed.
#[derive(Debug, Clone, Default)]
struct RecordContext {
    body: Option<Value>,
    params: Vec<QueryParam>,
    headers_text: Option<String>,
    collection_id: Option<String>,
}

/// Sends resolved requests through the proxy collaborator.
pub struct Dispatcher<P, N> {
    proxy: P,
    network: N,
    recorder: Option<Arc<dyn Recorder>>,
    recordings: TaskTracker,
}

impl<P: ProxyClient, N: NetworkStatus> Dispatcher<P, N> {
    /// Creates a dispatcher that records nothing.
    #[must_use]
    pub fn new(proxy: P, network: N) -> Self {
        Self {
            proxy,
            network,
            recorder: None,
            recordings: TaskTracker::new(),
        }
    }

    /// Attaches the recorder notified after each successful dispatch.
    #[must_use]
    pub fn with_recorder(mut self, recorder: Arc<dyn Recorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Dispatches an already-resolved request.
    ///
    /// Never fails: every failure becomes [`DispatchOutcome::Failure`].
    pub async fn dispatch(&self, request: &ResolvedRequest) -> DispatchOutcome {
        let context = RecordContext {
            body: request.body.clone(),
            ..RecordContext::default()
        };
        self.dispatch_with(request, context).await
    }

    /// Builds `template` against `resolver` and dispatches the result.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MalformedBody`] before any network call when
    /// the resolved body is not valid JSON.
    pub async fn send(
        &self,
        template: &RequestTemplate,
        resolver: &VariableResolver,
        collection_id: Option<String>,
    ) -> Result<DispatchOutcome, BuildError> {
        let builder = RequestBuilder::new(resolver.clone());
        let request = builder.build(template)?;

        let body = if template.method.sends_body() {
            request.body.clone()
        } else {
            builder.body(&template.body_text).ok().flatten()
        };
        let context = RecordContext {
            body,
            params: template.params.clone(),
            headers_text: template.headers_text_opt().map(str::to_string),
            collection_id,
        };
        Ok(self.dispatch_with(&request, context).await)
    }

    /// Waits for all recordings started so far.
    ///
    /// Recording errors were already logged and are not returned.
    pub async fn flush_recordings(&self) {
        self.recordings.close();
        self.recordings.wait().await;
        self.recordings.reopen();
    }

    async fn dispatch_with(&self, request: &ResolvedRequest, context: RecordContext) -> DispatchOutcome {
        tracing::debug!(method = %request.method, url = %request.final_url, "dispatching request");

        let outcome = match self.proxy.forward(request).await {
            Ok(reply) => match remote_failure(&reply) {
                None => DispatchOutcome::success(reply.payload),
                Some(message) => self.classify(FailureKind::Remote, message).await,
            },
            Err(ProxyError::Transport(message)) => {
                self.classify(FailureKind::NetworkOrCors, message).await
            }
            Err(ProxyError::Other(message)) => self.classify(FailureKind::Other, message).await,
        };

        match &outcome {
            DispatchOutcome::Success { payload } => {
                self.spawn_recording(request, payload.clone(), context);
            }
            DispatchOutcome::Failure { kind, message } => {
                tracing::warn!(?kind, %message, "request failed");
            }
        }
        outcome
    }

    /// Applies the failure precedence: connectivity, then CORS-class
    /// failures, then the specific kind.
    async fn classify(&self, kind: FailureKind, message: String) -> DispatchOutcome {
        if !self.network.is_online().await {
            let kind = FailureKind::NoConnectivity;
            return DispatchOutcome::failure(kind, kind.canned_message().unwrap_or(GENERIC_FAILURE));
        }

        if kind == FailureKind::NetworkOrCors || message.to_lowercase().contains("cors") {
            let kind = FailureKind::NetworkOrCors;
            return DispatchOutcome::failure(kind, kind.canned_message().unwrap_or(GENERIC_FAILURE));
        }

        let message = if message.trim().is_empty() {
            GENERIC_FAILURE.to_string()
        } else {
            message
        };
        DispatchOutcome::failure(kind, message)
    }

    fn spawn_recording(&self, request: &ResolvedRequest, response: Value, context: RecordContext) {
        let Some(recorder) = self.recorder.clone() else {
            return;
        };

        let exchange = RecordedExchange {
            request: request.clone(),
            body: context.body,
            params: context.params,
            headers_text: context.headers_text,
            response,
            collection_id: context.collection_id,
        };

        self.recordings.spawn(async move {
            if let Err(e) = recorder.record(exchange).await {
                tracing::warn!(error = %e, "request was not recorded");
            }
        });
    }
}

/// Returns the failure message for a reply that signals an error.
///
/// A set `error` field wins over the status. `null`, `false`, `""` and `0`
/// count as unset.
fn remote_failure(reply: &ProxyReply) -> Option<String> {
    let error = reply.payload.get("error").filter(|e| is_set(e));

    match error {
        Some(Value::String(message)) => Some(message.clone()),
        Some(other) => Some(other.to_string()),
        None if !reply.is_success() => Some(format!("HTTP {}", reply.status)),
        None => None,
    }
}

fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|n| n.abs() > 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}
