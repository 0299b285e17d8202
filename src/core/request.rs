use std::fmt;
use std::sync::{Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::{self, ResponsesRequest, ResponsesResponse};
use crate::core::constants::{CREDENTIAL_ENV, RESPONSES_PATH};
use crate::core::session::SessionContext;
use crate::utils::url::join_endpoint;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// No bearer credential is configured; the request is never sent.
    MissingCredential,
    /// The HTTP exchange failed or the server answered with a non-success
    /// status.
    Transport(String),
    /// The response body could not be decoded.
    Parse(String),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::MissingCredential => {
                write!(f, "no API credential configured (set {CREDENTIAL_ENV})")
            }
            RequestError::Transport(detail) => write!(f, "request failed: {detail}"),
            RequestError::Parse(detail) => write!(f, "could not decode response: {detail}"),
        }
    }
}

impl std::error::Error for RequestError {}

#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    /// Model override; the manager's default model is used when absent.
    pub model: Option<String>,
}

#[derive(Default)]
struct RequestState {
    loading: bool,
    output: Option<String>,
    error: Option<RequestError>,
    cancel_token: Option<CancellationToken>,
    current_request_id: u64,
}

/// Single-flight request lifecycle manager.
///
/// At most one request may affect shared state: starting a new send retires
/// the previous cancellation token and bumps the request id, and a
/// completion only writes `loading`/`output`/`error` while its id still
/// matches the manager's current one. A superseded request that resolves
/// late is discarded.
pub struct ResponseManager {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    default_model: String,
    state: Mutex<RequestState>,
}

impl ResponseManager {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
            default_model: default_model.into(),
            state: Mutex::new(RequestState::default()),
        }
    }

    pub fn from_session(session: &SessionContext) -> Self {
        Self::new(
            session.client.clone(),
            session.base_url.clone(),
            session.api_key.clone(),
            session.model.clone(),
        )
    }

    fn state(&self) -> MutexGuard<'_, RequestState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    pub fn last_output(&self) -> Option<String> {
        self.state().output.clone()
    }

    pub fn last_error(&self) -> Option<RequestError> {
        self.state().error.clone()
    }

    /// Cancel the in-flight request, if any. Output and error keep whatever
    /// was last recorded; only the loading flag is cleared.
    pub fn abort(&self) {
        let mut state = self.state();
        if let Some(token) = state.cancel_token.take() {
            debug!(request_id = state.current_request_id, "aborting in-flight request");
            token.cancel();
            // Retire the id as well: a completion that raced the
            // cancellation can never match again.
            state.current_request_id += 1;
        }
        state.loading = false;
    }

    /// Abort, then restore the initial idle state.
    pub fn reset(&self) {
        self.abort();
        let mut state = self.state();
        state.output = None;
        state.error = None;
        state.loading = false;
    }

    /// Send one prompt to the text-generation endpoint.
    ///
    /// Any request still in flight is cancelled first. `Ok(None)` covers
    /// three quiet outcomes: the response carried no extractable text, the
    /// request was aborted, or it was superseded by a newer send. Failures
    /// are both returned and recorded in the error field.
    pub async fn send(
        &self,
        input: &str,
        options: SendOptions,
    ) -> Result<Option<String>, RequestError> {
        self.abort();

        let Some(api_key) = self.api_key.clone() else {
            let err = RequestError::MissingCredential;
            let mut state = self.state();
            state.loading = false;
            state.error = Some(err.clone());
            return Err(err);
        };

        let (token, request_id) = self.begin_request();
        let model = options
            .model
            .unwrap_or_else(|| self.default_model.clone());
        debug!(request_id, %model, "dispatching responses request");

        let outcome = tokio::select! {
            _ = token.cancelled() => {
                debug!(request_id, "request cancelled before completion");
                None
            }
            result = self.perform(&api_key, model, input) => Some(result),
        };

        self.finish_request(request_id, &token, outcome)
    }

    /// Apply a request's outcome to shared state. Only the request still
    /// holding the current id may write, and a retired token discards the
    /// outcome even when the id matches: a response landing in the same
    /// poll as an abort counts as cancelled, not completed.
    fn finish_request(
        &self,
        request_id: u64,
        token: &CancellationToken,
        outcome: Option<Result<Option<String>, RequestError>>,
    ) -> Result<Option<String>, RequestError> {
        let mut state = self.state();
        if state.current_request_id != request_id {
            // A newer send owns the state now; this result is stale.
            debug!(request_id, "discarding superseded result");
            return Ok(None);
        }

        let outcome = if token.is_cancelled() { None } else { outcome };

        state.loading = false;
        state.cancel_token = None;

        match outcome {
            None => Ok(None),
            Some(Ok(text)) => {
                state.output = text.clone();
                state.error = None;
                Ok(text)
            }
            Some(Err(err)) => {
                state.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Retire the previous token and hand out a fresh one. Only the request
    /// holding the returned id may write completion state.
    fn begin_request(&self) -> (CancellationToken, u64) {
        let mut state = self.state();
        if let Some(token) = state.cancel_token.take() {
            token.cancel();
        }
        state.current_request_id += 1;
        let token = CancellationToken::new();
        state.cancel_token = Some(token.clone());
        state.loading = true;
        state.error = None;
        (token, state.current_request_id)
    }

    async fn perform(
        &self,
        api_key: &str,
        model: String,
        input: &str,
    ) -> Result<Option<String>, RequestError> {
        let url = join_endpoint(&self.base_url, RESPONSES_PATH);
        let request = ResponsesRequest {
            model,
            input: input.to_string(),
        };

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&request)
            .send()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(RequestError::Transport(format!(
                "HTTP {}: {}",
                status.as_u16(),
                api::describe_error_body(&body)
            )));
        }

        let payload: ResponsesResponse = response
            .json()
            .await
            .map_err(|e| RequestError::Parse(e.to_string()))?;
        Ok(api::extract_output_text(&payload))
    }
}
