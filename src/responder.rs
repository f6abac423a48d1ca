//! Server-side timing instrumentation
//!
//! [`instrument`] wraps a [`Handler`] so that every call reports its own
//! timing through the six `X-Lambda-*` / `X-Endpoint-*` headers. The
//! wrapper is transport agnostic: it takes the decoded JSON payload and
//! returns status, content type, body bytes and headers, which any HTTP
//! framework can copy onto its own response type.
//!
//! The endpoint scope covers the handler invocation only. The lambda scope
//! additionally covers serializing the response body.

use crate::timing::{
    format_duration_seconds, format_epoch_seconds, ENDPOINT_DURATION_HEADER, ENDPOINT_END_HEADER,
    ENDPOINT_START_HEADER, LAMBDA_DURATION_HEADER, LAMBDA_END_HEADER, LAMBDA_START_HEADER,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::time::{Duration, Instant};

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Response body produced by a handler
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Binary { content_type: String, bytes: Vec<u8> },
}

/// Successful handler result
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerOutput {
    pub status: u16,
    pub body: ResponseBody,
}

impl HandlerOutput {
    /// 200 with a JSON body
    pub fn json(body: Value) -> Self {
        Self {
            status: 200,
            body: ResponseBody::Json(body),
        }
    }

    /// 200 with raw bytes of the given content type
    pub fn binary<S: Into<String>>(content_type: S, bytes: Vec<u8>) -> Self {
        Self {
            status: 200,
            body: ResponseBody::Binary {
                content_type: content_type.into(),
                bytes,
            },
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }
}

/// Structured handler failure, rendered as `{"error": message}`
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerError {
    pub status: u16,
    pub message: String,
}

impl HandlerError {
    pub fn new<S: Into<String>>(status: u16, message: S) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400 for payloads the handler cannot work with
    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::new(400, message)
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::new(500, message)
    }

    fn to_body(&self) -> Value {
        json!({ "error": self.message })
    }
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.status)
    }
}

impl std::error::Error for HandlerError {}

pub type HandlerResult = Result<HandlerOutput, HandlerError>;

/// Business logic behind one endpoint: JSON payload in, JSON or binary out
pub trait Handler: Send + Sync {
    fn handle(&self, payload: &Value) -> HandlerResult;
}

impl<F> Handler for F
where
    F: Fn(&Value) -> HandlerResult + Send + Sync,
{
    fn handle(&self, payload: &Value) -> HandlerResult {
        self(payload)
    }
}

/// Fully rendered response including the timing headers
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentedResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
    pub headers: Vec<(String, String)>,
}

impl InstrumentedResponse {
    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Body decoded as JSON, when it is JSON
    pub fn json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

/// A handler wrapped with timing capture
pub struct Instrumented<H> {
    handler: H,
}

/// Wrap a handler so each call emits the timing headers
pub fn instrument<H: Handler>(handler: H) -> Instrumented<H> {
    Instrumented { handler }
}

/// Start of a timing scope: wall clock for reporting, monotonic clock for measuring
struct ScopeClock {
    started_at: DateTime<Utc>,
    clock: Instant,
}

impl ScopeClock {
    fn start() -> Self {
        Self {
            started_at: Utc::now(),
            clock: Instant::now(),
        }
    }

    fn finish(self) -> ScopeReading {
        let elapsed = self.clock.elapsed();
        let ended_at = chrono::Duration::from_std(elapsed)
            .ok()
            .and_then(|delta| self.started_at.checked_add_signed(delta))
            .unwrap_or(self.started_at);

        ScopeReading {
            started_at: self.started_at,
            ended_at,
            elapsed,
        }
    }
}

struct ScopeReading {
    started_at: DateTime<Utc>,
    ended_at: DateTime<Utc>,
    elapsed: Duration,
}

impl ScopeReading {
    fn push_headers(&self, headers: &mut Vec<(String, String)>, start: &str, end: &str, duration: &str) {
        headers.push((start.to_string(), format_epoch_seconds(self.started_at)));
        headers.push((end.to_string(), format_epoch_seconds(self.ended_at)));
        headers.push((duration.to_string(), format_duration_seconds(self.elapsed)));
    }
}

impl<H: Handler> Instrumented<H> {
    /// Borrow the wrapped handler
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Invoke the handler and render the response with timing headers
    pub fn call(&self, payload: &Value) -> InstrumentedResponse {
        let lambda = ScopeClock::start();

        let endpoint = ScopeClock::start();
        let result = self.handler.handle(payload);
        let endpoint = endpoint.finish();

        let (status, content_type, body) = render(result);
        let lambda = lambda.finish();

        let mut headers = Vec::with_capacity(7);
        headers.push(("Content-Type".to_string(), content_type.clone()));
        lambda.push_headers(&mut headers, LAMBDA_START_HEADER, LAMBDA_END_HEADER, LAMBDA_DURATION_HEADER);
        endpoint.push_headers(&mut headers, ENDPOINT_START_HEADER, ENDPOINT_END_HEADER, ENDPOINT_DURATION_HEADER);

        InstrumentedResponse {
            status,
            content_type,
            body,
            headers,
        }
    }
}

fn render(result: HandlerResult) -> (u16, String, Vec<u8>) {
    match result {
        Ok(HandlerOutput {
            status,
            body: ResponseBody::Json(value),
        }) => match serde_json::to_vec(&value) {
            Ok(bytes) => (status, JSON_CONTENT_TYPE.to_string(), bytes),
            Err(e) => render_error(&HandlerError::internal(format!("failed to encode response: {}", e))),
        },
        Ok(HandlerOutput {
            status,
            body: ResponseBody::Binary { content_type, bytes },
        }) => (status, content_type, bytes),
        Err(error) => render_error(&error),
    }
}

fn render_error(error: &HandlerError) -> (u16, String, Vec<u8>) {
    (
        error.status,
        JSON_CONTENT_TYPE.to_string(),
        error.to_body().to_string().into_bytes(),
    )
}
