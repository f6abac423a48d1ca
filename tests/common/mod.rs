//! Shared helpers for integration tests: mock deployments built from
//! instrumented handlers, and a fixed-header responder.

#![allow(dead_code)]

use latency_probe::responder::{instrument, Handler, HandlerError, HandlerOutput, HandlerResult, Instrumented};
use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, Request, Respond, ResponseTemplate,
};

/// wiremock responder that runs a handler through the timing wrapper
pub struct InstrumentedResponder<H> {
    inner: Instrumented<H>,
}

impl<H: Handler> InstrumentedResponder<H> {
    pub fn new(handler: H) -> Self {
        Self {
            inner: instrument(handler),
        }
    }
}

impl<H: Handler + 'static> Respond for InstrumentedResponder<H> {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let payload: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        let response = self.inner.call(&payload);

        let mut template = ResponseTemplate::new(response.status).set_body_raw(response.body, &response.content_type);
        for (name, value) in &response.headers {
            if !name.eq_ignore_ascii_case("content-type") {
                template = template.insert_header(name.as_str(), value.as_str());
            }
        }
        template
    }
}

pub fn math(payload: &Value) -> HandlerResult {
    let numbers: Vec<i64> = payload["numbers"]
        .as_array()
        .map(|n| n.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default();
    if numbers.is_empty() {
        return Err(HandlerError::bad_request("No numbers provided"));
    }

    let result: i64 = match payload["operation"].as_str().unwrap_or("sum") {
        "sum" => numbers.iter().sum(),
        "product" => numbers.iter().product(),
        _ => return Err(HandlerError::bad_request("Unsupported operation")),
    };
    Ok(HandlerOutput::json(json!({ "result": result })))
}

pub fn json_echo(payload: &Value) -> HandlerResult {
    match (payload["key"].as_str(), payload["value"].as_str()) {
        (Some(key), Some(value)) if !key.is_empty() && !value.is_empty() => {
            let encoded = json!({ key: value }).to_string();
            Ok(HandlerOutput::json(json!({ "json_data": encoded })))
        }
        _ => Err(HandlerError::bad_request("Key and value are required")),
    }
}

pub fn string_matches(payload: &Value) -> HandlerResult {
    let text = payload["text"].as_str().unwrap_or_default();
    let pattern = payload["pattern"].as_str().unwrap_or_default();
    if text.is_empty() || pattern.is_empty() {
        return Err(HandlerError::bad_request("Text and pattern are required"));
    }
    let matches: Vec<&str> = text.split_whitespace().filter(|w| w.contains(pattern)).collect();
    Ok(HandlerOutput::json(json!({ "matches": matches })))
}

pub fn compress(payload: &Value) -> HandlerResult {
    let text = payload["text"].as_str().unwrap_or_default();
    if text.is_empty() {
        return Err(HandlerError::bad_request("Text is required"));
    }
    let mut bytes = vec![0x1f, 0x8b];
    bytes.extend_from_slice(text.as_bytes());
    Ok(HandlerOutput::binary("application/gzip", bytes))
}

pub fn image(payload: &Value) -> HandlerResult {
    let text = payload["text"].as_str().unwrap_or("Hello, World!");
    Ok(HandlerOutput::json(json!({ "image": format!("png:{}", text) })))
}

/// Start a mock deployment serving all five endpoints of the default battery
pub async fn start_deployment() -> MockServer {
    let server = MockServer::start().await;
    mount_handler(&server, "/math", math).await;
    mount_handler(&server, "/json", json_echo).await;
    mount_handler(&server, "/string", string_matches).await;
    mount_handler(&server, "/compress", compress).await;
    mount_handler(&server, "/image", image).await;
    server
}

pub async fn mount_handler<H: Handler + 'static>(server: &MockServer, route: &str, handler: H) {
    Mock::given(method("POST"))
        .and(path(route))
        .respond_with(InstrumentedResponder::new(handler))
        .mount(server)
        .await;
}

/// Responder with fixed timing headers
pub fn fixed_timing(status: u16, body: Value, lambda: &str, endpoint: &str) -> ResponseTemplate {
    ResponseTemplate::new(status)
        .set_body_json(body)
        .insert_header("X-Lambda-Duration", lambda)
        .insert_header("X-Endpoint-Duration", endpoint)
}

/// A base URL nothing is listening on
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
