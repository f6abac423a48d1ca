//! HTTP client abstraction used to issue probe requests


use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde_json::Value;
use std::time::Duration;
use tokio::time::timeout;

/// HTTP client trait for abstraction and testing
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and read the full response
    async fn execute_request(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// POST a JSON body using the client's default timeout
    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse>;
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: Method,
    pub timeout: Duration,
    pub json_body: Option<Value>,
    pub user_agent: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// Create a new HTTP request
    pub fn new(url: String, method: Method) -> Self {
        Self {
            url,
            method,
            timeout: crate::defaults::DEFAULT_TIMEOUT,
            json_body: None,
            user_agent: Some(default_user_agent()),
            headers: Vec::new(),
        }
    }

    /// Create a POST request carrying a JSON body
    pub fn post_json(url: String, body: Value) -> Self {
        Self::new(url, Method::POST).with_json_body(body)
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the JSON body
    pub fn with_json_body(mut self, body: Value) -> Self {
        self.json_body = Some(body);
        self
    }

    /// Add custom header
    pub fn with_header(mut self, name: String, value: String) -> Self {
        self.headers.push((name, value));
        self
    }

    /// Set user agent
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = Some(user_agent);
        self
    }
}

/// Fully received HTTP response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub final_url: String,
}

impl HttpResponse {
    /// Check if the response indicates success
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Check if the responder reported a server-side failure
    pub fn is_server_error(&self) -> bool {
        self.status_code >= 500
    }

    /// Size of the received body
    pub fn body_size(&self) -> usize {
        self.body.len()
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Body as UTF-8 text when possible, for debug logging
    pub fn body_preview(&self, max_len: usize) -> String {
        let text = String::from_utf8_lossy(&self.body);
        let cut = text.char_indices().nth(max_len).map(|(index, _)| index);
        match cut {
            Some(cut) => format!("{}...", &text[..cut]),
            None => text.into_owned(),
        }
    }
}

/// reqwest-backed HTTP client
pub struct NetworkClient {
    client: Client,
    default_timeout: Duration,
}

impl NetworkClient {
    /// Create a new network client with the default timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(crate::defaults::DEFAULT_TIMEOUT)
    }

    /// Create a new network client with custom timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(default_user_agent())
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            default_timeout: timeout,
        })
    }

    /// Timeout applied by `post_json`
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = Url::parse(&request.url)
            .map_err(|e| AppError::transport(format!("Invalid URL '{}': {}", request.url, e)))?;

        let mut req_builder = self.client.request(request.method, url).timeout(request.timeout);

        if let Some(ref body) = request.json_body {
            req_builder = req_builder.json(body);
        }

        for (name, value) in &request.headers {
            req_builder = req_builder.header(name.as_str(), value.as_str());
        }

        if let Some(ref ua) = request.user_agent {
            req_builder = req_builder.header(reqwest::header::USER_AGENT, ua.as_str());
        }

        let response = req_builder.send().await?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect();

        // The clock stops only after the whole body is in
        let body = response.bytes().await?;

        Ok(HttpResponse {
            status_code,
            headers,
            body: body.to_vec(),
            final_url,
        })
    }
}

#[async_trait]
impl HttpClient for NetworkClient {
    async fn execute_request(&self, request: HttpRequest) -> Result<HttpResponse> {
        let limit = request.timeout;
        let url = request.url.clone();

        if limit > Duration::ZERO {
            timeout(limit, self.send(request))
                .await
                .map_err(|_| AppError::timeout(format!("{} did not respond within {}s", url, limit.as_secs_f64())))?
        } else {
            self.send(request).await
        }
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse> {
        let request = HttpRequest::post_json(url.to_string(), body.clone())
            .with_timeout(self.default_timeout);
        self.execute_request(request).await
    }
}

fn default_user_agent() -> String {
    format!("{}/{}", crate::PKG_NAME, crate::VERSION)
}
