//! Probe execution engine
//!
//! Runs every probe against every target, target-major and probe-minor,
//! and collects one [`Measurement`] per pair. Transport failures become
//! failure measurements and the run carries on. An unsupported probe
//! method aborts the run before any request is sent.

use crate::{
    client::{HttpClient, HttpRequest, HttpResponse, NetworkClient},
    error::{AppError, Result},
    logging::ProbeLogger,
    models::{Config, Measurement, ProbeDefinition, Report, Target},
    timing::ServerTiming,
};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Execution settings derived from the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Timeout for individual requests
    pub timeout: Duration,
    /// Probe targets concurrently
    pub parallel: bool,
    /// Maximum number of targets in flight in parallel mode
    pub max_concurrency: usize,
    pub verbose: bool,
    pub debug: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            timeout: crate::defaults::DEFAULT_TIMEOUT,
            parallel: false,
            max_concurrency: num_cpus::get().max(1),
            verbose: false,
            debug: false,
        }
    }
}

impl From<&Config> for ExecutionConfig {
    fn from(config: &Config) -> Self {
        Self {
            timeout: config.timeout(),
            parallel: config.parallel,
            max_concurrency: config.max_concurrency.max(1),
            verbose: config.verbose,
            debug: config.debug,
        }
    }
}

/// Raw result of sending one probe, before it is classified
struct Attempt {
    client_start: DateTime<Utc>,
    elapsed: Duration,
    outcome: Result<HttpResponse>,
}

/// Executes probe batteries over an [`HttpClient`]
pub struct ProbeExecutor {
    client: Arc<dyn HttpClient>,
    config: ExecutionConfig,
    logger: Option<ProbeLogger>,
}

impl ProbeExecutor {
    /// Create an executor over any HTTP client implementation
    pub fn new(client: Arc<dyn HttpClient>, config: ExecutionConfig) -> Self {
        Self {
            client,
            config,
            logger: None,
        }
    }

    /// Create an executor backed by the reqwest client, with logging set up from the config
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = NetworkClient::with_timeout(config.timeout())?;
        Ok(Self::new(Arc::new(client), ExecutionConfig::from(config)).with_logger(ProbeLogger::new(config)))
    }

    /// Attach a probe logger
    pub fn with_logger(mut self, logger: ProbeLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Fail on the first probe whose method is not supported
    pub fn check_methods(probes: &[ProbeDefinition]) -> Result<()> {
        match probes.iter().find(|probe| !probe.has_supported_method()) {
            Some(probe) => Err(AppError::unsupported_method(&probe.name, &probe.method)),
            None => Ok(()),
        }
    }

    /// Execute a single probe against a single target
    ///
    /// HTTP error statuses are returned as ordinary measurements. Transport
    /// problems come back as `AppError::Transport` or `AppError::Timeout`.
    pub async fn execute_probe(&self, target: &Target, probe: &ProbeDefinition) -> Result<Measurement> {
        Self::check_methods(std::slice::from_ref(probe))?;

        let attempt = self.send(target, probe).await;
        let response = attempt.outcome?;

        Ok(Measurement::responded(
            target.base_url.clone(),
            probe.name.clone(),
            attempt.client_start,
            attempt.elapsed,
            response.status_code,
            ServerTiming::from_headers(&response.headers),
            response.body_size(),
        ))
    }

    /// Run the whole battery and collect a report
    pub async fn run(&self, targets: &[Target], probes: &[ProbeDefinition]) -> Result<Report> {
        if let Err(error) = Self::check_methods(probes) {
            if let Some(logger) = &self.logger {
                logger.run_rejected(&error).await;
            }
            return Err(error);
        }

        let mut report = Report::new();
        if targets.is_empty() || probes.is_empty() {
            return Ok(report);
        }

        let started = Instant::now();
        if let Some(logger) = &self.logger {
            logger.run_started(targets.len(), probes.len(), self.config.parallel).await;
        }

        if self.config.parallel {
            for chunk in targets.chunks(self.config.max_concurrency.max(1)) {
                let batches = join_all(chunk.iter().map(|target| self.probe_target(target, probes))).await;
                for batch in batches {
                    report.extend(batch);
                }
            }
        } else {
            for target in targets {
                report.extend(self.probe_target(target, probes).await);
            }
        }

        if let Some(logger) = &self.logger {
            logger
                .run_finished(report.len(), report.failures().count(), started.elapsed())
                .await;
        }

        Ok(report)
    }

    /// Run every probe against one target in order
    async fn probe_target(&self, target: &Target, probes: &[ProbeDefinition]) -> Vec<Measurement> {
        let mut measurements = Vec::with_capacity(probes.len());

        for probe in probes {
            let attempt = self.send(target, probe).await;

            let measurement = match attempt.outcome {
                Ok(response) => {
                    let measurement = Measurement::responded(
                        target.base_url.clone(),
                        probe.name.clone(),
                        attempt.client_start,
                        attempt.elapsed,
                        response.status_code,
                        ServerTiming::from_headers(&response.headers),
                        response.body_size(),
                    );
                    if let Some(logger) = &self.logger {
                        logger.probe_completed(&measurement).await;
                    }
                    measurement
                }
                Err(error) => {
                    if let Some(logger) = &self.logger {
                        logger.probe_failed(&target.base_url, &probe.name, &error).await;
                    }
                    Measurement::transport_failure(
                        target.base_url.clone(),
                        probe.name.clone(),
                        attempt.client_start,
                        attempt.elapsed,
                        &error,
                    )
                }
            };

            measurements.push(measurement);
        }

        measurements
    }

    async fn send(&self, target: &Target, probe: &ProbeDefinition) -> Attempt {
        let request = HttpRequest::new(target.url_for(&probe.endpoint), Method::POST)
            .with_json_body(probe.data.clone())
            .with_timeout(self.config.timeout);

        // Both clocks are read back to back right before the send
        let client_start = Utc::now();
        let clock = Instant::now();
        let outcome = self.client.execute_request(request).await;
        let elapsed = clock.elapsed();

        Attempt {
            client_start,
            elapsed,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProbeStatus, TRANSPORT_FAILURE_STATUS};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// Client that answers from a closure and records every request it sees
    struct ScriptedClient<F> {
        respond: F,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl<F> ScriptedClient<F>
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync,
    {
        fn new(respond: F) -> Arc<Self> {
            Arc::new(Self {
                respond,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn urls(&self) -> Vec<String> {
            self.seen.lock().unwrap().iter().map(|r| r.url.clone()).collect()
        }
    }

    #[async_trait]
    impl<F> HttpClient for ScriptedClient<F>
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync,
    {
        async fn execute_request(&self, request: HttpRequest) -> Result<HttpResponse> {
            let result = (self.respond)(&request);
            self.seen.lock().unwrap().push(request);
            result
        }

        async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse> {
            self.execute_request(HttpRequest::post_json(url.to_string(), body.clone())).await
        }
    }

    fn response(status: u16, headers: &[(&str, &str)]) -> HttpResponse {
        HttpResponse {
            status_code: status,
            headers: headers.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            body: b"{}".to_vec(),
            final_url: String::new(),
        }
    }

    fn targets(urls: &[&str]) -> Vec<Target> {
        urls.iter().map(|u| Target::new(*u)).collect()
    }

    fn probes(names: &[&str]) -> Vec<ProbeDefinition> {
        names.iter().map(|n| ProbeDefinition::post(*n, *n, json!({"probe": n}))).collect()
    }

    #[tokio::test]
    async fn test_run_is_target_major() {
        let client = ScriptedClient::new(|_: &HttpRequest| Ok(response(200, &[])));
        let executor = ProbeExecutor::new(client.clone(), ExecutionConfig::default());

        let report = executor
            .run(&targets(&["http://a", "http://b"]), &probes(&["/p1", "/p2", "/p3"]))
            .await
            .unwrap();

        let order: Vec<(String, String)> = report
            .iter()
            .map(|m| (m.application.clone(), m.probe_name.clone()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("http://a".to_string(), "/p1".to_string()),
                ("http://a".to_string(), "/p2".to_string()),
                ("http://a".to_string(), "/p3".to_string()),
                ("http://b".to_string(), "/p1".to_string()),
                ("http://b".to_string(), "/p2".to_string()),
                ("http://b".to_string(), "/p3".to_string()),
            ]
        );
        assert_eq!(client.urls()[4], "http://b/p2");
    }

    #[tokio::test]
    async fn test_request_carries_probe_payload_and_timeout() {
        let client = ScriptedClient::new(|_: &HttpRequest| Ok(response(200, &[])));
        let config = ExecutionConfig {
            timeout: Duration::from_secs(4),
            ..Default::default()
        };
        let executor = ProbeExecutor::new(client.clone(), config);

        let probe = ProbeDefinition::post("/math (sum)", "/math", json!({"numbers": [1, 2, 3, 4, 5], "operation": "sum"}));
        executor.execute_probe(&Target::new("http://localhost:5000/"), &probe).await.unwrap();

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen[0].url, "http://localhost:5000/math");
        assert_eq!(seen[0].method, Method::POST);
        assert_eq!(seen[0].timeout, Duration::from_secs(4));
        assert_eq!(seen[0].json_body.as_ref().unwrap()["operation"], "sum");
    }

    #[tokio::test]
    async fn test_execute_probe_harvests_headers() {
        let client = ScriptedClient::new(|_: &HttpRequest| {
            Ok(response(200, &[("x-lambda-duration", "0.0021"), ("X-Endpoint-Duration", "0.0019")]))
        });
        let executor = ProbeExecutor::new(client, ExecutionConfig::default());

        let m = executor
            .execute_probe(&Target::new("http://a"), &probes(&["/math"])[0])
            .await
            .unwrap();

        assert_eq!(m.status_code, 200);
        assert_eq!(m.lambda_duration_display(), "0.0021");
        assert_eq!(m.endpoint_duration_display(), "0.0019");
        assert!(m.server.lambda.start.is_none());
        assert_eq!(m.client_end - m.client_start, chrono::Duration::from_std(m.client_duration).unwrap());
    }

    #[tokio::test]
    async fn test_server_errors_are_recorded_not_raised() {
        let client = ScriptedClient::new(|_: &HttpRequest| Ok(response(500, &[])));
        let executor = ProbeExecutor::new(client, ExecutionConfig::default());

        let m = executor
            .execute_probe(&Target::new("http://a"), &probes(&["/math"])[0])
            .await
            .unwrap();
        assert_eq!(m.status_code, 500);
        assert_eq!(m.status, ProbeStatus::Responded);
    }

    #[tokio::test]
    async fn test_execute_probe_surfaces_transport_errors() {
        let client = ScriptedClient::new(|_: &HttpRequest| Err(AppError::transport("connection refused")));
        let executor = ProbeExecutor::new(client, ExecutionConfig::default());

        let err = executor
            .execute_probe(&Target::new("http://a"), &probes(&["/math"])[0])
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_run_continues_after_transport_failure() {
        let client = ScriptedClient::new(|request: &HttpRequest| {
            if request.url.starts_with("http://down") {
                Err(AppError::transport("connection refused"))
            } else if request.url.ends_with("/slow") {
                Err(AppError::timeout("no response"))
            } else {
                Ok(response(200, &[]))
            }
        });
        let executor = ProbeExecutor::new(client.clone(), ExecutionConfig::default());

        let report = executor
            .run(&targets(&["http://down", "http://up"]), &probes(&["/fast", "/slow"]))
            .await
            .unwrap();

        assert_eq!(report.len(), 4);
        assert_eq!(client.urls().len(), 4);

        let rows: Vec<&Measurement> = report.iter().collect();
        assert!(rows[0].is_failure());
        assert_eq!(rows[0].status_code, TRANSPORT_FAILURE_STATUS);
        assert_eq!(rows[0].client_duration_display(), "N/A");
        assert!(rows[1].is_failure());
        assert_eq!(rows[2].status_code, 200);
        assert_eq!(rows[3].status, ProbeStatus::Timeout);
        assert_eq!(report.failures().count(), 3);
    }

    #[tokio::test]
    async fn test_unsupported_method_aborts_before_any_request() {
        let client = ScriptedClient::new(|_: &HttpRequest| Ok(response(200, &[])));
        let executor = ProbeExecutor::new(client.clone(), ExecutionConfig::default());

        let mut battery = probes(&["/math", "/json"]);
        battery[1] = battery[1].clone().with_method("PUT");

        let err = executor.run(&targets(&["http://a"]), &battery).await.unwrap_err();
        match err {
            AppError::UnsupportedMethod { probe, method } => {
                assert_eq!(probe, "/json");
                assert_eq!(method, "PUT");
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(client.urls().is_empty());
    }

    #[tokio::test]
    async fn test_logged_run_clears_correlation_id() {
        let client = ScriptedClient::new(|_: &HttpRequest| Ok(response(200, &[])));
        let executor = ProbeExecutor::new(client.clone(), ExecutionConfig::default())
            .with_logger(ProbeLogger::new(&Config::default()));

        let report = executor.run(&targets(&["http://a"]), &probes(&["/math"])).await.unwrap();
        assert_eq!(report.len(), 1);

        let mut battery = probes(&["/math"]);
        battery[0] = battery[0].clone().with_method("DELETE");
        assert!(executor.run(&targets(&["http://a"]), &battery).await.is_err());

        let logger = executor.logger.as_ref().unwrap().logger();
        assert_eq!(logger.correlation_id().await, None);
        assert_eq!(client.urls().len(), 1);
    }

    #[tokio::test]
    async fn test_execute_probe_rejects_get() {
        let client = ScriptedClient::new(|_: &HttpRequest| Ok(response(200, &[])));
        let executor = ProbeExecutor::new(client.clone(), ExecutionConfig::default());

        let probe = probes(&["/json"])[0].clone().with_method("GET");
        let err = executor.execute_probe(&Target::new("http://a"), &probe).await.unwrap_err();
        assert!(matches!(err, AppError::UnsupportedMethod { .. }));
        assert!(client.urls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_inputs_give_empty_report() {
        let client = ScriptedClient::new(|_: &HttpRequest| Ok(response(200, &[])));
        let executor = ProbeExecutor::new(client.clone(), ExecutionConfig::default());

        assert!(executor.run(&[], &probes(&["/math"])).await.unwrap().is_empty());
        assert!(executor.run(&targets(&["http://a"]), &[]).await.unwrap().is_empty());
        assert!(client.urls().is_empty());
    }

    #[tokio::test]
    async fn test_parallel_run_keeps_target_order() {
        let client = ScriptedClient::new(|_: &HttpRequest| Ok(response(204, &[])));
        let config = ExecutionConfig {
            parallel: true,
            max_concurrency: 2,
            ..Default::default()
        };
        let executor = ProbeExecutor::new(client.clone(), config);

        let urls = ["http://a", "http://b", "http://c", "http://d", "http://e"];
        let report = executor.run(&targets(&urls), &probes(&["/p1", "/p2"])).await.unwrap();

        assert_eq!(report.len(), 10);
        assert_eq!(report.applications(), urls.to_vec());
        for (index, measurement) in report.iter().enumerate() {
            let expected = if index % 2 == 0 { "/p1" } else { "/p2" };
            assert_eq!(measurement.probe_name, expected);
        }
        assert_eq!(client.urls().len(), 10);
    }

    #[test]
    fn test_execution_config_from_config() {
        let config = Config {
            timeout_seconds: 15,
            parallel: true,
            max_concurrency: 3,
            verbose: true,
            ..Default::default()
        };

        let exec = ExecutionConfig::from(&config);
        assert_eq!(exec.timeout, Duration::from_secs(15));
        assert!(exec.parallel);
        assert_eq!(exec.max_concurrency, 3);
        assert!(exec.verbose);
        assert!(!exec.debug);
    }

    #[test]
    fn test_from_config_builds_network_executor() {
        let executor = ProbeExecutor::from_config(&Config::default()).unwrap();
        assert_eq!(executor.config().timeout, Duration::from_secs(30));
        assert!(executor.logger.is_some());
    }
}
