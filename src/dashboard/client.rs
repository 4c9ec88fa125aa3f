//! HTTP client for the external scheduling simulator
//!
//! One POST per call, no retries: re-running a randomized scheduler (lottery)
//! must only happen on explicit user request.

use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use serde::Deserialize;

use super::request::SimulationRequest;
use super::Simulator;
use crate::config::DashboardSettings;
use crate::error::SimulationError;
use crate::models::SimulationResult;

/// Error body the simulator sends with a non-success status.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// reqwest-backed simulator client.
#[derive(Debug, Clone)]
pub struct HttpSimulator {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpSimulator {
    /// Build a client for the endpoint and timeout in `settings`.
    pub fn new(settings: &DashboardSettings) -> Result<Self, SimulationError> {
        Self::with_endpoint(
            settings.simulate_url(),
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    pub fn with_endpoint(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, SimulationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SimulationError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(HttpSimulator {
            client,
            endpoint: endpoint.into(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one request and decode the reply.
    pub async fn execute(&self, request: &SimulationRequest) -> Result<SimulationResult, SimulationError> {
        log::debug!(
            "[SimClient] POST {} ({}, {} processes)",
            self.endpoint,
            request.algorithm(),
            request.processes().len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SimulationError::Transport(format!(
                        "request timed out after {}s",
                        self.timeout.as_secs()
                    ))
                } else {
                    SimulationError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SimulationError::Transport(format!("Failed to read response body: {}", e)))?;

        log::debug!("[SimClient] {} returned {} ({} bytes)", request.algorithm(), status, body.len());
        decode_response(status.as_u16(), status.is_success(), &body)
    }
}

impl Simulator for HttpSimulator {
    fn simulate(&self, request: SimulationRequest) -> BoxFuture<'static, Result<SimulationResult, SimulationError>> {
        let client = self.clone();
        async move { client.execute(&request).await }.boxed()
    }
}

/// Map a raw HTTP reply to a result or a typed failure.
///
/// A non-success status carries the server's `error` text when it sent one.
/// An `error` field on a success status is treated the same way.
pub fn decode_response(status: u16, success: bool, body: &str) -> Result<SimulationResult, SimulationError> {
    let server_message = || {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
    };

    if !success {
        let message = server_message().unwrap_or_else(|| "server error".to_string());
        return Err(SimulationError::Server { status, message });
    }

    if let Some(message) = server_message() {
        return Err(SimulationError::Server { status, message });
    }

    let result: SimulationResult = serde_json::from_str(body)
        .map_err(|e| SimulationError::MalformedResponse(e.to_string()))?;

    if result.processes.is_empty() {
        return Err(SimulationError::MalformedResponse(
            "simulation produced no process rows".to_string(),
        ));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OK_BODY: &str = r#"{
        "processes": [{"pid": 1, "at": 0, "bt": 2, "wt": 0, "tat": 2, "rt": 0}],
        "averages": {"avg_wt": "0.00", "avg_tat": "2.00", "avg_rt": "0.00",
                     "cpu_util": "100.00%", "throughput": "0.50 processes/unit time"},
        "gantt": [{"pid": 1, "start": 0, "end": 2}]
    }"#;

    #[test]
    fn test_decode_success() {
        let result = decode_response(200, true, OK_BODY).unwrap();
        assert_eq!(result.processes.len(), 1);
        assert_eq!(result.averages.avg_turnaround, 2.0);
    }

    #[test]
    fn test_decode_error_with_server_message() {
        let err = decode_response(504, false, r#"{"error": "Simulation Timed Out. Input mismatch likely."}"#)
            .unwrap_err();
        assert_eq!(
            err,
            SimulationError::Server {
                status: 504,
                message: "Simulation Timed Out. Input mismatch likely.".to_string()
            }
        );
    }

    #[test]
    fn test_decode_error_without_body() {
        let err = decode_response(502, false, "<html>Bad Gateway</html>").unwrap_err();
        assert_eq!(
            err,
            SimulationError::Server {
                status: 502,
                message: "server error".to_string()
            }
        );
    }

    #[test]
    fn test_decode_malformed_success() {
        let err = decode_response(200, true, "not json").unwrap_err();
        assert!(matches!(err, SimulationError::MalformedResponse(_)));
    }

    #[test]
    fn test_decode_empty_table_is_malformed() {
        let err = decode_response(200, true, r#"{"processes": [], "averages": {}}"#).unwrap_err();
        assert!(matches!(err, SimulationError::MalformedResponse(_)));
    }

    #[test]
    fn test_decode_times_near_u32_max() {
        let body = r#"{"processes":[{"pid":1,"at":4000000000,"bt":1,"wt":0,"tat":4000000000,"rt":0}],"averages":{}}"#;
        let result = decode_response(200, true, body).unwrap();
        assert_eq!(result.completion_order(), vec![1]);
        assert!(result.averages.throughput_per_unit_time > 0.0);
    }
}
