//! Passive health checks against `/health/ping` and `/health/test-database`.
//!
//! Health display must never break the rest of the console, so nothing here
//! returns `Result`: every outcome, including a transport failure, folds
//! into a `HealthReport`.

use serde::Serialize;
use tracing::warn;

use crate::client::error_detail;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};

/// Status reported when no response was received.
pub const UNREACHABLE_STATUS: u16 = 500;

/// Outcome of one health check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Fold a transport outcome into a report.
    pub fn from_result(result: Result<HttpResponse, TransportError>) -> Self {
        match result {
            Ok(response) if response.is_success() => HealthReport {
                status: response.status,
                data: Some(
                    serde_json::from_str(&response.body)
                        .unwrap_or(serde_json::Value::String(response.body)),
                ),
                error: None,
            },
            Ok(response) => HealthReport {
                status: response.status,
                data: None,
                error: Some(error_detail(&response.body).unwrap_or_else(|| {
                    format!("Request failed with status code {}", response.status)
                })),
            },
            Err(err) => HealthReport {
                status: UNREACHABLE_STATUS,
                data: None,
                error: Some(err.message),
            },
        }
    }
}

/// Both checks, as shown on the console's landing view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthSummary {
    pub backend: HealthReport,
    pub database: HealthReport,
}

#[derive(Debug, Clone)]
pub struct HealthClient {
    base_url: String,
}

impl HealthClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_ping(&self) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, format!("{}/health/ping", self.base_url))
    }

    pub fn build_database(&self) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, format!("{}/health/test-database", self.base_url))
    }

    pub fn check_ping(&self, transport: &impl Transport) -> HealthReport {
        self.check("ping", &self.build_ping(), transport)
    }

    pub fn check_database(&self, transport: &impl Transport) -> HealthReport {
        self.check("database", &self.build_database(), transport)
    }

    /// Ping first, then the database, one after the other.
    pub fn check_all(&self, transport: &impl Transport) -> HealthSummary {
        HealthSummary {
            backend: self.check_ping(transport),
            database: self.check_database(transport),
        }
    }

    fn check(&self, name: &str, request: &HttpRequest, transport: &impl Transport) -> HealthReport {
        let report = HealthReport::from_result(transport.execute(request));
        if let Some(error) = &report.error {
            warn!("Health check {} failed with status {}: {}", name, report.status, error);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Result<HttpResponse, TransportError>);

    impl Transport for Fixed {
        fn execute(&self, _request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.0.clone()
        }
    }

    fn ok(status: u16, body: &str) -> Fixed {
        Fixed(Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }))
    }

    #[test]
    fn urls_target_health_routes() {
        let client = HealthClient::new("http://localhost:9000/");
        assert_eq!(client.build_ping().url, "http://localhost:9000/health/ping");
        assert_eq!(
            client.build_database().url,
            "http://localhost:9000/health/test-database"
        );
    }

    #[test]
    fn ping_success_keeps_body() {
        let report = HealthClient::new("http://h").check_ping(&ok(200, "\"Pong\""));
        assert_eq!(report.status, 200);
        assert_eq!(report.data, Some(serde_json::Value::String("Pong".into())));
        assert!(report.error.is_none());
        assert!(report.is_healthy());
    }

    #[test]
    fn non_json_body_is_kept_as_text() {
        let report = HealthClient::new("http://h").check_ping(&ok(200, "Pong"));
        assert_eq!(report.data, Some(serde_json::Value::String("Pong".into())));
    }

    #[test]
    fn server_error_keeps_its_status() {
        let report = HealthClient::new("http://h")
            .check_database(&ok(503, r#"{"detail":"connection refused"}"#));
        assert_eq!(report.status, 503);
        assert_eq!(report.error.as_deref(), Some("connection refused"));
        assert!(!report.is_healthy());
    }

    #[test]
    fn unreachable_host_reports_500() {
        let report = HealthClient::new("http://h")
            .check_ping(&Fixed(Err(TransportError::new("connection refused"))));
        assert_eq!(report.status, 500);
        assert_eq!(report.error.as_deref(), Some("connection refused"));
        assert!(report.data.is_none());
    }
}
