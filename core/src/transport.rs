//! Blocking HTTP transport backed by ureq.
//!
//! Enabled with the `ureq` feature.

use std::time::Duration;

use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};
use tracing::debug;

/// Executes requests with ureq.
///
/// Status codes are returned as data rather than errors; only failures to
/// get any response at all become `TransportError`.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, req: &HttpRequest) -> Result<HttpResponse, TransportError> {
        debug!("{} {}", req.method.as_str(), req.url);
        let body = req.body.as_deref().unwrap_or_default();
        let result = match req.method {
            HttpMethod::Get => self.agent.get(&req.url).call(),
            HttpMethod::Delete => self.agent.delete(&req.url).call(),
            HttpMethod::Post => self
                .agent
                .post(&req.url)
                .content_type("application/json")
                .send(body.as_bytes()),
            HttpMethod::Put => self
                .agent
                .put(&req.url)
                .content_type("application/json")
                .send(body.as_bytes()),
        };
        let mut response = result.map_err(|e| TransportError::new(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError::new(e.to_string()))?;
        debug!("-> {} ({} bytes)", status, body.len());

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
