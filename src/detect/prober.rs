use std::sync::Arc;
use std::time::Duration;

use crate::catalog::Rule;
use crate::probe::{ProbeRequest, ProbeResponse, Throttle, Transport};

use super::matcher;

/// Issues single requests through the shared transport, gated by the throttle
/// and bounded by a per-request timeout.
#[derive(Clone)]
pub struct RuleProber {
    transport: Arc<dyn Transport>,
    throttle: Arc<Throttle>,
    timeout: Duration,
}

impl RuleProber {
    pub fn new(transport: Arc<dyn Transport>, throttle: Arc<Throttle>, timeout: Duration) -> Self {
        Self { transport, throttle, timeout }
    }

    /// One round trip. Every failure (throttle, network, timeout) is an error here.
    pub async fn fetch(&self, request: &ProbeRequest) -> anyhow::Result<ProbeResponse> {
        let _permit = self.throttle.acquire(&request.host).await?;
        match tokio::time::timeout(self.timeout, self.transport.send(request)).await {
            Ok(res) => res,
            Err(_) => Err(anyhow::anyhow!("timed out after {:?}", self.timeout)),
        }
    }

    /// Probe `rule` against `host`. Failures are logged and read as "no match".
    pub async fn probe(&self, host: &str, rule: &Rule) -> bool {
        let request = ProbeRequest {
            host: host.to_string(),
            method: rule.request.method.clone(),
            path: rule.request.endpoint.clone(),
            headers: rule.request.headers.clone(),
        };

        match self.fetch(&request).await {
            Ok(resp) => {
                let matched = matcher::matches(&resp, &rule.response);
                tracing::debug!(host=%host, method=%request.method, path=%request.path, status = resp.status, matched, "rule probed");
                matched
            }
            Err(e) => {
                tracing::warn!(host=%host, path=%request.path, "rule probe failed: {:#}", e);
                false
            }
        }
    }
}
