use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};

use crate::catalog::EndpointCatalog;
use crate::detect::RuleProber;
use crate::probe::ProbeRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointVerdict {
    pub host: String,
    pub endpoint: String,
    pub valid: bool,
}

/// Endpoints to check for `detected`. With nothing detected every technology
/// in the catalog is used. Order follows the technologies, duplicates are kept.
pub fn select_endpoints(detected: &[String], catalog: &EndpointCatalog) -> Vec<String> {
    if detected.is_empty() {
        catalog
            .technologies()
            .flat_map(|tech| catalog.endpoints_for(tech).iter().cloned())
            .collect()
    } else {
        detected
            .iter()
            .flat_map(|tech| catalog.endpoints_for(tech).iter().cloned())
            .collect()
    }
}

/// Checks that critical endpoints answer with 200.
#[derive(Clone)]
pub struct EndpointVerifier {
    prober: RuleProber,
    concurrency: usize,
}

impl EndpointVerifier {
    pub fn new(prober: RuleProber, concurrency: usize) -> Self {
        Self { prober, concurrency: concurrency.max(1) }
    }

    pub async fn verify(&self, host: &str, detected: &[String], catalog: &EndpointCatalog) -> Vec<EndpointVerdict> {
        let endpoints = select_endpoints(detected, catalog);
        tracing::debug!(host=%host, count = endpoints.len(), "verifying endpoints");

        stream::iter(endpoints)
            .map(|endpoint| async move {
                let valid = self.check(host, &endpoint).await;
                EndpointVerdict { host: host.to_string(), endpoint, valid }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await
    }

    async fn check(&self, host: &str, endpoint: &str) -> bool {
        match self.prober.fetch(&ProbeRequest::get(host, endpoint)).await {
            Ok(resp) => resp.status == 200,
            Err(e) => {
                tracing::warn!(host=%host, endpoint=%endpoint, "endpoint probe failed: {:#}", e);
                false
            }
        }
    }
}
