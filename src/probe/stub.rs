//! Scripted in-memory transport for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::transport::{ProbeRequest, ProbeResponse, Transport};

#[derive(Debug, Clone)]
pub enum StubReply {
    Respond(ProbeResponse),
    Fail(String),
    Hang,
}

impl StubReply {
    pub fn status(status: u16) -> Self {
        StubReply::Respond(ProbeResponse { status, ..ProbeResponse::default() })
    }

    pub fn full(status: u16, headers: &[(&str, &str)], body: &str) -> Self {
        StubReply::Respond(ProbeResponse {
            status,
            headers: headers.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            body: body.to_string(),
        })
    }
}

/// Replies are looked up by `host + path`, then by `path`, else 404.
#[derive(Default)]
pub struct StubTransport {
    routes: HashMap<String, StubReply>,
    requests: Mutex<Vec<ProbeRequest>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, key: &str, reply: StubReply) -> Self {
        self.routes.insert(key.to_string(), reply);
        self
    }

    pub fn requests(&self) -> Vec<ProbeRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.requests().into_iter().map(|r| r.path).collect();
        paths.sort();
        paths
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: &ProbeRequest) -> anyhow::Result<ProbeResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        // give other probes a chance to start
        tokio::time::sleep(Duration::from_millis(5)).await;

        let key = format!("{}{}", request.host, request.path);
        let reply = self
            .routes
            .get(&key)
            .or_else(|| self.routes.get(&request.path))
            .cloned()
            .unwrap_or_else(|| StubReply::status(404));

        let out = match reply {
            StubReply::Respond(resp) => Ok(resp),
            StubReply::Fail(msg) => Err(anyhow::anyhow!(msg)),
            StubReply::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Err(anyhow::anyhow!("hung request finished"))
            }
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        out
    }
}
