use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Client, Method};

/// One request to issue against a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub host: String,
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
}

impl ProbeRequest {
    pub fn get(host: &str, path: &str) -> Self {
        Self {
            host: host.to_string(),
            method: "GET".to_string(),
            path: path.to_string(),
            headers: HashMap::new(),
        }
    }

    pub fn url(&self) -> String {
        self.url_for("https")
    }

    pub fn url_for(&self, scheme: &str) -> String {
        if self.path.starts_with('/') {
            format!("{}://{}{}", scheme, self.host, self.path)
        } else {
            format!("{}://{}/{}", scheme, self.host, self.path)
        }
    }
}

/// A response whose body has been read to the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

/// Issues exactly one request and returns the complete response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ProbeRequest) -> anyhow::Result<ProbeResponse>;
}

/// HTTPS transport backed by reqwest.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    scheme: &'static str,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client, scheme: "https" }
    }

    /// Plain-HTTP transport for talking to a loopback listener.
    #[cfg(test)]
    pub fn plain(client: Client) -> Self {
        Self { client, scheme: "http" }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ProbeRequest) -> anyhow::Result<ProbeResponse> {
        let method = Method::from_bytes(request.method.to_ascii_uppercase().as_bytes())?;
        let mut builder = self.client.request(method, request.url_for(self.scheme));
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();

        let mut headers: HashMap<String, String> = HashMap::new();
        for (name, value) in resp.headers() {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            headers
                .entry(name.as_str().to_string())
                .and_modify(|v| {
                    v.push_str(", ");
                    v.push_str(&value);
                })
                .or_insert(value);
        }

        let bytes = resp.bytes().await?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        Ok(ProbeResponse { status, headers, body })
    }
}
