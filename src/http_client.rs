use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Create the probing client. Redirects are never followed and no cookie store
/// is kept, so every rule sees exactly the response its request produced.
pub fn create_probe_client(timeout_secs: u64, connect_timeout_secs: u64, max_idle_connections: usize) -> anyhow::Result<Client> {
    Ok(probe_client_builder(timeout_secs, connect_timeout_secs, max_idle_connections).build()?)
}

pub(crate) fn probe_client_builder(timeout_secs: u64, connect_timeout_secs: u64, max_idle_connections: usize) -> ClientBuilder {
    ClientBuilder::new()
        // Connection pooling
        .pool_max_idle_per_host(max_idle_connections)
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .tcp_nodelay(true)

        // Timeouts
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(connect_timeout_secs))

        // Compression
        .gzip(true)
        .brotli(true)

        .use_rustls_tls()
        .redirect(reqwest::redirect::Policy::none())

        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")

        // Fingerprinting targets routinely serve self-signed certificates
        .danger_accept_invalid_certs(true)
}
