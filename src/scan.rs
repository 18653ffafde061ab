use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};

use crate::catalog::{EndpointCatalog, TechnologyCatalog};
use crate::config::Config;
use crate::detect::{present_names, RuleProber, TechnologyDetector, TechnologyResult};
use crate::hosts::normalize_host;
use crate::probe::{Throttle, Transport};
use crate::verify::{EndpointVerdict, EndpointVerifier};

/// Everything learned about one host in one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostReport {
    pub host: String,
    pub detected: Vec<String>,
    pub technologies: Vec<TechnologyResult>,
    pub endpoints: Vec<EndpointVerdict>,
}

impl HostReport {
    pub fn valid_endpoints(&self) -> impl Iterator<Item = &EndpointVerdict> {
        self.endpoints.iter().filter(|v| v.valid)
    }
}

/// Detection followed by endpoint verification over read-only catalogs.
pub struct Scanner<'a> {
    detector: TechnologyDetector,
    verifier: EndpointVerifier,
    technologies: &'a TechnologyCatalog,
    endpoints: &'a EndpointCatalog,
    parallel_hosts: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(
        transport: Arc<dyn Transport>,
        config: &Config,
        technologies: &'a TechnologyCatalog,
        endpoints: &'a EndpointCatalog,
    ) -> Self {
        let throttle = Arc::new(Throttle::new(config.concurrency as usize, config.per_host as usize));
        let prober = RuleProber::new(transport, throttle, Duration::from_secs(config.timeout_secs));
        let fan_out = config.per_host.max(1) as usize;
        Self {
            detector: TechnologyDetector::new(prober.clone(), fan_out),
            verifier: EndpointVerifier::new(prober, fan_out),
            technologies,
            endpoints,
            parallel_hosts: config.parallel_hosts.max(1) as usize,
        }
    }

    pub async fn scan_host(&self, host: &str) -> HostReport {
        let mut technologies = self.detector.detect(host, self.technologies).await;
        technologies.sort_by(|a, b| a.name.cmp(&b.name));
        let detected = present_names(&technologies);

        if detected.is_empty() {
            tracing::info!(host=%host, "no technology detected, verifying every known endpoint");
        } else {
            tracing::info!(host=%host, technologies=?detected, "technologies detected");
        }

        let mut endpoints = self.verifier.verify(host, &detected, self.endpoints).await;
        endpoints.sort_by(|a, b| a.endpoint.cmp(&b.endpoint));

        HostReport { host: host.to_string(), detected, technologies, endpoints }
    }

    /// Scan hosts independently; reports come back in completion order.
    pub async fn scan_hosts(&self, hosts: &[String]) -> Vec<HostReport> {
        stream::iter(hosts.iter().filter_map(|h| normalize_host(h)))
            .map(|host| async move { self.scan_host(&host).await })
            .buffer_unordered(self.parallel_hosts)
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{parse_endpoint_list, parse_technology};
    use crate::probe::stub::{StubReply, StubTransport};

    const NGINX: &str = r#"
rules:
  server:
    response:
      code: 200
      headers:
        server: nginx
"#;

    const WORDPRESS: &str = r#"
rules:
  login:
    request:
      endpoint: /wp-login.php
    response:
      code: "200"
      body: "wp-submit"
  readme:
    request:
      endpoint: /readme.html
    response:
      code: 200
      body: WordPress
condition:
  required: [login, readme]
"#;

    fn catalogs() -> (TechnologyCatalog, EndpointCatalog) {
        let techs = TechnologyCatalog::new(vec![
            parse_technology("nginx", NGINX).unwrap(),
            parse_technology("wordpress", WORDPRESS).unwrap(),
        ]);
        let endpoints = parse_endpoint_list("/nginx_status nginx\n/wp-json wordpress\n/xmlrpc.php wordpress\n");
        (techs, endpoints)
    }

    #[tokio::test]
    async fn test_scan_host_detects_then_verifies() {
        let stub = Arc::new(
            StubTransport::new()
                .route("/", StubReply::full(200, &[("server", "nginx")], "<html></html>"))
                .route("/nginx_status", StubReply::status(200))
                .route("/wp-login.php", StubReply::status(404)),
        );
        let (techs, endpoints) = catalogs();
        let scanner = Scanner::new(stub.clone(), &Config::default(), &techs, &endpoints);

        let report = scanner.scan_host("web.example").await;
        assert_eq!(report.detected, vec!["nginx"]);
        assert_eq!(report.technologies.len(), 2);
        assert_eq!(report.endpoints.len(), 1);
        assert!(report.endpoints[0].valid);
        assert_eq!(report.valid_endpoints().count(), 1);
    }

    #[tokio::test]
    async fn test_nothing_detected_falls_back_to_all_endpoints() {
        let stub = Arc::new(StubTransport::new().route("/wp-json", StubReply::status(200)));
        let (techs, endpoints) = catalogs();
        let scanner = Scanner::new(stub.clone(), &Config::default(), &techs, &endpoints);

        let report = scanner.scan_host("bare.example").await;
        assert!(report.detected.is_empty());
        let probed: Vec<&str> = report.endpoints.iter().map(|v| v.endpoint.as_str()).collect();
        assert_eq!(probed, vec!["/nginx_status", "/wp-json", "/xmlrpc.php"]);
        assert_eq!(report.valid_endpoints().count(), 1);
    }

    #[tokio::test]
    async fn test_hosts_do_not_share_outcomes() {
        let stub = Arc::new(
            StubTransport::new()
                .route("a.example/", StubReply::full(200, &[("server", "nginx")], ""))
                .route("b.example/", StubReply::full(200, &[("server", "apache")], "")),
        );
        let (techs, endpoints) = catalogs();
        let scanner = Scanner::new(stub.clone(), &Config::default(), &techs, &endpoints);

        let hosts = vec![" a.example ".to_string(), "".to_string(), "https://b.example/".to_string()];
        let mut reports = scanner.scan_hosts(&hosts).await;
        reports.sort_by(|a, b| a.host.cmp(&b.host));

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].detected, vec!["nginx"]);
        assert!(reports[1].detected.is_empty());
        assert_eq!(reports[0].host, "a.example");
        assert_eq!(reports[1].host, "b.example");
        assert!(stub.requests().iter().all(|r| r.host == "a.example" || r.host == "b.example"));
    }
}
