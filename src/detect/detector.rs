use std::collections::HashMap;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};

use crate::catalog::{TechnologyCatalog, TechnologyDefinition};

use super::condition;
use super::prober::RuleProber;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnologyResult {
    pub name: String,
    pub present: bool,
}

/// Runs every rule of every technology against a host and evaluates the
/// conditions. Probes are interleaved on the calling task; outcomes are keyed
/// by rule and technology name, never by completion order.
#[derive(Clone)]
pub struct TechnologyDetector {
    prober: RuleProber,
    concurrency: usize,
}

impl TechnologyDetector {
    pub fn new(prober: RuleProber, concurrency: usize) -> Self {
        Self { prober, concurrency: concurrency.max(1) }
    }

    /// Probe all rules of `tech` and decide whether it is present on `host`.
    pub async fn detect_technology(&self, host: &str, tech: &TechnologyDefinition) -> TechnologyResult {
        let outcomes: HashMap<String, bool> = stream::iter(tech.rules.iter())
            .map(|(name, rule)| async move { (name.clone(), self.prober.probe(host, rule).await) })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let present = condition::evaluate(&tech.condition, &outcomes);
        tracing::debug!(host=%host, technology=%tech.name, ?outcomes, present, "condition evaluated");

        TechnologyResult { name: tech.name.clone(), present }
    }

    /// One result per technology in the catalog, in no particular order.
    pub async fn detect(&self, host: &str, catalog: &TechnologyCatalog) -> Vec<TechnologyResult> {
        stream::iter(catalog.technologies())
            .map(|tech| self.detect_technology(host, tech))
            .buffer_unordered(self.concurrency)
            .collect()
            .await
    }

    /// Names of the technologies found on `host`.
    pub async fn detected_names(&self, host: &str, catalog: &TechnologyCatalog) -> Vec<String> {
        present_names(&self.detect(host, catalog).await)
    }
}

pub fn present_names(results: &[TechnologyResult]) -> Vec<String> {
    results.iter().filter(|r| r.present).map(|r| r.name.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Condition, ExpectedResponse, Rule, RuleRequest};
    use crate::probe::stub::{StubReply, StubTransport};
    use crate::probe::Throttle;
    use std::sync::Arc;
    use std::time::Duration;

    fn rule(path: &str, expected: ExpectedResponse) -> Rule {
        Rule::new(RuleRequest::get(path), expected)
    }

    fn tech(name: &str, rules: Vec<(&str, Rule)>, condition: Condition) -> TechnologyDefinition {
        let rules = rules.into_iter().map(|(n, r)| (n.to_string(), r)).collect();
        TechnologyDefinition::new(name, rules, condition)
    }

    fn detector(stub: StubTransport, per_host: usize) -> (TechnologyDetector, Arc<StubTransport>) {
        let stub = Arc::new(stub);
        let prober = RuleProber::new(stub.clone(), Arc::new(Throttle::new(50, per_host)), Duration::from_secs(2));
        (TechnologyDetector::new(prober, 16), stub)
    }

    fn sorted(mut v: Vec<TechnologyResult>) -> Vec<TechnologyResult> {
        v.sort_by(|a, b| a.name.cmp(&b.name));
        v
    }

    #[tokio::test]
    async fn test_failure_in_required_pair_does_not_abort_others() {
        let stub = StubTransport::new()
            .route("/x", StubReply::status(200))
            .route("/y", StubReply::Fail("connection reset".into()))
            .route("/z", StubReply::full(200, &[("server", "nginx")], ""));
        let (d, _) = detector(stub, 4);

        let catalog = TechnologyCatalog::new(vec![
            tech(
                "pair",
                vec![("x", rule("/x", ExpectedResponse::status(200))), ("y", rule("/y", ExpectedResponse::status(200)))],
                Condition::required(["x", "y"]),
            ),
            tech(
                "nginx",
                vec![("server", rule("/z", ExpectedResponse::default().with_header("server", "nginx")))],
                Condition::default(),
            ),
        ]);

        let results = sorted(d.detect("host.example", &catalog).await);
        assert_eq!(
            results,
            vec![
                TechnologyResult { name: "nginx".into(), present: true },
                TechnologyResult { name: "pair".into(), present: false },
            ]
        );
    }

    #[tokio::test]
    async fn test_each_rule_probed_once() {
        let stub = StubTransport::new()
            .route("/a", StubReply::status(200))
            .route("/b", StubReply::status(200))
            .route("/c", StubReply::status(500));
        let (d, stub) = detector(stub, 8);

        let t = tech(
            "multi",
            vec![
                ("a", rule("/a", ExpectedResponse::status(200))),
                ("b", rule("/b", ExpectedResponse::status(200))),
                ("c", rule("/c", ExpectedResponse::status(200))),
            ],
            Condition::optional(["a", "c"]),
        );
        let result = d.detect_technology("h.example", &t).await;
        assert!(result.present);
        assert_eq!(stub.requested_paths(), vec!["/a", "/b", "/c"]);
    }

    #[tokio::test]
    async fn test_per_host_limit_caps_in_flight() {
        let mut stub = StubTransport::new();
        let mut rules = Vec::new();
        let names: Vec<String> = (0..12).map(|i| format!("r{}", i)).collect();
        for name in &names {
            let path = format!("/{}", name);
            stub = stub.route(&path, StubReply::status(200));
            rules.push((name.as_str(), rule(&path, ExpectedResponse::status(200))));
        }
        let (d, stub) = detector(stub, 3);

        let result = d.detect_technology("h.example", &tech("wide", rules, Condition::default())).await;
        assert!(result.present);
        assert_eq!(stub.requests().len(), 12);
        assert!(stub.peak_in_flight() <= 3);
        assert!(stub.peak_in_flight() >= 2);
    }

    #[tokio::test]
    async fn test_detected_names_only_present() {
        let stub = StubTransport::new().route("/", StubReply::full(200, &[], "<meta name=\"generator\" content=\"Joomla!\">"));
        let (d, _) = detector(stub, 4);

        let catalog = TechnologyCatalog::new(vec![
            tech("joomla", vec![("gen", rule("/", ExpectedResponse::status(200).with_body("Joomla!")))], Condition::default()),
            tech("drupal", vec![("gen", rule("/", ExpectedResponse::status(200).with_body("Drupal")))], Condition::default()),
        ]);
        assert_eq!(d.detected_names("site.example", &catalog).await, vec!["joomla"]);
    }
}
