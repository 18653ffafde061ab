use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::{Cli, Commands};
use tech_hunter::catalog::{load_catalog, load_endpoint_catalog, EndpointCatalog};
use tech_hunter::config::Config;
use tech_hunter::output::{format_report, write_csv, write_jsonl, write_jsonl_to};
use tech_hunter::probe::HttpTransport;
use tech_hunter::Scanner;

pub async fn run_from_cli(cli: Cli) -> anyhow::Result<()> {
    // Configure logging based on global flags.
    // Keep external crates (reqwest/hyper) at INFO to avoid flooding the CLI.
    use tracing_subscriber::EnvFilter;
    let crate_level = if cli.debug { "debug" } else if cli.verbose { "info" } else { "warn" };
    let filter_str = format!(
        "tech_hunter={crate},reqwest=info,hyper=info,h2=info,rustls=warn",
        crate = crate_level
    );
    let env_filter = EnvFilter::try_new(&filter_str).unwrap_or_else(|_| EnvFilter::new(crate_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(true)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Scan { target, technologies, tech, endpoints, config, concurrency, per_host, parallel_hosts, timeout, out, json } => {
            // CLI flags override the config file, which overrides defaults
            let mut cfg = match config {
                Some(path) => Config::from_yaml_file(Path::new(&path))?,
                None => Config::default(),
            };
            if let Some(c) = concurrency { cfg.concurrency = c; }
            if let Some(p) = per_host { cfg.per_host = p; }
            if let Some(p) = parallel_hosts { cfg.parallel_hosts = p; }
            if let Some(t) = timeout { cfg.timeout_secs = t; }

            tracing::info!(scan_target=%target, technologies=%technologies, endpoints=%endpoints, concurrency = cfg.concurrency, per_host = cfg.per_host, timeout = cfg.timeout_secs, "Starting scan");

            run_scan(&target, Path::new(&technologies), &tech, Path::new(&endpoints), &cfg, out.map(PathBuf::from), json).await?;
        }
    }
    Ok(())
}

async fn run_scan(target: &str, tech_dir: &Path, tech_names: &[String], endpoints_path: &Path, cfg: &Config, out: Option<PathBuf>, json: bool) -> anyhow::Result<()> {
    let hosts = tech_hunter::hosts::resolve_targets(target)?;
    if hosts.is_empty() {
        anyhow::bail!("no hosts to scan in {}", target);
    }

    let catalog = load_catalog(tech_dir, tech_names)?;
    if catalog.is_empty() {
        tracing::warn!(dir=%tech_dir.display(), "no usable technology definitions; every known endpoint will be checked");
    }

    let endpoint_catalog = if endpoints_path.exists() {
        load_endpoint_catalog(endpoints_path)?
    } else {
        tracing::warn!(path=%endpoints_path.display(), "endpoint list not found; skipping endpoint verification");
        EndpointCatalog::new()
    };

    println!("[*] {} host(s), {} technologies, {} endpoint mappings", hosts.len(), catalog.len(), endpoint_catalog.len());

    let client = tech_hunter::http_client::create_probe_client(cfg.timeout_secs, cfg.connect_timeout_secs, cfg.per_host as usize)?;
    let transport = Arc::new(HttpTransport::new(client));
    let scanner = Scanner::new(transport, cfg, &catalog, &endpoint_catalog);

    let scan_start = std::time::Instant::now();
    let reports = scanner.scan_hosts(&hosts).await;

    if json {
        let stdout = std::io::stdout();
        write_jsonl_to(&mut stdout.lock(), &reports)?;
    } else {
        for report in &reports {
            println!("{}\n", format_report(report));
        }
    }

    if let Some(dir) = out {
        tech_hunter::utils::ensure_dir(&dir)?;
        let jsonl_path = dir.join("report.jsonl");
        let csv_path = dir.join("endpoints.csv");
        write_jsonl(&jsonl_path, &reports)?;
        write_csv(&csv_path, &reports)?;
        println!("[+] Wrote {} and {}", jsonl_path.display(), csv_path.display());
    }

    let detected: usize = reports.iter().map(|r| r.detected.len()).sum();
    let valid: usize = reports.iter().map(|r| r.valid_endpoints().count()).sum();
    tracing::info!(hosts = reports.len(), detected, valid_endpoints = valid, elapsed_ms = scan_start.elapsed().as_millis() as u64, "Scan finished");

    Ok(())
}
