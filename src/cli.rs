use clap::Parser;

#[derive(clap::Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable detailed debug logging (global)
    #[arg(long, global = true, default_value_t = false)]
    pub debug: bool,

    /// Enable verbose logging (global)
    #[arg(long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Fingerprint technologies on hosts and verify their critical endpoints
    Scan {
        /// Target hostname (e.g. example.com) or path to file with newline-delimited hostnames
        target: String,

        /// Directory holding one YAML definition per technology
        #[arg(short = 't', long, default_value = "./technologies")]
        technologies: String,

        /// Only load these technologies (repeatable); default is every file in the directory
        #[arg(long = "tech")]
        tech: Vec<String>,

        /// Endpoint list: `<endpoint> <tech1,tech2,...>` per line
        #[arg(short = 'e', long, default_value = "./endpoints.txt")]
        endpoints: String,

        /// YAML file with concurrency and timeout settings
        #[arg(long)]
        config: Option<String>,

        /// Global concurrency
        #[arg(short = 'c', long)]
        concurrency: Option<u16>,

        /// Per-host limit
        #[arg(long)]
        per_host: Option<u16>,

        /// Hosts scanned in parallel
        #[arg(long)]
        parallel_hosts: Option<u16>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Output directory for report.jsonl and endpoints.csv
        #[arg(short = 'o', long)]
        out: Option<String>,

        /// Print JSON lines instead of the text summary
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}
