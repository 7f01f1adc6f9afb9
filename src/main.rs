use std::io;
use std::process;
use std::time::Duration;

use clap::Parser;
use env_logger::Env;

use public_repo_check::check_org;
use public_repo_check::config::{build_client, CONFIG};

/// Check that every repository of a GitHub organization has an MIT license,
/// a README and a CONTRIBUTING file.
#[derive(Debug, Parser)]
#[command(name = "public-repo-check", version)]
struct Cli {
    /// Organizations to audit
    #[arg(required = true, value_name = "ORG_NAME")]
    orgs: Vec<String>,

    /// Request timeout in seconds (overrides REQUEST_TIMEOUT_SECS)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    // Missing organizations print usage and exit non-zero
    let cli = Cli::parse();

    let mut config = (*CONFIG).clone();
    if let Some(secs) = cli.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    let client = match build_client(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for org in &cli.orgs {
        if let Err(e) = check_org(&client, &config, org, &mut out) {
            eprintln!("Error checking {}: {}", org, e);
            process::exit(1);
        }
    }
}
