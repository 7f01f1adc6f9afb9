pub mod checks;
pub mod config;
pub mod error;
pub mod models;
pub mod repo;
pub mod utils;

use std::io::Write;

use reqwest::blocking::Client;

use checks::check_repository;
use config::Config;
use error::AuditError;
use models::CheckOutcome;
use repo::fetch_repositories;

// Audits every repository of one organization, writing one line per check outcome to `out`.
pub fn check_org<W: Write>(
    client: &Client,
    config: &Config,
    org: &str,
    out: &mut W,
) -> Result<Vec<CheckOutcome>, AuditError> {
    // Step 1: List every repository of the organization
    let repos = fetch_repositories(client, config, org)?;
    log::info!("Checking {} repositories in {}", repos.len(), org);

    // Step 2: Run the policy checks, stopping at the first fatal error
    let mut outcomes = Vec::new();
    for repo in &repos {
        outcomes.extend(check_repository(client, config, repo, out)?);
    }

    let failing = outcomes.iter().filter(|o| !o.ok).count();
    log::info!(
        "{}: {} repositories, {} checks passed, {} failed",
        org,
        repos.len(),
        outcomes.len() - failing,
        failing
    );

    Ok(outcomes)
}
