use reqwest::blocking::Client;
use reqwest::StatusCode;
use url::Url;

use crate::config::Config;
use crate::error::AuditError;
use crate::models::Repository;
use crate::utils::{next_link, url_with_segments};

// Where pagination goes after a page has been read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    More(Url),
    Done,
}

pub fn listing_url(config: &Config, org: &str) -> Result<Url, AuditError> {
    url_with_segments(&config.api_url, ["orgs", org, "repos"])
}

// Fetches every repository of `org`, following Link pagination until the last page.
// Order is page order, then the order within each page.
pub fn fetch_repositories(
    client: &Client,
    config: &Config,
    org: &str,
) -> Result<Vec<Repository>, AuditError> {
    let mut repos = Vec::new();
    let mut url = listing_url(config, org)?;
    let mut pages = 0usize;

    loop {
        let (page, outcome) = fetch_page(client, &url)?;
        pages += 1;
        repos.extend(page);

        match outcome {
            PageOutcome::More(next) => url = next,
            PageOutcome::Done => break,
        }
    }

    log::debug!("Fetched {} repositories for {} in {} page(s)", repos.len(), org, pages);
    Ok(repos)
}

// Fetches a single listing page and works out whether another one follows.
pub fn fetch_page(client: &Client, url: &Url) -> Result<(Vec<Repository>, PageOutcome), AuditError> {
    log::debug!("GET {}", url);
    let transport = |source| AuditError::Transport {
        url: url.to_string(),
        source,
    };

    let res = client.get(url.clone()).send().map_err(transport)?;
    if res.status() != StatusCode::OK {
        return Err(AuditError::Listing {
            url: url.to_string(),
            status: res.status(),
        });
    }

    let next = next_link(res.headers());
    let body = res.text().map_err(transport)?;
    let repos: Vec<Repository> =
        serde_json::from_str(&body).map_err(|source| AuditError::Decoding {
            url: url.to_string(),
            source,
        })?;

    let outcome = match next {
        Some(link) => {
            let next = url
                .join(&link)
                .map_err(|source| AuditError::InvalidUrl { url: link, source })?;
            PageOutcome::More(next)
        }
        None => PageOutcome::Done,
    };

    Ok((repos, outcome))
}
