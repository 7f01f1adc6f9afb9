use std::io::Write;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use url::Url;

use crate::config::Config;
use crate::error::AuditError;
use crate::models::{CheckOutcome, Repository};
use crate::utils::url_with_segments;

// A file every active repository is expected to carry on its default branch.
pub struct RequiredFile {
    pub path: &'static str,
    pub found: &'static str,
    pub missing: &'static str,
}

pub const README: RequiredFile = RequiredFile {
    path: "README.md",
    found: "Has README",
    missing: "No README found",
};

pub const CONTRIBUTING: RequiredFile = RequiredFile {
    path: "CONTRIBUTING.md",
    found: "Has CONTRIBUTING",
    missing: "No CONTRIBUTING found",
};

// Archived and forked repositories get a single passing line and nothing else.
pub fn exemption(repo: &Repository) -> Option<CheckOutcome> {
    if repo.archived {
        Some(CheckOutcome::pass(repo, "Archived. No further checks"))
    } else if repo.fork {
        Some(CheckOutcome::pass(repo, "Fork. No further checks"))
    } else {
        None
    }
}

pub fn check_license(config: &Config, repo: &Repository) -> CheckOutcome {
    match &repo.license {
        None => CheckOutcome::fail(repo, "License missing!"),
        Some(license) => {
            let url = license.url.as_deref().unwrap_or_default();
            if url == config.mit_license_url() {
                CheckOutcome::pass(repo, "License OK")
            } else {
                CheckOutcome::fail(repo, format!("License not MIT ({})", url))
            }
        }
    }
}

// Slashes in the full name, branch and path stay as separators; every piece in
// between is percent-encoded.
pub fn raw_file_url(config: &Config, repo: &Repository, path: &str) -> Result<Url, AuditError> {
    let segments = repo
        .full_name
        .split('/')
        .chain(repo.branch().split('/'))
        .chain(path.split('/'));
    url_with_segments(&config.raw_url, segments)
}

// Only an exact 200 counts as present. Any other status is "not found";
// a transport failure aborts the run.
pub fn file_exists(
    client: &Client,
    config: &Config,
    repo: &Repository,
    path: &str,
) -> Result<bool, AuditError> {
    let url = raw_file_url(config, repo, path)?;
    let res = client
        .get(url.clone())
        .send()
        .map_err(|source| AuditError::Transport {
            url: url.to_string(),
            source,
        })?;

    log::debug!("GET {} -> {}", url, res.status());
    Ok(res.status() == StatusCode::OK)
}

pub fn check_file(
    client: &Client,
    config: &Config,
    repo: &Repository,
    file: &RequiredFile,
) -> Result<CheckOutcome, AuditError> {
    let outcome = if file_exists(client, config, repo, file.path)? {
        CheckOutcome::pass(repo, file.found)
    } else {
        CheckOutcome::fail(repo, file.missing)
    };
    Ok(outcome)
}

pub fn report<W: Write>(out: &mut W, outcome: &CheckOutcome) -> Result<(), AuditError> {
    writeln!(out, "{}", outcome)?;
    Ok(())
}

// Runs the checks for one repository in order, writing each line as soon as it is known.
pub fn check_repository<W: Write>(
    client: &Client,
    config: &Config,
    repo: &Repository,
    out: &mut W,
) -> Result<Vec<CheckOutcome>, AuditError> {
    if let Some(outcome) = exemption(repo) {
        report(out, &outcome)?;
        return Ok(vec![outcome]);
    }

    let mut outcomes = Vec::with_capacity(3);

    let license = check_license(config, repo);
    report(out, &license)?;
    outcomes.push(license);

    for file in [&README, &CONTRIBUTING] {
        let outcome = check_file(client, config, repo, file)?;
        report(out, &outcome)?;
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::build_client;
    use crate::models::License;

    fn repo(name: &str) -> Repository {
        Repository {
            name: name.to_string(),
            full_name: format!("acme/{name}"),
            private: false,
            html_url: format!("https://github.com/acme/{name}"),
            fork: false,
            url: format!("https://api.github.com/repos/acme/{name}"),
            clone_url: format!("https://github.com/acme/{name}.git"),
            archived: false,
            license: Some(License {
                url: Some("https://api.github.com/licenses/mit".to_string()),
                key: Some("mit".to_string()),
                name: Some("MIT License".to_string()),
                spdx_id: Some("MIT".to_string()),
            }),
            default_branch: Some("main".to_string()),
        }
    }

    fn license_with_url(url: Option<&str>) -> Option<License> {
        Some(License {
            url: url.map(str::to_string),
            key: None,
            name: None,
            spdx_id: None,
        })
    }

    fn mock_config(server: &mockito::Server) -> Config {
        Config {
            raw_url: server.url(),
            ..Config::default()
        }
    }

    fn labels(outcomes: &[CheckOutcome]) -> Vec<(bool, &str)> {
        outcomes.iter().map(|o| (o.ok, o.label.as_str())).collect()
    }

    #[test]
    fn archived_and_fork_short_circuit() {
        let config = Config::default();
        // Nothing is mocked: any file request would fail the run.
        let client = build_client(&config).unwrap();

        let mut archived = repo("old");
        archived.archived = true;
        archived.license = None;
        let mut fork = repo("copy");
        fork.fork = true;
        fork.license = None;
        let mut both = repo("both");
        both.archived = true;
        both.fork = true;

        let mut out = Vec::new();
        let a = check_repository(&client, &config, &archived, &mut out).unwrap();
        let f = check_repository(&client, &config, &fork, &mut out).unwrap();
        let b = check_repository(&client, &config, &both, &mut out).unwrap();

        assert_eq!(labels(&a), vec![(true, "Archived. No further checks")]);
        assert_eq!(labels(&f), vec![(true, "Fork. No further checks")]);
        assert_eq!(labels(&b), vec![(true, "Archived. No further checks")]);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "✅ acme/old: Archived. No further checks\n\
             ✅ acme/copy: Fork. No further checks\n\
             ✅ acme/both: Archived. No further checks\n"
        );
    }

    #[test]
    fn license_matching() {
        let config = Config::default();

        let mit = repo("mit");
        let outcome = check_license(&config, &mit);
        assert!(outcome.ok);
        assert_eq!(outcome.label, "License OK");

        let mut apache = repo("apache");
        apache.license = license_with_url(Some("https://api.github.com/licenses/apache-2.0"));
        let outcome = check_license(&config, &apache);
        assert!(!outcome.ok);
        assert_eq!(
            outcome.label,
            "License not MIT (https://api.github.com/licenses/apache-2.0)"
        );

        let mut near_miss = repo("near");
        near_miss.license = license_with_url(Some("https://api.github.com/licenses/mit/"));
        assert!(!check_license(&config, &near_miss).ok);

        let mut other = repo("other");
        other.license = license_with_url(None);
        assert_eq!(check_license(&config, &other).label, "License not MIT ()");

        let mut none = repo("none");
        none.license = None;
        let outcome = check_license(&config, &none);
        assert!(!outcome.ok);
        assert_eq!(outcome.label, "License missing!");
    }

    #[test]
    fn raw_url_uses_full_name_and_default_branch() {
        let config = Config::default();
        let mut r = repo("widgets");
        r.default_branch = Some("release/1.x".to_string());
        assert_eq!(
            raw_file_url(&config, &r, "README.md").unwrap().as_str(),
            "https://raw.githubusercontent.com/acme/widgets/release/1.x/README.md"
        );

        r.default_branch = None;
        assert_eq!(
            raw_file_url(&config, &r, "CONTRIBUTING.md").unwrap().as_str(),
            "https://raw.githubusercontent.com/acme/widgets/main/CONTRIBUTING.md"
        );
    }

    #[test]
    fn raw_url_escapes_branch_characters() {
        let config = Config::default();
        let mut r = repo("widgets");
        r.default_branch = Some("fix#12%done?".to_string());
        assert_eq!(
            raw_file_url(&config, &r, "README.md").unwrap().as_str(),
            "https://raw.githubusercontent.com/acme/widgets/fix%2312%25done%3F/README.md"
        );
    }

    #[test]
    fn only_200_means_the_file_exists() {
        let mut server = mockito::Server::new();
        let config = mock_config(&server);
        let client = build_client(&config).unwrap();
        let r = repo("widgets");

        let found = server
            .mock("GET", "/acme/widgets/main/README.md")
            .with_status(200)
            .with_body("# widgets")
            .expect(1)
            .create();
        assert!(file_exists(&client, &config, &r, "README.md").unwrap());
        found.assert();

        for status in [404, 403, 500, 301] {
            let path = format!("/acme/widgets/main/status-{status}.md");
            let mock = server
                .mock("GET", path.as_str())
                .with_status(status)
                .with_header("location", "https://example.com/elsewhere")
                .create();
            let exists = file_exists(&client, &config, &r, &format!("status-{status}.md")).unwrap();
            assert!(!exists, "status {status} should count as missing");
            mock.assert();
        }
    }

    #[test]
    fn full_checks_for_active_repository() {
        let mut server = mockito::Server::new();
        let config = mock_config(&server);
        let client = build_client(&config).unwrap();

        let mut r = repo("widgets");
        r.license = None;
        server
            .mock("GET", "/acme/widgets/main/README.md")
            .with_status(200)
            .create();
        server
            .mock("GET", "/acme/widgets/main/CONTRIBUTING.md")
            .with_status(404)
            .create();

        let mut out = Vec::new();
        let outcomes = check_repository(&client, &config, &r, &mut out).unwrap();

        assert_eq!(
            labels(&outcomes),
            vec![
                (false, "License missing!"),
                (true, "Has README"),
                (false, "No CONTRIBUTING found"),
            ]
        );
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "❌ acme/widgets: License missing!\n\
             ✅ acme/widgets: Has README\n\
             ❌ acme/widgets: No CONTRIBUTING found\n"
        );
    }

    #[test]
    fn transport_failure_aborts_after_reporting_earlier_lines() {
        let config = Config {
            raw_url: "http://127.0.0.1:1".to_string(),
            ..Config::default()
        };
        let client = build_client(&config).unwrap();

        let mut out = Vec::new();
        let err = check_repository(&client, &config, &repo("widgets"), &mut out).unwrap_err();

        assert!(matches!(err, AuditError::Transport { .. }));
        assert_eq!(String::from_utf8(out).unwrap(), "✅ acme/widgets: License OK\n");
    }
}
