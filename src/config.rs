use std::env;
use std::time::Duration;

use dotenv::dotenv;
use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;

use crate::error::AuditError;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_RAW_URL: &str = "https://raw.githubusercontent.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok();
    Config::from_lookup(|key| env::var(key).ok())
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub raw_url: String,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_API_URL.to_string(),
            raw_url: DEFAULT_RAW_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    // Reads GITHUB_API_URL, GITHUB_RAW_URL and REQUEST_TIMEOUT_SECS through `lookup`,
    // falling back to the public GitHub endpoints.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let api_url = lookup("GITHUB_API_URL")
            .map(|url| trim_base(&url))
            .unwrap_or(defaults.api_url);
        let raw_url = lookup("GITHUB_RAW_URL")
            .map(|url| trim_base(&url))
            .unwrap_or(defaults.raw_url);

        let timeout = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) => Duration::from_secs(secs),
                Err(_) => {
                    log::warn!(
                        "Ignoring invalid REQUEST_TIMEOUT_SECS {:?}, using {}s",
                        value,
                        DEFAULT_TIMEOUT_SECS
                    );
                    defaults.timeout
                }
            },
            None => defaults.timeout,
        };

        Config {
            api_url,
            raw_url,
            timeout,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    // License URL the listing endpoint reports for MIT.
    pub fn mit_license_url(&self) -> String {
        format!("{}/licenses/mit", self.api_url)
    }
}

fn trim_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

// Redirects are not followed: only a direct 200 counts as a file being present.
pub fn build_client(config: &Config) -> Result<Client, AuditError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.timeout)
        .redirect(Policy::none())
        .build()
        .map_err(AuditError::Client)
}
