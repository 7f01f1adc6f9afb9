use std::fmt;

use serde::Deserialize;

// Branch assumed when the listing omits default_branch.
pub const FALLBACK_BRANCH: &str = "main";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub fork: bool,
    // API URL
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub clone_url: String,
    #[serde(default)]
    pub archived: bool,
    pub license: Option<License>,
    pub default_branch: Option<String>,
}

impl Repository {
    pub fn branch(&self) -> &str {
        self.default_branch
            .as_deref()
            .filter(|branch| !branch.is_empty())
            .unwrap_or(FALLBACK_BRANCH)
    }
}

// GitHub sends a null url for licenses it cannot classify ("other").
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct License {
    pub url: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub spdx_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub repository: String,
    pub ok: bool,
    pub label: String,
}

impl CheckOutcome {
    pub fn pass(repo: &Repository, label: impl Into<String>) -> Self {
        CheckOutcome {
            repository: repo.full_name.clone(),
            ok: true,
            label: label.into(),
        }
    }

    pub fn fail(repo: &Repository, label: impl Into<String>) -> Self {
        CheckOutcome {
            repository: repo.full_name.clone(),
            ok: false,
            label: label.into(),
        }
    }

    pub fn glyph(&self) -> &'static str {
        if self.ok {
            "✅"
        } else {
            "❌"
        }
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.glyph(), self.repository, self.label)
    }
}
