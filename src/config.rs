// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Finboard", "finboard"));

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("valid url regex"));

pub const ENV_API_URL: &str = "FINBOARD_API_URL";
pub const ENV_TOKEN: &str = "FINBOARD_TOKEN";
pub const ENV_TIMEOUT: &str = "FINBOARD_TIMEOUT_SECS";
pub const ENV_STALE: &str = "FINBOARD_STALE_SECS";
pub const ENV_LOG: &str = "RUST_LOG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
    /// Cached query results younger than this are served without a request.
    pub stale_after_secs: u64,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000/api/v1".to_string(),
            token: None,
            timeout_secs: 15,
            stale_after_secs: 30,
            log_level: "warn".to_string(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific config dir")?;
    Ok(proj.config_dir().join("config.json"))
}

fn parse_secs(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
        key,
        reason: format!("'{}' is not a whole number of seconds ({})", raw, e),
    })
}

impl Config {
    /// Reads a JSON config file; a missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Overlays environment values. `lookup` is usually `std::env::var(..).ok()`.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(token) = lookup(ENV_TOKEN) {
            self.token = Some(token);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT) {
            self.timeout_secs = parse_secs(ENV_TIMEOUT, &raw)?;
        }
        if let Some(raw) = lookup(ENV_STALE) {
            self.stale_after_secs = parse_secs(ENV_STALE, &raw)?;
        }
        if let Some(level) = lookup(ENV_LOG) {
            self.log_level = level;
        }
        Ok(self)
    }

    pub fn with_overrides(mut self, api_url: Option<&str>, token: Option<&str>) -> Self {
        if let Some(u) = api_url {
            self.api_url = u.to_string();
        }
        if let Some(t) = token {
            self.token = Some(t.to_string());
        }
        self
    }

    pub fn validate(self) -> Result<Self, ConfigError> {
        let trimmed = self.api_url.trim();
        if !URL_RE.is_match(trimmed) {
            return Err(ConfigError::Invalid {
                key: "api_url",
                reason: format!("'{}' must be an http(s) URL", self.api_url),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.token.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                key: "token",
                reason: "must not be blank".to_string(),
            });
        }
        Ok(Self {
            api_url: trimmed.to_string(),
            ..self
        })
    }

    /// Defaults, then the config file, then `.env`/process environment.
    ///
    /// Without a home directory there is no config file, so only env applies.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let path = config_path().ok();
        let cfg = Self::layered(path.as_deref(), |k| std::env::var(k).ok())?;
        Ok(cfg)
    }

    /// Defaults, then `path` when there is one, then `lookup`.
    pub fn layered<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        base.with_env(lookup)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }

    /// Copy safe to print: the token is masked.
    pub fn redacted(&self) -> Self {
        let token = self.token.as_ref().map(|t| {
            let tail: String = t.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
            format!("****{}", tail)
        });
        Self {
            token,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn env_overrides_defaults() {
        let cfg = Config::default()
            .with_env(env(&[(ENV_API_URL, "https://bank.example/api/v1"), (ENV_STALE, "5")]))
            .unwrap();
        assert_eq!(cfg.api_url, "https://bank.example/api/v1");
        assert_eq!(cfg.stale_after(), Duration::from_secs(5));
        assert_eq!(cfg.timeout_secs, 15);
    }

    #[test]
    fn bad_timeout_names_the_key() {
        let err = Config::default()
            .with_env(env(&[(ENV_TIMEOUT, "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_TIMEOUT));
    }

    #[test]
    fn validate_rejects_non_http_urls() {
        let cfg = Config {
            api_url: "ftp://bank".into(),
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn redacted_keeps_only_token_tail() {
        let cfg = Config {
            token: Some("abcdef123456".into()),
            ..Config::default()
        };
        assert_eq!(cfg.redacted().token.as_deref(), Some("****3456"));
    }
}
