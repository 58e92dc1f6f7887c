//! Client configuration: base URL, proxies and timeouts.
//!
//! Layering, lowest to highest priority: built-in defaults, an optional JSON file,
//! `GDPV_*` environment variables, then whatever the caller sets afterwards
//! (the CLI applies its flags last).

use crate::error::{ApiError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "https://api.worldbank.org/v2";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Forward proxy for `http://` requests.
    #[serde(default)]
    pub http_proxy: Option<String>,

    /// Forward proxy for `https://` requests.
    #[serde(default)]
    pub https_proxy: Option<String>,

    /// Total request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!("gdp_viewer/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            http_proxy: None,
            https_proxy: None,
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl ClientConfig {
    /// Defaults overlaid with the `GDPV_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Read a JSON config file (missing keys fall back to defaults), then apply the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(p) => Self::from_json_file(p)?,
            None => Self::default(),
        };
        Ok(base.with_overrides(|key| std::env::var(key).ok()))
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ApiError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| ApiError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Apply overrides from a key lookup (normally the process environment).
    ///
    /// `GDPV_PROXY` sets both proxies; the scheme-specific keys win over it.
    /// Empty values and unparsable timeouts are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("GDPV_BASE_URL") {
            self.base_url = url;
        }
        if let Some(proxy) = get("GDPV_PROXY") {
            self.http_proxy = Some(proxy.clone());
            self.https_proxy = Some(proxy);
        }
        if let Some(proxy) = get("GDPV_HTTP_PROXY") {
            self.http_proxy = Some(proxy);
        }
        if let Some(proxy) = get("GDPV_HTTPS_PROXY") {
            self.https_proxy = Some(proxy);
        }
        if let Some(secs) = get("GDPV_TIMEOUT_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(v) => self.timeout_secs = v,
                Err(_) => log::warn!("ignoring GDPV_TIMEOUT_SECS={secs:?}: not a number"),
            }
        }
        self
    }

    /// Route both plain and TLS traffic through one proxy.
    pub fn with_proxy(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.http_proxy = Some(url.clone());
        self.https_proxy = Some(url);
        self
    }

    /// Base URL without a trailing slash.
    pub fn trimmed_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
