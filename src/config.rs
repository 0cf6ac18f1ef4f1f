//! Configuration management for wodharvest using the prefer crate.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::scrapers::USER_AGENT;

/// Landing page used to discover the listing URL.
pub const DEFAULT_START_URL: &str = "https://wodwell.com";
/// AJAX listing endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://wodwell.com/wods";
/// Feed tags selected by default.
pub const DEFAULT_FEEDS: &str = "1407,736,1611";
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1500;
/// Safety cap on page requests per run.
pub const DEFAULT_MAX_PAGES: u32 = 500;
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 30;
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Fixed form constants the listing endpoint expects, in send order.
///
/// The values are opaque tokens copied from the site's own AJAX calls.
pub fn default_form_fields() -> Vec<(String, String)> {
    [
        ("nf_ajax_query", "True"),
        ("sort", "newest"),
        ("FuLmIeHjQoyqcz", "imeFoLarXR3N9*"),
        ("NFufQjtR-mgPT", "TNZVv@Y1fntJj"),
        ("KgMAYul", "gAypIfE"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config {path}: {message}")]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },
}

/// Effective settings for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub start_url: String,
    pub endpoint: String,
    /// Comma-separated feed tag filter.
    pub feeds: String,
    /// Minimum delay between requests in milliseconds.
    pub request_delay_ms: u64,
    /// Safety cap on page requests per run.
    pub max_pages: u32,
    /// First page index to request.
    pub start_page: u32,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    /// User agent for HTTP requests ("impersonate" picks a browser agent).
    pub user_agent: String,
    pub form_fields: Vec<(String, String)>,
    /// Directory the JSON-lines output file is created in.
    pub output_dir: PathBuf,
    /// Visit the landing page before paginating.
    pub bootstrap: bool,
    /// Transport retries for transient failures.
    pub max_retries: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_url: DEFAULT_START_URL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            feeds: DEFAULT_FEEDS.to_string(),
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            max_pages: DEFAULT_MAX_PAGES,
            start_page: 0,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: USER_AGENT.to_string(),
            form_fields: default_form_fields(),
            output_dir: PathBuf::from("."),
            bootstrap: true,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feeds: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_delay_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Replaces the default form constants entirely when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_fields: Option<Vec<(String, String)>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bootstrap: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer for discovery.
    /// Falls back to defaults when no file is found or it fails to parse.
    pub async fn load() -> Self {
        match prefer::load("wodharvest").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => match Self::load_from_path(path).await {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!("Ignoring config file: {}", e);
                        Self::default()
                    }
                },
                None => Self::default(),
            },
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file. Format follows the extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mut config = Self::parse(path, &contents)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parse_err = |format, message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            format,
            message,
        };

        match ext {
            "toml" => toml::from_str(contents).map_err(|e| parse_err("TOML", e.to_string())),
            "yaml" | "yml" => {
                serde_yaml::from_str(contents).map_err(|e| parse_err("YAML", e.to_string()))
            }
            _ => serde_json::from_str(contents).map_err(|e| parse_err("JSON", e.to_string())),
        }
    }

    /// Directory of the config file, if loaded from one.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are joined onto `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Overlay file values onto settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref url) = self.start_url {
            settings.start_url = url.clone();
        }
        if let Some(ref endpoint) = self.endpoint {
            settings.endpoint = endpoint.clone();
        }
        if let Some(ref feeds) = self.feeds {
            settings.feeds = feeds.clone();
        }
        if let Some(delay) = self.request_delay_ms {
            settings.request_delay_ms = delay;
        }
        if let Some(max_pages) = self.max_pages {
            settings.max_pages = max_pages;
        }
        if let Some(start_page) = self.start_page {
            settings.start_page = start_page;
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = user_agent.clone();
        }
        if let Some(ref fields) = self.form_fields {
            settings.form_fields = fields.clone();
        }
        if let Some(ref dir) = self.output_dir {
            settings.output_dir = self.resolve_path(dir, base_dir);
        }
        if let Some(bootstrap) = self.bootstrap {
            settings.bootstrap = bootstrap;
        }
        if let Some(retries) = self.max_retries {
            settings.max_retries = retries;
        }
    }

    /// Compute SHA-256 hash of the serialized config.
    pub fn hash(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Load config (explicit path or discovered) and build settings from it.
pub async fn load_settings(config_path: Option<&Path>) -> Result<(Settings, Config), ConfigError> {
    let config = match config_path {
        Some(path) => Config::load_from_path(path).await?,
        None => Config::load().await,
    };

    let base_dir = config
        .base_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);
    Ok((settings, config))
}
