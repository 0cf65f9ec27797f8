use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Listing configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Records per page
    pub page_size: usize,

    /// First page shown (zero-based, clamped)
    pub initial_page: i64,

    /// Query index URL; the built-in demo listing is used when absent
    pub endpoint: Option<String>,

    /// Size of the demo listing
    pub demo_items: usize,

    /// Simulated latency of the demo listing in milliseconds
    pub latency_ms: u64,

    /// Page cache settings
    pub cache: CacheConfig,
}

/// Caller-side page cache settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub max_pages: usize,
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_pages: 10,
            ttl_secs: 300,
        }
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            initial_page: 0,
            endpoint: None,
            demo_items: 95,
            latency_ms: 150,
            cache: CacheConfig::default(),
        }
    }
}

impl ListingConfig {
    /// Initialize configuration from defaults, a config file and the environment
    pub async fn init(explicit_path: Option<&Path>) -> Result<Self> {
        debug!("Initializing configuration");

        let mut config = match explicit_path {
            Some(path) => Self::load_from_path(path).await?,
            None => match Self::load_from_file().await {
                Ok(config) => config,
                Err(e) => {
                    debug!("Using default configuration: {:#}", e);
                    Self::default()
                }
            },
        };

        config.load_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from the first pagewalk.json found
    pub async fn load_from_file() -> Result<Self> {
        // 1. ./.pagewalk.json
        // 2. ./pagewalk.json
        // 3. $CONFIG_DIR/pagewalk/pagewalk.json
        let mut config_paths = vec![
            PathBuf::from("./.pagewalk.json"),
            PathBuf::from("./pagewalk.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            config_paths.push(config_dir.join("pagewalk").join("pagewalk.json"));
        }

        for path in config_paths {
            if path.exists() {
                return Self::load_from_path(&path).await;
            }
        }

        Err(anyhow!("No configuration file found"))
    }

    /// Load configuration from a specific JSON file
    pub async fn load_from_path(path: &Path) -> Result<Self> {
        debug!("Loading configuration from: {}", path.display());
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    /// Apply `PAGEWALK_*` environment variables
    pub fn load_from_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any variable lookup
    pub fn apply_vars<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(page_size) = parse_var(&var, "PAGEWALK_PAGE_SIZE") {
            self.page_size = page_size;
        }

        if let Some(initial_page) = parse_var(&var, "PAGEWALK_INITIAL_PAGE") {
            self.initial_page = initial_page;
        }

        if let Some(endpoint) = var("PAGEWALK_ENDPOINT") {
            let endpoint = endpoint.trim();
            self.endpoint = (!endpoint.is_empty()).then(|| endpoint.to_string());
        }

        if let Some(demo_items) = parse_var(&var, "PAGEWALK_DEMO_ITEMS") {
            self.demo_items = demo_items;
        }

        if let Some(latency_ms) = parse_var(&var, "PAGEWALK_LATENCY_MS") {
            self.latency_ms = latency_ms;
        }

        if let Some(enabled) = var("PAGEWALK_CACHE") {
            self.cache.enabled = matches!(enabled.to_lowercase().as_str(), "1" | "true" | "on" | "yes");
        }

        if let Some(max_pages) = parse_var(&var, "PAGEWALK_CACHE_MAX_PAGES") {
            self.cache.max_pages = max_pages;
        }

        if let Some(ttl) = var("PAGEWALK_CACHE_TTL") {
            match humantime::parse_duration(&ttl) {
                Ok(ttl) => self.cache.ttl_secs = ttl.as_secs(),
                Err(e) => warn!("Ignoring PAGEWALK_CACHE_TTL={}: {}", ttl, e),
            }
        }
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(anyhow!("page_size must be greater than 0"));
        }

        if let Some(endpoint) = &self.endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(anyhow!("endpoint must be an http(s) URL, got {}", endpoint));
            }
        }

        if self.cache.enabled && self.cache.max_pages == 0 {
            return Err(anyhow!("cache.max_pages must be greater than 0"));
        }

        Ok(())
    }
}

fn parse_var<F, V>(var: &F, key: &str) -> Option<V>
where
    F: Fn(&str) -> Option<String>,
    V: std::str::FromStr,
    V::Err: std::fmt::Display,
{
    let raw = var(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring {}={}: {}", key, raw, e);
            None
        }
    }
}
