use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::constants::{cache, limits, ranking, sources};
use crate::domain::SourceKind;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub catalog: CatalogConfig,

    pub sources: SourcesConfig,

    pub localization: LocalizationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    #[serde(default)]
    pub suppress_connection_errors: bool,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/shiori.db".to_string(),
            log_level: "info".to_string(),
            suppress_connection_errors: false,
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Providers queried when a search names none
    pub default_sources: Vec<String>,

    pub default_limit: usize,

    pub max_limit: usize,

    pub cache_max_entries: usize,

    pub cache_ttl_seconds: u64,

    /// Weight of the query/title length ratio in the prefix and substring tiers
    pub match_ratio_bonus: f64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_sources: sources::DEFAULT_SEARCH_SOURCES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            default_limit: limits::DEFAULT_SEARCH_LIMIT,
            max_limit: limits::MAX_SEARCH_LIMIT,
            cache_max_entries: cache::SEARCH_CACHE_MAX_ENTRIES,
            cache_ttl_seconds: cache::SEARCH_CACHE_TTL_SECONDS,
            match_ratio_bonus: ranking::DEFAULT_RATIO_BONUS,
        }
    }
}

impl CatalogConfig {
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub jikan_url: String,

    pub shikimori_url: String,

    /// Site origin used for Shikimori page links and relative image paths
    pub shikimori_web_url: String,

    pub anilist_url: String,

    /// Shikimori rejects requests without a User-Agent
    pub user_agent: String,

    pub request_timeout_seconds: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            jikan_url: "https://api.jikan.moe/v4".to_string(),
            shikimori_url: "https://shikimori.one/api".to_string(),
            shikimori_web_url: "https://shikimori.one".to_string(),
            anilist_url: "https://graphql.anilist.co".to_string(),
            user_agent: format!("shiori/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_seconds: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizationConfig {
    /// Fill missing Ukrainian fields during search
    pub enabled: bool,

    pub endpoint: String,

    pub cache_ttl_hours: u64,

    pub cache_max_entries: usize,

    pub request_timeout_seconds: u64,
}

impl Default for LocalizationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
            cache_ttl_hours: cache::TRANSLATION_CACHE_TTL_HOURS,
            cache_max_entries: cache::TRANSLATION_CACHE_MAX_ENTRIES,
            request_timeout_seconds: 10,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("shiori").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".shiori").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        let catalog = &self.catalog;

        if catalog.max_limit == 0 {
            anyhow::bail!("catalog.max_limit must be > 0");
        }

        if catalog.default_limit == 0 || catalog.default_limit > catalog.max_limit {
            anyhow::bail!(
                "catalog.default_limit must be between 1 and {}",
                catalog.max_limit
            );
        }

        if catalog.cache_max_entries == 0 {
            anyhow::bail!("catalog.cache_max_entries must be > 0");
        }

        if catalog.default_sources.is_empty() {
            anyhow::bail!("catalog.default_sources cannot be empty");
        }

        if let Some(unknown) = catalog
            .default_sources
            .iter()
            .find(|s| SourceKind::parse(s).is_none())
        {
            anyhow::bail!("Unknown source in catalog.default_sources: '{unknown}'");
        }

        if self.general.min_db_connections > self.general.max_db_connections {
            anyhow::bail!("general.min_db_connections cannot exceed max_db_connections");
        }

        Ok(())
    }

    /// Parsed `catalog.default_sources`, unknown names dropped.
    #[must_use]
    pub fn default_source_kinds(&self) -> Vec<SourceKind> {
        let mut kinds: Vec<SourceKind> = Vec::new();
        for kind in self.catalog.default_sources.iter().filter_map(|s| SourceKind::parse(s)) {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        kinds
    }
}
