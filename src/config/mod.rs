use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::errors::{AppError, AppResult};

pub mod defaults;
pub mod duration_serde;

use defaults::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub remote_store: RemoteStoreConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
}

/// Local persistent icon cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,
}

/// Cloudinary account and delivery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteStoreConfig {
    #[serde(default = "default_cloud_name")]
    pub cloud_name: String,
    #[serde(default = "default_upload_preset")]
    pub upload_preset: String,
    /// Folder prefix of the public id (`{folder}/{domain}`)
    #[serde(default = "default_folder")]
    pub folder: String,
    /// Transformation applied to the stable delivery URL
    #[serde(default = "default_transformation")]
    pub transformation: String,
    /// Transformation applied to fetch-proxied provider icons
    #[serde(default = "default_fetch_transformation")]
    pub fetch_transformation: String,
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_delivery_base")]
    pub delivery_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Requested edge size for the Google favicon service
    #[serde(default = "default_google_size")]
    pub google_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Upper bound for a single probe or fetch, including body download
    #[serde(default = "default_probe_timeout", with = "duration_serde::duration")]
    pub timeout: Duration,
    #[serde(default = "default_probe_max_bytes")]
    pub max_bytes: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Candidates at or below this width are discarded as placeholders
    #[serde(default = "default_placeholder_max_width")]
    pub placeholder_max_width: u32,
    /// Provider winners at or above this width are published back
    #[serde(default = "default_publish_min_width")]
    pub publish_min_width: u32,
}

fn default_cache_path() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_PATH)
}

fn default_cloud_name() -> String {
    DEFAULT_CLOUD_NAME.to_string()
}

fn default_upload_preset() -> String {
    DEFAULT_UPLOAD_PRESET.to_string()
}

fn default_folder() -> String {
    DEFAULT_FOLDER.to_string()
}

fn default_transformation() -> String {
    DEFAULT_TRANSFORMATION.to_string()
}

fn default_fetch_transformation() -> String {
    DEFAULT_FETCH_TRANSFORMATION.to_string()
}

fn default_tags() -> Vec<String> {
    DEFAULT_TAGS.iter().map(|t| t.to_string()).collect()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_delivery_base() -> String {
    DEFAULT_DELIVERY_BASE.to_string()
}

fn default_google_size() -> u32 {
    DEFAULT_GOOGLE_SIZE
}

fn default_probe_timeout() -> Duration {
    Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS)
}

fn default_probe_max_bytes() -> u64 {
    DEFAULT_PROBE_MAX_BYTES
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_placeholder_max_width() -> u32 {
    DEFAULT_PLACEHOLDER_MAX_WIDTH
}

fn default_publish_min_width() -> u32 {
    DEFAULT_PUBLISH_MIN_WIDTH
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
        }
    }
}

impl Default for RemoteStoreConfig {
    fn default() -> Self {
        Self {
            cloud_name: default_cloud_name(),
            upload_preset: default_upload_preset(),
            folder: default_folder(),
            transformation: default_transformation(),
            fetch_transformation: default_fetch_transformation(),
            tags: default_tags(),
            api_base: default_api_base(),
            delivery_base: default_delivery_base(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            google_size: default_google_size(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: default_probe_timeout(),
            max_bytes: default_probe_max_bytes(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            placeholder_max_width: default_placeholder_max_width(),
            publish_min_width: default_publish_min_width(),
        }
    }
}

impl Config {
    /// Load from `CONFIG_FILE` (or the default file name) plus the environment
    pub fn load() -> AppResult<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from_file(&config_file)
    }

    /// Layer defaults, the TOML file (if present) and `FAVICON_RESOLVER_*` variables.
    ///
    /// Nested keys use `__` in variable names, e.g. `FAVICON_RESOLVER_PROBE__TIMEOUT=5s`.
    pub fn load_from_file(config_file: impl AsRef<Path>) -> AppResult<Self> {
        let config_file = config_file.as_ref();
        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| AppError::configuration(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Write the default configuration as TOML, refusing to clobber an existing file
    pub fn write_default(config_file: impl AsRef<Path>) -> AppResult<()> {
        let config_file = config_file.as_ref();
        if config_file.exists() {
            return Err(AppError::configuration(format!(
                "Refusing to overwrite existing config file: {}",
                config_file.display()
            )));
        }

        let contents = toml::to_string_pretty(&Self::default())
            .map_err(|e| AppError::configuration(e.to_string()))?;
        std::fs::write(config_file, contents)?;
        info!("Created default config file: {}", config_file.display());
        Ok(())
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.remote_store.cloud_name.trim().is_empty() {
            return Err(AppError::configuration("remote_store.cloud_name must not be empty"));
        }
        if self.remote_store.folder.trim().is_empty() {
            return Err(AppError::configuration("remote_store.folder must not be empty"));
        }
        if self.probe.timeout.is_zero() {
            return Err(AppError::configuration("probe.timeout must be greater than zero"));
        }
        if self.ranking.placeholder_max_width >= self.ranking.publish_min_width {
            return Err(AppError::configuration(format!(
                "ranking.placeholder_max_width ({}) must be below ranking.publish_min_width ({})",
                self.ranking.placeholder_max_width, self.ranking.publish_min_width
            )));
        }
        Ok(())
    }
}
