use super::forecast::UNIT_SYSTEMS;
use super::{
    AttachmentConfig, ForecastConfig, GatewayConfig, ObservabilityConfig, ResourceApiConfig,
};
use crate::error::ConfigError;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Path the config was loaded from - not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Whether `config_path` existed at load time. Reported once logging is up.
    #[serde(skip)]
    pub loaded_from_file: bool,

    #[serde(default)]
    pub resource_api: ResourceApiConfig,

    #[serde(default)]
    pub forecast: ForecastConfig,

    #[serde(default)]
    pub attachment: AttachmentConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// `<platform config dir>/addonfn/config.toml`, or `./config.toml` when
    /// no home directory can be resolved.
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("", "", "addonfn").map_or_else(
            || PathBuf::from("config.toml"),
            |dirs| dirs.config_dir().join("config.toml"),
        )
    }

    /// Load from `path` (tilde-expanded), or the default location. A missing
    /// file yields defaults; a present but unparsable file is an error.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = match path {
            Some(raw) => PathBuf::from(shellexpand::tilde(raw).as_ref()),
            None => Self::default_path(),
        };

        let loaded_from_file = config_path.exists();
        let mut config = if loaded_from_file {
            load_from_path(&config_path)?
        } else {
            Self::default()
        };
        config.config_path = config_path;
        config.loaded_from_file = loaded_from_file;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("ADDONFN_FORECAST_API_KEY") {
            if !key.is_empty() {
                self.forecast.api_key = Some(key);
            }
        }

        if let Ok(url) = std::env::var("ADDONFN_RESOURCE_API_URL") {
            if !url.is_empty() {
                self.resource_api.base_url = url;
            }
        }

        if let Ok(port_str) =
            std::env::var("ADDONFN_GATEWAY_PORT").or_else(|_| std::env::var("PORT"))
        {
            if let Ok(port) = port_str.parse::<u16>() {
                self.gateway.port = port;
            }
        }

        if let Ok(host) = std::env::var("ADDONFN_GATEWAY_HOST").or_else(|_| std::env::var("HOST"))
        {
            if !host.is_empty() {
                self.gateway.host = host;
            }
        }

        if let Ok(level) = std::env::var("ADDONFN_LOG_LEVEL") {
            if !level.is_empty() {
                self.observability.log_level = level;
            }
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let urls = [
            ("resource_api.base_url", &self.resource_api.base_url),
            ("forecast.base_url", &self.forecast.base_url),
            ("forecast.icon_base_url", &self.forecast.icon_base_url),
            ("attachment.content_url", &self.attachment.content_url),
        ];
        for (field, value) in urls {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{field} must not be empty")));
            }
            url::Url::parse(value)
                .map_err(|e| ConfigError::Validation(format!("{field} is not a URL: {e}")))?;
        }

        if !UNIT_SYSTEMS.contains(&self.forecast.units.trim()) {
            return Err(ConfigError::Validation(format!(
                "forecast.units must be one of {}",
                UNIT_SYSTEMS.join(", ")
            )));
        }

        if self.attachment.sentinel_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "attachment.sentinel_name must not be empty".into(),
            ));
        }

        Ok(())
    }
}

fn load_from_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .map_err(ConfigError::Io)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| ConfigError::Load(e.to_string()))
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}
