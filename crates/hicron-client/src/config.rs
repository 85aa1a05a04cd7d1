use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context as _, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::{ENV_GUARD, parse_from_env, request::DEFAULT_TIMEOUT_MS};

const CONFIG_FILE: &str = "hicron.toml";

pub const DEFAULT_ALMANAC_URL: &str = "https://hi.doniai.com/api/v1.0/crawler/huangli";
pub const DEFAULT_TICKET_URL: &str = "https://hi.doniai.com/api/v1.0/crawler/fucai";
pub const DEFAULT_DATABASE_URL: &str = "hicron.db";
pub const DEFAULT_TIMEZONE: &str = "Asia/Shanghai";

/// Runtime configuration, read from `hicron.toml` and overridden by the
/// environment (`DATABASE_URL`, `HICRON_TIMEZONE`, `LOGGER_LEVEL`,
/// `HICRON_ALMANAC_URL`, `HICRON_TICKET_URL`).
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CronConfig {
    pub database_url: String,
    pub timezone: String,
    pub log_level: Option<String>,
    pub almanac: EndpointConfig,
    pub ticket: EndpointConfig,
    /// File the config was read from, `None` when running on defaults.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct EndpointConfig {
    pub url: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl EndpointConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS))
    }
}

impl Default for CronConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            timezone: DEFAULT_TIMEZONE.to_owned(),
            log_level: None,
            almanac: EndpointConfig::default(),
            ticket: EndpointConfig::default(),
            source: None,
        }
    }
}

impl CronConfig {
    /// Load the config file (if any) and apply environment overrides.
    ///
    /// The file is looked up at `HICRON_CONFIG`, then next to the loaded
    /// `.env`, then in the working directory.
    pub fn load() -> Result<Self> {
        // .env has to be in the process environment before any lookup
        let env_file = ENV_GUARD.as_ref().ok().map(PathBuf::as_path);
        Self::load_with(env_file, parse_from_env::<String>)
    }

    /// [`CronConfig::load`] with an explicit `.env` location and variable lookup.
    pub fn load_with<F>(env_file: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match Self::locate(env_file, &lookup) {
            Some(path) => {
                let mut config = Self::from_file(&path)?;
                config.source = Some(path);
                config
            }
            None => Self::default(),
        };

        config.apply_overrides(lookup);
        Ok(config)
    }

    fn locate<F>(env_file: Option<&Path>, lookup: &F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(explicit) = lookup("HICRON_CONFIG") {
            return Some(PathBuf::from(explicit));
        }

        let beside_env = env_file
            .and_then(Path::parent)
            .map(|dir| dir.join(CONFIG_FILE));

        beside_env
            .into_iter()
            .chain(std::iter::once(PathBuf::from(CONFIG_FILE)))
            .find(|path| path.exists())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().display().to_string();
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {path_str}"))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {path_str}"))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.zone()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup, normally the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = url;
        }
        if let Some(zone) = lookup("HICRON_TIMEZONE") {
            self.timezone = zone;
        }
        if let Some(level) = lookup("LOGGER_LEVEL") {
            self.log_level = Some(level);
        }
        if let Some(url) = lookup("HICRON_ALMANAC_URL") {
            self.almanac.url = Some(url);
        }
        if let Some(url) = lookup("HICRON_TICKET_URL") {
            self.ticket.url = Some(url);
        }
    }

    pub fn zone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("Invalid timezone {:?}: {e}", self.timezone))
    }

    pub fn almanac_url(&self) -> &str {
        self.almanac.url.as_deref().unwrap_or(DEFAULT_ALMANAC_URL)
    }

    pub fn ticket_url(&self) -> &str {
        self.ticket.url.as_deref().unwrap_or(DEFAULT_TICKET_URL)
    }

    pub fn log_level(&self) -> Option<log::LevelFilter> {
        self.log_level.as_deref().and_then(|level| level.parse().ok())
    }
}
