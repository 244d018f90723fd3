// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use roster_store::DEFAULT_TABLE;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

pub const APP_NAME: &str = "roster";
pub const CONFIG_PATH_ENV: &str = "ROSTER_CONFIG_PATH";
pub const STORE_URL_ENV: &str = "ROSTER_STORE_URL";
pub const STORE_KEY_ENV: &str = "ROSTER_STORE_KEY";

const CONFIG_VERSION: i64 = 1;
const DEFAULT_TIMEOUT: &str = "10s";
const LOG_FILE_NAME: &str = "roster.log";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub store: Store,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            store: Store::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Store {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub table: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            table: Some(DEFAULT_TABLE.to_owned()),
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

/// Everything needed to build the HTTP store, after env overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub url: String,
    pub api_key: String,
    pub table: String,
    pub timeout: Duration,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [store] and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(url) = &self.store.url {
            let url = url.trim();
            if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) {
                bail!(
                    "store.url in {} must start with http:// or https://, got {url:?}",
                    path.display()
                );
            }
        }

        if let Some(table) = &self.store.table
            && table.trim().is_empty()
        {
            bail!("store.table in {} must not be empty", path.display());
        }

        if let Some(timeout) = &self.store.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "store.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(level) = &self.log.level
            && EnvFilter::try_new(level).is_err()
        {
            bail!(
                "log.level {level:?} in {} is not a valid filter (for example \"info\" or \"roster_store=debug,warn\")",
                path.display()
            );
        }

        Ok(())
    }

    /// `ROSTER_STORE_URL` wins over `[store].url`.
    pub fn store_url(&self) -> Option<String> {
        env_override(STORE_URL_ENV).or_else(|| non_empty(self.store.url.as_deref()))
    }

    /// `ROSTER_STORE_KEY` wins over `[store].api_key`.
    pub fn store_api_key(&self) -> Option<String> {
        env_override(STORE_KEY_ENV).or_else(|| non_empty(self.store.api_key.as_deref()))
    }

    pub fn store_table(&self) -> &str {
        self.store
            .table
            .as_deref()
            .map(str::trim)
            .unwrap_or(DEFAULT_TABLE)
    }

    pub fn store_timeout(&self) -> Result<Duration> {
        parse_duration(self.store.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn store_settings(&self) -> Result<StoreSettings> {
        let url = self.store_url().ok_or_else(|| {
            anyhow!("no store url configured -- set [store].url or {STORE_URL_ENV}")
        })?;
        let api_key = self.store_api_key().ok_or_else(|| {
            anyhow!("no store api key configured -- set [store].api_key or {STORE_KEY_ENV}")
        })?;
        Ok(StoreSettings {
            url,
            api_key,
            table: self.store_table().to_owned(),
            timeout: self.store_timeout()?,
        })
    }

    pub fn log_level(&self) -> Option<&str> {
        self.log
            .level
            .as_deref()
            .map(str::trim)
            .filter(|level| !level.is_empty())
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(file) = non_empty(self.log.file.as_deref()) {
            return Ok(PathBuf::from(file));
        }
        let data_root = dirs::data_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [log].file to a writable path")
        })?;
        Ok(data_root.join(APP_NAME).join(LOG_FILE_NAME))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# roster config\n# Place this file at: {}\n\nversion = 1\n\n[store]\n# Base URL of the hosted project. {STORE_URL_ENV} overrides it.\nurl = \"https://your-project.example.co\"\n# Public API key. {STORE_KEY_ENV} overrides it.\napi_key = \"\"\ntable = \"{DEFAULT_TABLE}\"\ntimeout = \"{DEFAULT_TIMEOUT}\"\n\n[log]\n# Filter directive; ROSTER_LOG and RUST_LOG take precedence.\n# level = \"info\"\n# Default is the platform data dir (for example ~/.local/share/roster/roster.log)\n# file = \"/absolute/path/to/roster.log\"\n",
            path.display(),
        )
    }
}

fn env_override(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        let Some(secs) = mins.checked_mul(60) else {
            bail!("timeout duration {raw:?} is too large");
        };
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 10s)")
}
