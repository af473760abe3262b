// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use agentdeck_api::DEFAULT_CACHE_TTL;
use agentdeck_app::query::DEFAULT_PAGE_SIZE;
use agentdeck_app::session::ExpiryDecode;
use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_VERSION: i64 = 1;
pub const CONFIG_PATH_ENV: &str = "AGENTDECK_CONFIG_PATH";
const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub auth: Auth,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: Api::default(),
            storage: Storage::default(),
            ui: Ui::default(),
            auth: Auth::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Api {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
    pub cache_ttl: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Storage {
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Ui {
    pub page_size: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Auth {
    pub expiry_decode: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;

        let app_dir = config_root.join(agentdeck_store::APP_NAME);
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
                    "config file {} is not versioned. Add `version = 1` and put values under [api], [storage], [ui], [auth] and [log]",
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
        if let Some(base_url) = &self.api.base_url {
            let trimmed = base_url.trim();
            if trimmed.is_empty() {
                bail!("api.base_url in {} must not be empty", path.display());
            }
            url::Url::parse(trimmed).with_context(|| {
                format!(
                    "api.base_url in {} is not a valid URL: {trimmed:?}",
                    path.display()
                )
            })?;
        }

        if let Some(timeout) = &self.api.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "api.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(ttl) = &self.api.cache_ttl {
            parse_duration(ttl)
                .with_context(|| format!("api.cache_ttl in {}", path.display()))?;
        }

        if let Some(db_path) = &self.storage.db_path {
            agentdeck_store::validate_db_path(db_path)?;
        }

        if let Some(page_size) = self.ui.page_size
            && page_size < 1
        {
            bail!(
                "ui.page_size in {} must be at least 1, got {}",
                path.display(),
                page_size
            );
        }

        if let Some(mode) = &self.auth.expiry_decode
            && ExpiryDecode::parse(mode).is_none()
        {
            bail!(
                "auth.expiry_decode in {} must be \"fail-closed\" or \"fail-open\", got {mode:?}",
                path.display()
            );
        }

        if let Some(level) = &self.log.level {
            tracing_subscriber::EnvFilter::try_new(level).map_err(|error| {
                anyhow!(
                    "log.level in {} is not a valid filter ({error}): {level:?}",
                    path.display()
                )
            })?;
        }

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.api
            .base_url
            .as_deref()
            .map(str::trim)
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    /// `None` leaves requests without a client-side timeout.
    pub fn timeout(&self) -> Result<Option<Duration>> {
        self.api.timeout.as_deref().map(parse_duration).transpose()
    }

    pub fn cache_ttl(&self) -> Result<Duration> {
        match self.api.cache_ttl.as_deref() {
            Some(raw) => parse_duration(raw),
            None => Ok(DEFAULT_CACHE_TTL),
        }
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => agentdeck_store::default_db_path(),
        }
    }

    pub fn page_size(&self) -> u64 {
        self.ui
            .page_size
            .filter(|size| *size >= 1)
            .unwrap_or(DEFAULT_PAGE_SIZE) as u64
    }

    pub fn expiry_decode(&self) -> ExpiryDecode {
        self.auth
            .expiry_decode
            .as_deref()
            .and_then(ExpiryDecode::parse)
            .unwrap_or_default()
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        match &self.log.file {
            Some(path) => Ok(PathBuf::from(path)),
            None => agentdeck_store::default_log_path(),
        }
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# agentdeck config\n# Place this file at: {}\n\nversion = 1\n\n[api]\nbase_url = \"{}\"\n# Optional. Unset means no client-side timeout.\n# timeout = \"10s\"\n# \"0s\" disables the response cache.\ncache_ttl = \"{}s\"\n\n[storage]\n# Optional. Default is platform data dir (for example ~/.local/share/agentdeck/agentdeck.db)\n# db_path = \"/absolute/path/to/agentdeck.db\"\n\n[ui]\npage_size = {}\n\n[auth]\n# \"fail-open\" treats tokens without a readable expiry as valid.\nexpiry_decode = \"{}\"\n\n[log]\nlevel = \"{}\"\n# file = \"/absolute/path/to/agentdeck.log\"\n",
            path.display(),
            DEFAULT_BASE_URL,
            DEFAULT_CACHE_TTL.as_secs(),
            DEFAULT_PAGE_SIZE,
            ExpiryDecode::default().as_str(),
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 15s)")
}
