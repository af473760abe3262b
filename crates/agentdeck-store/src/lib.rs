// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use agentdeck_app::session::TOKEN_KEY;
use agentdeck_app::url_state::UrlQuery;
use anyhow::{Context, Result, anyhow, bail};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub const APP_NAME: &str = "agentdeck";
pub const DB_PATH_ENV: &str = "AGENTDECK_DB_PATH";
pub const LAST_LIST_QUERY_KEY: &str = "last_list_query";
/// Absolute expiry (unix seconds) the server reported for the stored token.
pub const TOKEN_EXPIRES_AT_KEY: &str = "auth_token_expires_at";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS kv (
  key TEXT PRIMARY KEY,
  value TEXT NOT NULL,
  updated_at TEXT NOT NULL
);
";
const KV_COLUMNS: [&str; 3] = ["key", "value", "updated_at"];

/// Local key-value persistence for the session token and the last list
/// query.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        set_private_permissions(path)?;
        tracing::debug!(path = %path.display(), "opened store");
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn bootstrap(&self) -> Result<()> {
        if table_exists(&self.conn, "kv")? {
            validate_schema(&self.conn)?;
            return Ok(());
        }
        self.conn.execute_batch(SCHEMA).context("create schema")?;
        tracing::debug!("created kv table");
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
            .with_context(|| format!("read key {key}"))
    }

    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO kv (key, value, updated_at)
                VALUES (?, ?, ?)
                ON CONFLICT(key) DO UPDATE SET
                  value = excluded.value,
                  updated_at = excluded.updated_at
                ",
                params![key, value, now],
            )
            .with_context(|| format!("upsert key {key}"))?;
        Ok(())
    }

    /// Returns whether a row was removed.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM kv WHERE key = ?", params![key])
            .with_context(|| format!("delete key {key}"))?;
        Ok(removed > 0)
    }

    pub fn updated_at(&self, key: &str) -> Result<Option<OffsetDateTime>> {
        let raw = self
            .conn
            .query_row(
                "SELECT updated_at FROM kv WHERE key = ?",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .with_context(|| format!("read timestamp for {key}"))?;
        raw.map(|value| {
            OffsetDateTime::parse(&value, &Rfc3339)
                .with_context(|| format!("parse timestamp {value:?} for {key}"))
        })
        .transpose()
    }

    pub fn load_token(&self) -> Result<Option<String>> {
        Ok(self
            .get(TOKEN_KEY)?
            .filter(|token| !token.trim().is_empty()))
    }

    pub fn save_token(&self, token: &str) -> Result<()> {
        if token.trim().is_empty() {
            bail!("refusing to store an empty auth token");
        }
        self.put(TOKEN_KEY, token)
    }

    pub fn load_token_expiry(&self) -> Result<Option<i64>> {
        self.get(TOKEN_EXPIRES_AT_KEY)?
            .map(|raw| {
                raw.trim()
                    .parse::<i64>()
                    .with_context(|| format!("parse stored token expiry {raw:?}"))
            })
            .transpose()
    }

    /// `None` removes a previously stored expiry.
    pub fn save_token_expiry(&self, expires_at: Option<i64>) -> Result<()> {
        match expires_at {
            Some(expires_at) => self.put(TOKEN_EXPIRES_AT_KEY, &expires_at.to_string()),
            None => {
                self.remove(TOKEN_EXPIRES_AT_KEY)?;
                Ok(())
            }
        }
    }

    pub fn clear_token(&self) -> Result<bool> {
        self.remove(TOKEN_EXPIRES_AT_KEY)?;
        let removed = self.remove(TOKEN_KEY)?;
        if removed {
            tracing::info!("removed stored session token");
        }
        Ok(removed)
    }

    pub fn load_last_list_query(&self) -> Result<UrlQuery> {
        Ok(self
            .get(LAST_LIST_QUERY_KEY)?
            .map(|raw| UrlQuery::parse(&raw))
            .unwrap_or_default())
    }

    /// An empty query removes the stored one.
    pub fn save_last_list_query(&self, query: &UrlQuery) -> Result<()> {
        if query.is_empty() {
            self.remove(LAST_LIST_QUERY_KEY)?;
            return Ok(());
        }
        self.put(LAST_LIST_QUERY_KEY, &query.to_query_string())
    }
}

fn app_data_dir() -> Result<PathBuf> {
    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set {DB_PATH_ENV} to a writable database path")
    })?;
    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir)
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os(DB_PATH_ENV) {
        return Ok(PathBuf::from(override_path));
    }
    Ok(app_data_dir()?.join("agentdeck.db"))
}

pub fn default_log_path() -> Result<PathBuf> {
    Ok(app_data_dir()?.join("agentdeck.log"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
            params![table],
            |row| row.get(0),
        )
        .with_context(|| format!("look up table {table}"))?;
    Ok(count > 0)
}

fn validate_schema(conn: &Connection) -> Result<()> {
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info('kv')")
        .context("prepare kv column lookup")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("read kv columns")?
        .collect::<rusqlite::Result<BTreeSet<_>>>()
        .context("collect kv columns")?;

    for column in KV_COLUMNS {
        if !columns.contains(column) {
            bail!(
                "table `kv` is missing column `{column}`; remove the database file or point {DB_PATH_ENV} elsewhere"
            );
        }
    }
    Ok(())
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn now_rfc3339() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format current timestamp")
}

// The database holds a bearer token.
fn set_private_permissions(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        if !path.exists() {
            return Ok(());
        }
        let mut permissions = fs::metadata(path)
            .with_context(|| format!("stat {}", path.display()))?
            .permissions();
        permissions.set_mode(0o600);
        fs::set_permissions(path, permissions)
            .with_context(|| format!("set permissions on {}", path.display()))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
