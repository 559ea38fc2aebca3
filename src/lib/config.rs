use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

use crate::storage::sqlite::{DB_FILE_NAME, SqliteConfig};

pub const DEFAULT_DB_DIR: &str = "/data";
pub const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_dir: PathBuf,
    pub port: u16,
    pub busy_timeout: Duration,
    pub max_connections: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_dir: PathBuf::from(DEFAULT_DB_DIR),
            port: DEFAULT_PORT,
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl Config {
    /// Reads `DB_DIR`, `PORT`, `DB_BUSY_TIMEOUT_MS` and `DB_MAX_CONNECTIONS`
    /// from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();
        let db_dir = lookup("DB_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.db_dir);
        let port = parse_var(&lookup, "PORT")?.unwrap_or(defaults.port);
        let busy_timeout = parse_var::<u64>(&lookup, "DB_BUSY_TIMEOUT_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.busy_timeout);
        let max_connections =
            parse_var(&lookup, "DB_MAX_CONNECTIONS")?.unwrap_or(defaults.max_connections);
        if max_connections == 0 {
            anyhow::bail!("DB_MAX_CONNECTIONS must be at least 1");
        }
        Ok(Self {
            db_dir,
            port,
            busy_timeout,
            max_connections,
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.db_dir.join(DB_FILE_NAME)
    }

    pub fn sqlite(&self) -> SqliteConfig {
        SqliteConfig {
            busy_timeout: self.busy_timeout,
            max_connections: self.max_connections,
        }
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        _ => Ok(None),
    }
}
