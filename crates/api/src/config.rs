//! Process configuration, read from `ISC_*` environment variables.

use std::env;
use std::fmt;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use dotenvy::dotenv;

const PREFIX: &str = "ISC_";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub version: String,
    pub environment: String,
    /// Per-request deadline handed to the engine.
    pub backend_timeout: Duration,
    /// `host:port`; a bare `:port` has already been widened to `0.0.0.0:port`.
    pub listen_address: String,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Memory,
    Postgres(PostgresConfig),
}

#[derive(Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
}

impl fmt::Debug for PostgresConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("dbname", &self.dbname)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup (unprefixed keys are prefixed here).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(&format!("{PREFIX}{key}")).filter(|v| !v.trim().is_empty());
        let required = |key: &str| get(key).with_context(|| format!("{PREFIX}{key} must be set"));

        let backend_timeout = get("BACKENDTIMEOUT").unwrap_or_else(|| "25s".to_string());
        let backend_timeout = parse_duration(&backend_timeout)
            .with_context(|| format!("{PREFIX}BACKENDTIMEOUT is not a valid duration"))?;

        let listen_address = get("LISTENADDRESS").unwrap_or_else(|| ":8080".to_string());

        let store = match required("DBDRIVER")?.as_str() {
            "memory" => StoreConfig::Memory,
            "postgres" => StoreConfig::Postgres(PostgresConfig {
                host: required("DBHOST")?,
                port: required("DBPORT")?
                    .parse()
                    .with_context(|| format!("{PREFIX}DBPORT must be a valid port number"))?,
                user: required("DBUSER")?,
                password: required("DBPASSWORD")?,
                dbname: required("DBDBNAME")?,
            }),
            other => bail!("{PREFIX}DBDRIVER must be 'postgres' or 'memory', got '{other}'"),
        };

        Ok(Self {
            log_level: get("LOGLEVEL").unwrap_or_else(|| "info".to_string()),
            version: required("VERSION")?,
            environment: required("ENVIRONMENT")?,
            backend_timeout,
            listen_address: normalize_listen_address(&listen_address),
            store,
        })
    }
}

/// `:8080` means every interface.
fn normalize_listen_address(raw: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with(':') {
        format!("0.0.0.0{raw}")
    } else {
        raw.to_string()
    }
}

/// Parse durations like `25s`, `500ms`, `1m30s` or `1.5h`.
pub fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    if raw.is_empty() {
        bail!("empty duration");
    }

    let mut total = Duration::ZERO;
    let mut rest = raw;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| anyhow!("missing unit in duration '{raw}'"))?;
        if number_len == 0 {
            bail!("expected a number in duration '{raw}'");
        }
        let value: f64 = rest[..number_len]
            .parse()
            .with_context(|| format!("invalid number in duration '{raw}'"))?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let seconds_per_unit = match &rest[..unit_len] {
            "ms" => 0.001,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            unit => bail!("unknown unit '{unit}' in duration '{raw}'"),
        };
        rest = &rest[unit_len..];

        total += Duration::try_from_secs_f64(value * seconds_per_unit)
            .with_context(|| format!("duration '{raw}' is out of range"))?;
    }
    Ok(total)
}
