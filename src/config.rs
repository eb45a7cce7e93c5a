//! Server configuration parsed from environment variables.

use std::path::PathBuf;

use crate::services::condition::AbsentContextPolicy;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_COMPONENT_ASSET_PREFIX: &str = "/assets/components";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub component_catalog: Option<PathBuf>,
    pub component_asset_prefix: String,
    pub absent_context: AbsentContextPolicy,
    pub seed_demo_pages: bool,
}

impl AppConfig {
    /// Build typed server config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `DATABASE_URL`: in-memory page storage when absent
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `COMPONENT_CATALOG`: YAML file of extra component definitions
    /// - `COMPONENT_ASSET_PREFIX`: default `/assets/components`
    /// - `CONDITION_ABSENT_CONTEXT`: `closed` (default) or `open`
    /// - `SEED_DEMO_PAGES`: default false
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for unrecognised enumerated values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for unrecognised enumerated values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let absent_context = match non_empty("CONDITION_ABSENT_CONTEXT") {
            None => AbsentContextPolicy::default(),
            Some(raw) => AbsentContextPolicy::from_str(raw.trim()).ok_or_else(|| {
                ConfigError::Parse(format!("unknown CONDITION_ABSENT_CONTEXT '{raw}' (expected 'closed' or 'open')"))
            })?,
        };
        let seed_demo_pages = match non_empty("SEED_DEMO_PAGES") {
            None => false,
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::Parse(format!("invalid SEED_DEMO_PAGES: {raw}")))?,
        };

        Ok(Self {
            port: env_parse(&lookup, "PORT", DEFAULT_PORT),
            database_url: non_empty("DATABASE_URL"),
            db_max_connections: env_parse(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            component_catalog: non_empty("COMPONENT_CATALOG").map(PathBuf::from),
            component_asset_prefix: non_empty("COMPONENT_ASSET_PREFIX")
                .unwrap_or_else(|| DEFAULT_COMPONENT_ASSET_PREFIX.to_owned()),
            absent_context,
            seed_demo_pages,
        })
    }
}

fn env_parse<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
