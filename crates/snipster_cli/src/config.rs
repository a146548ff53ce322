//! Process configuration for the snipster binary.
//!
//! # Responsibility
//! - Resolve database location and logging settings before the core runs.
//! - Keep env/`.env` handling out of `snipster_core`.
//!
//! # Invariants
//! - Priority is CLI flag, then process env, then `.env` files.
//! - `.env` values never override variables already set in the process.

use anyhow::{bail, Context};
use std::path::{Path, PathBuf};

pub const HOME_ENV: &str = "SNIPSTER_HOME";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const LOG_LEVEL_ENV: &str = "SNIPSTER_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "SNIPSTER_LOG_DIR";

const HOME_DIR_NAME: &str = ".snipster";
const DATABASE_FILE_NAME: &str = "snipster.sqlite";
const SQLITE_SCHEME: &str = "sqlite:";

/// Where the durable backend keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    Memory,
    File(PathBuf),
}

impl DatabaseLocation {
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File(_) => "sqlite",
        }
    }
}

/// Fully resolved settings for one CLI invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub home: PathBuf,
    pub database: DatabaseLocation,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl AppConfig {
    /// Loads `.env` files, then resolves settings from the process env.
    ///
    /// # Side effects
    /// - Reads `./.env` and `$SNIPSTER_HOME/.env` into the process env.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let home = resolve_home(&env_lookup)?;
        dotenvy::from_path(home.join(".env")).ok();
        Self::resolve(env_lookup)
    }

    /// Resolves settings from an arbitrary variable source.
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let home = resolve_home(&lookup)?;
        let database = match lookup(DATABASE_URL_ENV) {
            Some(url) => parse_database_url(&url)?,
            None => DatabaseLocation::File(home.join(DATABASE_FILE_NAME)),
        };
        let log_level = lookup(LOG_LEVEL_ENV)
            .unwrap_or_else(|| snipster_core::default_log_level().to_string());
        let log_dir = lookup(LOG_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join("logs"));

        Ok(Self {
            home,
            database,
            log_level,
            log_dir,
        })
    }

    /// Applies `--memory` / `--database` flags on top of resolved settings.
    pub fn with_overrides(
        mut self,
        memory: bool,
        database_url: Option<&str>,
    ) -> anyhow::Result<Self> {
        if memory {
            self.database = DatabaseLocation::Memory;
        } else if let Some(url) = database_url {
            self.database = parse_database_url(url)?;
        }
        Ok(self)
    }
}

/// Parses `sqlite:` URLs in the forms accepted by common ORMs.
///
/// `sqlite://`, `sqlite::memory:` and `sqlite:///:memory:` select memory;
/// `sqlite:///abs/path` and `sqlite://rel/path` select a file.
pub fn parse_database_url(url: &str) -> anyhow::Result<DatabaseLocation> {
    let trimmed = url.trim();
    let Some(rest) = trimmed.strip_prefix(SQLITE_SCHEME) else {
        bail!("unsupported database url `{trimmed}`; only sqlite: urls are supported");
    };
    let location = rest.strip_prefix("//").unwrap_or(rest);

    match location {
        "" | ":memory:" | "/:memory:" => Ok(DatabaseLocation::Memory),
        path => Ok(DatabaseLocation::File(PathBuf::from(path))),
    }
}

fn resolve_home(lookup: &impl Fn(&str) -> Option<String>) -> anyhow::Result<PathBuf> {
    if let Some(home) = lookup(HOME_ENV).filter(|value| !value.trim().is_empty()) {
        return Ok(PathBuf::from(home));
    }
    let user_home = dirs::home_dir().context("failed to find home directory")?;
    Ok(default_home(&user_home))
}

fn default_home(user_home: &Path) -> PathBuf {
    user_home.join(HOME_DIR_NAME)
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
