use crate::utils::error::{Result, SweepError};
use crate::utils::split_list;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub mod defaults;
pub mod validation;

pub const ENV_TARGET_AUTHORS: &str = "TARGET_AUTHORS";
pub const ENV_TARGET_USER: &str = "TARGET_USER";
pub const ENV_EXCLUDE_AUTHORS: &str = "EXCLUDE_AUTHORS";
pub const ENV_GIT_PATH: &str = "GIT_PATH";
pub const ENV_PROTECTED_BRANCHES: &str = "PROTECTED_BRANCHES";
pub const ENV_BASE_BRANCHES: &str = "BASE_BRANCHES";
pub const ENV_RETENTION_DAYS: &str = "RETENTION_DAYS";
pub const ENV_GIT_REMOTE: &str = "GIT_REMOTE";
pub const ENV_CONFIRMATION_SECONDS: &str = "CONFIRMATION_SECONDS";

/// Settings read once at startup. Nothing below the CLI layer reads the
/// environment; the retention policy is built from this value.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub repository: Option<PathBuf>,
    pub remote: String,
    pub target_authors: Vec<String>,
    pub exclude_authors: Vec<String>,
    pub protected_branches: Vec<String>,
    pub base_branches: Vec<String>,
    pub retention_days: u32,
    pub confirmation_seconds: u64,
}

impl Config {
    /// Loads `.env` (if present) and then reads the process environment.
    pub fn from_env() -> Result<Self> {
        apply_dotenv(dotenvy::dotenv())?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = defaults::default_config();

        if let Some(path) = non_empty(lookup(ENV_GIT_PATH)) {
            config.repository = Some(PathBuf::from(path));
        }

        if let Some(remote) = non_empty(lookup(ENV_GIT_REMOTE)) {
            config.remote = remote.trim().to_string();
        }

        if let Some(authors) = non_empty(lookup(ENV_TARGET_AUTHORS))
            .or_else(|| non_empty(lookup(ENV_TARGET_USER)))
        {
            config.target_authors = split_list(&authors);
        }

        if let Some(authors) = non_empty(lookup(ENV_EXCLUDE_AUTHORS)) {
            config.exclude_authors = split_list(&authors);
        }

        if let Some(names) = non_empty(lookup(ENV_PROTECTED_BRANCHES)) {
            config.protected_branches = split_list(&names);
        }

        if let Some(names) = non_empty(lookup(ENV_BASE_BRANCHES)) {
            config.base_branches = split_list(&names);
        }

        if let Some(days) = non_empty(lookup(ENV_RETENTION_DAYS)) {
            config.retention_days = parse_number(ENV_RETENTION_DAYS, &days)?;
        }

        if let Some(seconds) = non_empty(lookup(ENV_CONFIRMATION_SECONDS)) {
            config.confirmation_seconds = parse_number(ENV_CONFIRMATION_SECONDS, &seconds)?;
        }

        Ok(config)
    }

    pub fn with_repository(mut self, path: impl Into<PathBuf>) -> Self {
        self.repository = Some(path.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    pub fn repository_path(&self) -> Result<&Path> {
        self.repository.as_deref().ok_or_else(|| {
            SweepError::config("Repository location is not set (GIT_PATH or --repo)")
        })
    }

    pub fn retention_age(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.retention_days))
    }

    pub fn confirmation_window(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.confirmation_seconds)
    }
}

/// A missing `.env` is fine; an unreadable or malformed one is not.
fn apply_dotenv<T>(loaded: std::result::Result<T, dotenvy::Error>) -> Result<()> {
    match loaded {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(dotenvy::Error::Io(e)) => Err(e.into()),
        Err(e) => Err(SweepError::config(format!("Invalid .env file: {}", e))),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        SweepError::config(format!("{} must be a positive whole number, got '{}'", key, raw))
    })
}
