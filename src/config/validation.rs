use super::Config;
use crate::utils::error::{Result, SweepError};
use std::path::Path;

/// About 1000 years; anything longer cannot be subtracted from the current time.
pub const MAX_RETENTION_DAYS: u32 = 365_000;

pub fn validate_config(config: &Config) -> Result<()> {
    validate_repository(config.repository.as_deref())?;
    validate_remote(&config.remote)?;
    validate_durations(config)?;
    Ok(())
}

pub fn validate_repository(repository: Option<&Path>) -> Result<()> {
    let path = repository.ok_or_else(|| {
        SweepError::config("Repository location is not set (GIT_PATH or --repo)")
    })?;

    if !path.exists() {
        return Err(SweepError::config(format!(
            "Repository path does not exist: {}",
            path.display()
        )));
    }

    if !path.is_dir() {
        return Err(SweepError::config(format!(
            "Repository path is not a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

pub fn validate_remote(remote: &str) -> Result<()> {
    if remote.trim().is_empty() {
        return Err(SweepError::config("Remote name cannot be empty"));
    }
    if remote.contains(char::is_whitespace) {
        return Err(SweepError::config(format!(
            "Remote name '{}' contains whitespace",
            remote
        )));
    }
    Ok(())
}

pub fn validate_durations(config: &Config) -> Result<()> {
    if config.retention_days == 0 {
        return Err(SweepError::config("Retention age must be at least one day"));
    }
    if config.retention_days > MAX_RETENTION_DAYS {
        return Err(SweepError::config(format!(
            "Retention age of {} days exceeds the maximum of {} days",
            config.retention_days, MAX_RETENTION_DAYS
        )));
    }
    if config.confirmation_seconds == 0 {
        return Err(SweepError::config(
            "Confirmation window must be at least one second",
        ));
    }
    Ok(())
}
