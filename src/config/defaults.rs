use super::Config;

pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_RETENTION_DAYS: u32 = 50;
pub const DEFAULT_CONFIRMATION_SECONDS: u64 = 11;

pub const DEFAULT_PROTECTED_BRANCHES: &[&str] = &[
    "main",
    "dev",
    "master",
    "version",
    "origin/main",
    "origin/master",
    "origin/dev",
];

pub const DEFAULT_BASE_BRANCHES: &[&str] = &["main", "master"];

pub fn default_config() -> Config {
    Config {
        repository: None,
        remote: DEFAULT_REMOTE.to_string(),
        target_authors: Vec::new(),
        exclude_authors: Vec::new(),
        protected_branches: to_strings(DEFAULT_PROTECTED_BRANCHES),
        base_branches: to_strings(DEFAULT_BASE_BRANCHES),
        retention_days: DEFAULT_RETENTION_DAYS,
        confirmation_seconds: DEFAULT_CONFIRMATION_SECONDS,
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
