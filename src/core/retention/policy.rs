use crate::config::Config;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeSet;
use std::fmt;

/// Which branches a run may consider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    All,
    MergedOnly,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::All => write!(f, "all eligible branches"),
            Scope::MergedOnly => write!(f, "merged branches only"),
        }
    }
}

/// Classification parameters for one run. The evaluation instant is part of
/// the policy so that classifying the same records twice gives the same
/// answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub target_authors: BTreeSet<String>,
    pub exclude_authors: BTreeSet<String>,
    pub protected_names: Vec<String>,
    pub cutoff_age: Duration,
    pub require_merged: bool,
    pub evaluated_at: DateTime<Utc>,
}

impl RetentionPolicy {
    pub fn new(cutoff_age: Duration, evaluated_at: DateTime<Utc>) -> Self {
        Self {
            target_authors: BTreeSet::new(),
            exclude_authors: BTreeSet::new(),
            protected_names: Vec::new(),
            cutoff_age,
            require_merged: false,
            evaluated_at,
        }
    }

    pub fn from_config(config: &Config, scope: Scope, evaluated_at: DateTime<Utc>) -> Self {
        Self::new(config.retention_age(), evaluated_at)
            .with_target_authors(config.target_authors.iter().cloned())
            .with_exclude_authors(config.exclude_authors.iter().cloned())
            .with_protected_names(config.protected_branches.iter().cloned())
            .with_require_merged(scope == Scope::MergedOnly)
    }

    pub fn with_target_authors<I: IntoIterator<Item = String>>(mut self, authors: I) -> Self {
        self.target_authors = authors.into_iter().collect();
        self
    }

    pub fn with_exclude_authors<I: IntoIterator<Item = String>>(mut self, authors: I) -> Self {
        self.exclude_authors = authors.into_iter().collect();
        self
    }

    pub fn with_protected_names<I: IntoIterator<Item = String>>(mut self, names: I) -> Self {
        self.protected_names = names.into_iter().collect();
        self
    }

    pub fn with_require_merged(mut self, require_merged: bool) -> Self {
        self.require_merged = require_merged;
        self
    }

    /// Commits strictly before this instant are stale. An age reaching past
    /// the earliest representable instant leaves nothing stale.
    pub fn cutoff(&self) -> DateTime<Utc> {
        self.evaluated_at
            .checked_sub_signed(self.cutoff_age)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Returns the protected entry matching `name`, either exactly or as a
    /// trailing path segment (`main` protects `origin/main`).
    pub fn protection_for(&self, name: &str) -> Option<&str> {
        self.protected_names
            .iter()
            .find(|entry| {
                let entry = entry.trim_matches('/');
                !entry.is_empty()
                    && (name == entry
                        || name
                            .strip_suffix(entry)
                            .is_some_and(|head| head.ends_with('/')))
            })
            .map(String::as_str)
    }

    /// Exclusions, when any are configured, replace the target list entirely.
    pub fn uses_exclusions(&self) -> bool {
        !self.exclude_authors.is_empty()
    }

    pub fn author_eligible(&self, author: &str) -> bool {
        if self.uses_exclusions() {
            !self.exclude_authors.contains(author)
        } else {
            self.target_authors.contains(author)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RetentionPolicy {
        RetentionPolicy::new(Duration::days(30), Utc::now())
    }

    #[test]
    fn test_protection_exact_and_segment_suffix() {
        let policy = policy().with_protected_names(["main".to_string(), "origin/dev".to_string()]);

        assert_eq!(policy.protection_for("main"), Some("main"));
        assert_eq!(policy.protection_for("origin/main"), Some("main"));
        assert_eq!(policy.protection_for("origin/dev"), Some("origin/dev"));
        assert_eq!(policy.protection_for("fork/origin/dev"), Some("origin/dev"));

        assert_eq!(policy.protection_for("origin/domain"), None);
        assert_eq!(policy.protection_for("origin/main-fix"), None);
        assert_eq!(policy.protection_for("origin/development"), None);
    }

    #[test]
    fn test_empty_protected_entry_matches_nothing() {
        let policy = policy().with_protected_names(["".to_string(), "/".to_string()]);
        assert_eq!(policy.protection_for("origin/feature"), None);
    }

    #[test]
    fn test_exclusions_take_precedence_over_targets() {
        let policy = policy()
            .with_target_authors(["alice".to_string()])
            .with_exclude_authors(["alice".to_string(), "bot".to_string()]);

        assert!(!policy.author_eligible("alice"));
        assert!(!policy.author_eligible("bot"));
        assert!(policy.author_eligible("carol"));
    }

    #[test]
    fn test_targets_only() {
        let policy = policy().with_target_authors(["alice".to_string()]);
        assert!(policy.author_eligible("alice"));
        assert!(!policy.author_eligible("bob"));

        let nobody = RetentionPolicy::new(Duration::days(30), Utc::now());
        assert!(!nobody.author_eligible("alice"));
    }

    #[test]
    fn test_cutoff() {
        let now = Utc::now();
        let policy = RetentionPolicy::new(Duration::days(30), now);
        assert_eq!(policy.cutoff(), now - Duration::days(30));
    }

    #[test]
    fn test_cutoff_saturates_for_huge_retention() {
        let mut config = crate::config::defaults::default_config();
        config.retention_days = 100_000_000;
        let policy = RetentionPolicy::from_config(&config, Scope::All, Utc::now());

        assert_eq!(policy.cutoff(), DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn test_from_config_scope() {
        let mut config = crate::config::defaults::default_config();
        config.target_authors = vec!["alice".to_string()];
        config.retention_days = 10;
        let now = Utc::now();

        let all = RetentionPolicy::from_config(&config, Scope::All, now);
        assert!(!all.require_merged);
        assert_eq!(all.cutoff_age, Duration::days(10));
        assert!(all.target_authors.contains("alice"));
        assert_eq!(all.evaluated_at, now);

        let merged = RetentionPolicy::from_config(&config, Scope::MergedOnly, now);
        assert!(merged.require_merged);
    }
}
