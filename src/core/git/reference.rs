use crate::utils::error::{Result, SweepError};
use serde::{Deserialize, Serialize};
use std::fmt;

const REMOTES_NAMESPACE: &str = "refs/remotes/";

/// A branch on a named remote, kept as separate parts so deletion never has
/// to strip prefixes back off a display string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RemoteRef {
    pub remote: String,
    pub branch: String,
}

impl RemoteRef {
    pub fn new(remote: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            remote: remote.into(),
            branch: branch.into(),
        }
    }

    /// Parses `refs/remotes/<remote>/<branch>` for a known remote. Branch
    /// names may themselves contain `/`.
    pub fn from_full_name(refname: &str, remote: &str) -> Result<Self> {
        let short = refname.strip_prefix(REMOTES_NAMESPACE).ok_or_else(|| {
            SweepError::invalid_reference(refname, "not under refs/remotes/")
        })?;
        Self::from_short_name(short, remote)
    }

    /// Parses `<remote>/<branch>` for a known remote.
    pub fn from_short_name(name: &str, remote: &str) -> Result<Self> {
        let branch = name
            .strip_prefix(remote)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| {
                SweepError::invalid_reference(name, format!("does not belong to remote '{remote}'"))
            })?;

        if branch.is_empty() {
            return Err(SweepError::invalid_reference(name, "empty branch name"));
        }

        Ok(Self::new(remote, branch))
    }

    pub fn full_name(&self) -> String {
        format!("{}{}/{}", REMOTES_NAMESPACE, self.remote, self.branch)
    }
}

impl fmt::Display for RemoteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.remote, self.branch)
    }
}
