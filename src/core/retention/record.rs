use crate::core::git::RemoteRef;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

/// One remote branch as seen at collection time. Records are not updated
/// after collection; deletion is pinned to `tip`, so a branch that moved
/// since then is refused rather than deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchRecord {
    pub reference: RemoteRef,
    /// Commit id the branch pointed at when collected.
    pub tip: String,
    pub last_commit_time: DateTime<Utc>,
    pub last_commit_author: String,
    /// Base refs whose history already contains this branch's tip.
    pub merged_into: BTreeSet<String>,
}

impl BranchRecord {
    pub fn name(&self) -> String {
        self.reference.to_string()
    }

    pub fn is_merged(&self) -> bool {
        !self.merged_into.is_empty()
    }
}

/// A branch whose metadata could not be read. It is reported but never
/// classified or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnclassifiableBranch {
    pub reference: RemoteRef,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Collection {
    pub branches: Vec<BranchRecord>,
    pub unclassifiable: Vec<UnclassifiableBranch>,
}
