use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub mod reference;
pub mod repository;

pub use reference::RemoteRef;
pub use repository::GitGateway;

/// Tip-commit facts for one branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMetadata {
    /// Object id of the tip commit.
    pub tip: String,
    pub time: DateTime<Utc>,
    pub author: String,
}

/// One entry of the batched remote listing. Metadata is per entry so a single
/// unreadable tip does not invalidate the whole listing.
#[derive(Debug, Clone)]
pub struct RemoteBranchListing {
    pub reference: RemoteRef,
    /// Target of a symbolic ref such as `origin/HEAD`.
    pub symbolic_target: Option<String>,
    pub metadata: std::result::Result<CommitMetadata, String>,
}

impl RemoteBranchListing {
    pub fn is_symbolic(&self) -> bool {
        self.symbolic_target.is_some()
    }
}

/// A local branch and the commit it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalBranch {
    pub name: String,
    pub tip: String,
}

/// Access to the version-control system: listing, ancestry and deletion.
///
/// Callers await each operation before issuing the next one; implementations
/// do not need to handle concurrent calls against the same remote.
#[async_trait]
pub trait VersionControlGateway: Send + Sync {
    /// Name of the remote this gateway sweeps.
    fn remote(&self) -> &str;

    /// Updates remote-tracking refs so that listings reflect the remote.
    async fn refresh(&self) -> Result<()>;

    /// All remote branches with tip metadata in one round trip, newest first.
    async fn list_remote_branches(&self) -> Result<Vec<RemoteBranchListing>>;

    /// Remote branches whose tip is an ancestor of `base` on the remote.
    async fn merged_into(&self, base: &str) -> Result<Vec<RemoteRef>>;

    /// Deletes `reference` on the remote only while it still points at
    /// `expected_tip`. A branch that moved since collection is an error.
    async fn delete_remote_branch(&self, reference: &RemoteRef, expected_tip: &str) -> Result<()>;

    async fn local_branches(&self) -> Result<Vec<LocalBranch>>;

    async fn delete_local_branch(&self, name: &str) -> Result<()>;
}
