use super::record::{BranchRecord, Collection, UnclassifiableBranch};
use crate::core::git::{RemoteRef, VersionControlGateway};
use crate::utils::error::{Result, SweepError};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

/// Builds the branch view a classification pass works on.
///
/// Round trips: one listing call for every branch's tip metadata, plus one
/// ancestry query per configured base ref.
pub struct MetadataCollector<'a, G: VersionControlGateway + ?Sized> {
    gateway: &'a G,
    base_refs: Vec<String>,
}

impl<'a, G: VersionControlGateway + ?Sized> MetadataCollector<'a, G> {
    pub fn new(gateway: &'a G, base_refs: &[String]) -> Self {
        Self {
            gateway,
            base_refs: base_refs.to_vec(),
        }
    }

    pub async fn collect(&self) -> Result<Collection> {
        let listing = self
            .gateway
            .list_remote_branches()
            .await
            .map_err(|e| SweepError::collection(e.to_string()))?;

        info!(
            "listed {} refs on remote '{}'",
            listing.len(),
            self.gateway.remote()
        );

        let merged = if listing.is_empty() {
            HashMap::new()
        } else {
            self.merge_ancestry().await
        };

        let mut collection = Collection::default();
        for entry in listing {
            if let Some(target) = &entry.symbolic_target {
                debug!("skipping symbolic ref {} -> {}", entry.reference, target);
                continue;
            }

            match entry.metadata {
                Ok(metadata) => {
                    let merged_into = merged.get(&entry.reference).cloned().unwrap_or_default();
                    collection.branches.push(BranchRecord {
                        reference: entry.reference,
                        tip: metadata.tip,
                        last_commit_time: metadata.time,
                        last_commit_author: metadata.author,
                        merged_into,
                    });
                }
                Err(error) => {
                    warn!("cannot read metadata for {}: {}", entry.reference, error);
                    collection.unclassifiable.push(UnclassifiableBranch {
                        reference: entry.reference,
                        error,
                    });
                }
            }
        }

        Ok(collection)
    }

    /// Maps each remote branch to the base refs it is merged into. A base ref
    /// that cannot be queried contributes nothing.
    async fn merge_ancestry(&self) -> HashMap<RemoteRef, BTreeSet<String>> {
        let mut merged: HashMap<RemoteRef, BTreeSet<String>> = HashMap::new();

        for base in &self.base_refs {
            match self.gateway.merged_into(base).await {
                Ok(references) => {
                    debug!("{} branches merged into {}", references.len(), base);
                    for reference in references {
                        if reference.branch == *base {
                            continue;
                        }
                        merged.entry(reference).or_default().insert(base.clone());
                    }
                }
                Err(e) => {
                    warn!("treating base ref '{}' as empty: {}", base, e);
                }
            }
        }

        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fake_gateway::{FakeGateway, GatewayCall};

    fn bases(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn test_collect_skips_symbolic_refs() {
        let gateway = FakeGateway::new()
            .with_symbolic("HEAD", "refs/remotes/origin/main")
            .with_branch("main", "alice", 1)
            .with_branch("feat-x", "alice", 45);

        let collection = MetadataCollector::new(&gateway, &bases(&["main"]))
            .collect()
            .await
            .unwrap();

        let names: Vec<String> = collection.branches.iter().map(|b| b.name()).collect();
        assert_eq!(names, vec!["origin/main", "origin/feat-x"]);
        assert_eq!(collection.branches[1].tip, "tip-feat-x");
        assert!(collection.unclassifiable.is_empty());
    }

    #[tokio::test]
    async fn test_listing_failure_is_fatal() {
        let gateway = FakeGateway::new().with_failing_listing();
        let err = MetadataCollector::new(&gateway, &bases(&["main"]))
            .collect()
            .await
            .unwrap_err();

        assert!(matches!(err, SweepError::Collection { .. }));
        assert_eq!(gateway.calls(), vec![GatewayCall::List]);
    }

    #[tokio::test]
    async fn test_unreadable_branch_is_excluded_not_fatal() {
        let gateway = FakeGateway::new()
            .with_branch("feat-x", "alice", 45)
            .with_unreadable("broken", "unreadable commit timestamp ''");

        let collection = MetadataCollector::new(&gateway, &bases(&[]))
            .collect()
            .await
            .unwrap();

        assert_eq!(collection.branches.len(), 1);
        assert_eq!(collection.unclassifiable.len(), 1);
        assert_eq!(collection.unclassifiable[0].reference.branch, "broken");
    }

    #[tokio::test]
    async fn test_merge_sets_are_unioned_across_bases() {
        let gateway = FakeGateway::new()
            .with_branch("main", "alice", 1)
            .with_branch("master", "alice", 1)
            .with_branch("both", "alice", 60)
            .with_branch("only-main", "alice", 60)
            .with_branch("neither", "alice", 60)
            .with_merged("main", &["main", "both", "only-main"])
            .with_merged("master", &["master", "both"]);

        let collection = MetadataCollector::new(&gateway, &bases(&["main", "master"]))
            .collect()
            .await
            .unwrap();

        let find = |name: &str| {
            collection
                .branches
                .iter()
                .find(|b| b.reference.branch == name)
                .unwrap()
                .merged_into
                .iter()
                .cloned()
                .collect::<Vec<_>>()
        };

        assert_eq!(find("both"), vec!["main", "master"]);
        assert_eq!(find("only-main"), vec!["main"]);
        assert!(find("neither").is_empty());
        assert!(find("main").is_empty());
    }

    #[tokio::test]
    async fn test_failing_base_ref_contributes_nothing() {
        let gateway = FakeGateway::new()
            .with_branch("topic", "alice", 60)
            .with_failing_base("trunk")
            .with_merged("main", &["topic"]);

        let collection = MetadataCollector::new(&gateway, &bases(&["trunk", "main"]))
            .collect()
            .await
            .unwrap();

        let topic = &collection.branches[0];
        assert_eq!(topic.merged_into.iter().collect::<Vec<_>>(), vec!["main"]);
    }

    #[tokio::test]
    async fn test_round_trips_do_not_scale_with_branch_count() {
        let mut gateway = FakeGateway::new();
        for i in 0..50 {
            gateway = gateway.with_branch(&format!("topic-{}", i), "alice", 60);
        }

        MetadataCollector::new(&gateway, &bases(&["main", "master"]))
            .collect()
            .await
            .unwrap();

        assert_eq!(
            gateway.calls(),
            vec![
                GatewayCall::List,
                GatewayCall::Merged("main".to_string()),
                GatewayCall::Merged("master".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_listing_skips_ancestry_queries() {
        let gateway = FakeGateway::new();
        let collection = MetadataCollector::new(&gateway, &bases(&["main"]))
            .collect()
            .await
            .unwrap();

        assert!(collection.branches.is_empty());
        assert_eq!(gateway.calls(), vec![GatewayCall::List]);
    }
}
