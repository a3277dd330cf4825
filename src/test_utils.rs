pub mod git_fixture {
    use chrono::Utc;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::process::Command;
    use tempfile::TempDir;

    /// A bare "remote" repository plus a working clone wired to it as `origin`.
    pub struct RemoteFixture {
        temp_dir: TempDir,
        remote: PathBuf,
        work: PathBuf,
    }

    impl RemoteFixture {
        pub fn new() -> Self {
            let temp_dir = TempDir::new().expect("Failed to create temp dir");
            let remote = temp_dir.path().join("remote.git");
            let work = temp_dir.path().join("work");
            fs::create_dir_all(&work).expect("Failed to create work dir");

            run_git(
                temp_dir.path(),
                &["init", "--bare", "--initial-branch=main", "remote.git"],
                &[],
            );
            run_git(&work, &["init", "--initial-branch=main"], &[]);
            run_git(&work, &["config", "user.name", "Test User"], &[]);
            run_git(&work, &["config", "user.email", "test@example.com"], &[]);

            fs::write(work.join("README.md"), "# Test Repository").expect("Failed to write README");
            run_git(&work, &["add", "README.md"], &[]);
            run_git(&work, &["commit", "-m", "Initial commit"], &[]);

            let remote_str = remote.to_string_lossy().to_string();
            run_git(&work, &["remote", "add", "origin", &remote_str], &[]);
            run_git(&work, &["push", "-u", "origin", "main"], &[]);

            Self {
                temp_dir,
                remote,
                work,
            }
        }

        pub fn work_path(&self) -> &Path {
            &self.work
        }

        /// Commit id the bare remote currently holds for `name`.
        pub fn remote_tip(&self, name: &str) -> String {
            let refname = format!("refs/heads/{}", name);
            let output = Command::new("git")
                .current_dir(&self.work)
                .args(["ls-remote", &self.remote.to_string_lossy(), &refname])
                .output()
                .expect("Failed to execute git ls-remote");
            String::from_utf8_lossy(&output.stdout)
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string()
        }

        /// Pushes a new commit on `name` from a separate clone, leaving the
        /// working clone's remote-tracking ref stale.
        pub fn push_from_other_clone(&self, name: &str, author: &str) {
            let other = self.temp_dir.path().join(format!("other-{}", name.replace('/', "_")));
            let remote_str = self.remote.to_string_lossy().to_string();
            let other_str = other.to_string_lossy().to_string();
            run_git(self.temp_dir.path(), &["clone", &remote_str, &other_str], &[]);
            run_git(&other, &["checkout", name], &[]);

            let file = format!("{}-followup.txt", name.replace('/', "_"));
            fs::write(other.join(&file), "more work").expect("Failed to write followup file");
            run_git(&other, &["add", &file], &[]);
            let email = format!("{}@example.com", author);
            run_git(
                &other,
                &["commit", "-m", &format!("More work on {}", name)],
                &[
                    ("GIT_AUTHOR_NAME", author),
                    ("GIT_AUTHOR_EMAIL", &email),
                    ("GIT_COMMITTER_NAME", author),
                    ("GIT_COMMITTER_EMAIL", &email),
                ],
            );
            run_git(&other, &["push", "origin", name], &[]);
        }

        /// Creates `name` off main with one commit by `author` dated
        /// `days_ago`, pushes it, and leaves main checked out.
        pub fn push_branch(&self, name: &str, author: &str, days_ago: i64) {
            let date = (Utc::now() - chrono::Duration::days(days_ago)).timestamp();
            let date = format!("{} +0000", date);
            let email = format!("{}@example.com", author);

            run_git(&self.work, &["checkout", "-b", name, "main"], &[]);
            let file = format!("{}.txt", name.replace('/', "_"));
            fs::write(self.work.join(&file), name).expect("Failed to write branch file");
            run_git(&self.work, &["add", &file], &[]);
            run_git(
                &self.work,
                &["commit", "-m", &format!("Work on {}", name)],
                &[
                    ("GIT_AUTHOR_NAME", author),
                    ("GIT_AUTHOR_EMAIL", &email),
                    ("GIT_AUTHOR_DATE", &date),
                    ("GIT_COMMITTER_DATE", &date),
                ],
            );
            run_git(&self.work, &["push", "origin", name], &[]);
            run_git(&self.work, &["checkout", "main"], &[]);
        }

        pub fn merge_into_main(&self, name: &str) {
            run_git(&self.work, &["checkout", "main"], &[]);
            run_git(
                &self.work,
                &["merge", "--no-ff", "-m", &format!("Merge {}", name), name],
                &[],
            );
            run_git(&self.work, &["push", "origin", "main"], &[]);
        }

        pub fn set_remote_head(&self) {
            run_git(&self.work, &["remote", "set-head", "origin", "main"], &[]);
        }
    }

    impl Default for RemoteFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    fn run_git(dir: &Path, args: &[&str], envs: &[(&str, &str)]) {
        let mut command = Command::new("git");
        command.current_dir(dir).args(args);
        for (key, value) in envs {
            command.env(key, value);
        }

        let output = command.output().expect("Failed to execute git");
        assert!(
            output.status.success(),
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

pub mod fake_gateway {
    use crate::core::git::{
        CommitMetadata, LocalBranch, RemoteBranchListing, RemoteRef, VersionControlGateway,
    };
    use crate::utils::error::{Result, SweepError};
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// Tip id the fake reports for `branch`.
    pub fn tip_of(branch: &str) -> String {
        format!("tip-{}", branch)
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum GatewayCall {
        Refresh,
        List,
        Merged(String),
        DeleteRemote(RemoteRef),
        LocalBranches,
        DeleteLocal(String),
    }

    /// In-memory gateway that records every call it receives.
    pub struct FakeGateway {
        remote: String,
        listing: Vec<RemoteBranchListing>,
        merged: HashMap<String, Vec<RemoteRef>>,
        failing_bases: HashSet<String>,
        listing_fails: bool,
        delete_failures: HashSet<String>,
        moved: HashSet<String>,
        local: Mutex<Vec<LocalBranch>>,
        calls: Mutex<Vec<GatewayCall>>,
    }

    impl FakeGateway {
        pub fn new() -> Self {
            Self {
                remote: "origin".to_string(),
                listing: Vec::new(),
                merged: HashMap::new(),
                failing_bases: HashSet::new(),
                listing_fails: false,
                delete_failures: HashSet::new(),
                moved: HashSet::new(),
                local: Mutex::new(Vec::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn with_branch(self, branch: &str, author: &str, days_ago: i64) -> Self {
            let time = Utc::now() - Duration::days(days_ago);
            self.with_branch_at(branch, author, time)
        }

        pub fn with_branch_at(mut self, branch: &str, author: &str, time: DateTime<Utc>) -> Self {
            self.listing.push(RemoteBranchListing {
                reference: RemoteRef::new(self.remote.clone(), branch),
                symbolic_target: None,
                metadata: Ok(CommitMetadata {
                    tip: tip_of(branch),
                    time,
                    author: author.to_string(),
                }),
            });
            self
        }

        pub fn with_symbolic(mut self, branch: &str, target: &str) -> Self {
            self.listing.push(RemoteBranchListing {
                reference: RemoteRef::new(self.remote.clone(), branch),
                symbolic_target: Some(target.to_string()),
                metadata: Ok(CommitMetadata {
                    tip: tip_of(target),
                    time: Utc::now(),
                    author: "Test User".to_string(),
                }),
            });
            self
        }

        pub fn with_unreadable(mut self, branch: &str, error: &str) -> Self {
            self.listing.push(RemoteBranchListing {
                reference: RemoteRef::new(self.remote.clone(), branch),
                symbolic_target: None,
                metadata: Err(error.to_string()),
            });
            self
        }

        pub fn with_merged(mut self, base: &str, branches: &[&str]) -> Self {
            let refs = branches
                .iter()
                .map(|b| RemoteRef::new(self.remote.clone(), *b))
                .collect();
            self.merged.insert(base.to_string(), refs);
            self
        }

        pub fn with_failing_base(mut self, base: &str) -> Self {
            self.failing_bases.insert(base.to_string());
            self
        }

        pub fn with_failing_listing(mut self) -> Self {
            self.listing_fails = true;
            self
        }

        pub fn with_delete_failure(mut self, branch: &str) -> Self {
            self.delete_failures.insert(branch.to_string());
            self
        }

        /// The remote branch gains commits after listing, so a deletion
        /// pinned to the listed tip is refused.
        pub fn with_moved_tip(mut self, branch: &str) -> Self {
            self.moved.insert(branch.to_string());
            self
        }

        /// A local branch at the same commit as the remote branch of that name.
        pub fn with_local_branch(self, name: &str) -> Self {
            self.with_local_branch_at(name, &tip_of(name))
        }

        pub fn with_local_branch_at(self, name: &str, tip: &str) -> Self {
            self.local
                .lock()
                .expect("fake gateway lock poisoned")
                .push(LocalBranch {
                    name: name.to_string(),
                    tip: tip.to_string(),
                });
            self
        }

        pub fn calls(&self) -> Vec<GatewayCall> {
            self.calls.lock().expect("fake gateway lock poisoned").clone()
        }

        pub fn remote_deletions(&self) -> Vec<RemoteRef> {
            self.calls()
                .into_iter()
                .filter_map(|call| match call {
                    GatewayCall::DeleteRemote(r) => Some(r),
                    _ => None,
                })
                .collect()
        }

        pub fn local_deletions(&self) -> Vec<String> {
            self.calls()
                .into_iter()
                .filter_map(|call| match call {
                    GatewayCall::DeleteLocal(name) => Some(name),
                    _ => None,
                })
                .collect()
        }

        fn record(&self, call: GatewayCall) {
            self.calls
                .lock()
                .expect("fake gateway lock poisoned")
                .push(call);
        }
    }

    impl Default for FakeGateway {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl VersionControlGateway for FakeGateway {
        fn remote(&self) -> &str {
            &self.remote
        }

        async fn refresh(&self) -> Result<()> {
            self.record(GatewayCall::Refresh);
            Ok(())
        }

        async fn list_remote_branches(&self) -> Result<Vec<RemoteBranchListing>> {
            self.record(GatewayCall::List);
            if self.listing_fails {
                return Err(SweepError::git_operation("connection reset by peer"));
            }
            Ok(self.listing.clone())
        }

        async fn merged_into(&self, base: &str) -> Result<Vec<RemoteRef>> {
            self.record(GatewayCall::Merged(base.to_string()));
            if self.failing_bases.contains(base) {
                return Err(SweepError::git_operation(format!(
                    "malformed object name {}",
                    base
                )));
            }
            Ok(self.merged.get(base).cloned().unwrap_or_default())
        }

        async fn delete_remote_branch(
            &self,
            reference: &RemoteRef,
            expected_tip: &str,
        ) -> Result<()> {
            self.record(GatewayCall::DeleteRemote(reference.clone()));
            if self.moved.contains(&reference.branch) || expected_tip != tip_of(&reference.branch) {
                return Err(SweepError::git_operation(format!(
                    "stale info: {} no longer points at {}",
                    reference, expected_tip
                )));
            }
            if self.delete_failures.contains(&reference.branch) {
                return Err(SweepError::git_operation(format!(
                    "remote rejected deletion of {}",
                    reference
                )));
            }
            Ok(())
        }

        async fn local_branches(&self) -> Result<Vec<LocalBranch>> {
            self.record(GatewayCall::LocalBranches);
            Ok(self.local.lock().expect("fake gateway lock poisoned").clone())
        }

        async fn delete_local_branch(&self, name: &str) -> Result<()> {
            self.record(GatewayCall::DeleteLocal(name.to_string()));
            self.local
                .lock()
                .expect("fake gateway lock poisoned")
                .retain(|b| b.name != name);
            Ok(())
        }
    }
}
