use super::{CommitMetadata, LocalBranch, RemoteBranchListing, RemoteRef, VersionControlGateway};
use crate::utils::error::{Result, SweepError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

const LISTING_FORMAT: &str =
    "%(refname)%00%(symref)%00%(objectname)%00%(authordate:unix)%00%(authorname)";
const LOCAL_FORMAT: &str = "--format=%(refname:short)%00%(objectname)";

/// Gateway backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitGateway {
    pub root: PathBuf,
    remote: String,
}

impl GitGateway {
    pub async fn open(path: &Path, remote: impl Into<String>) -> Result<Self> {
        let output = Command::new("git")
            .current_dir(path)
            .args(["rev-parse", "--show-toplevel"])
            .output()
            .await
            .map_err(|e| SweepError::git_operation(format!("Failed to execute git: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SweepError::config(format!(
                "{} is not a git repository: {}",
                path.display(),
                stderr.trim()
            )));
        }

        let root = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());
        let gateway = Self {
            root,
            remote: remote.into(),
        };
        gateway.validate_remote().await?;

        Ok(gateway)
    }

    async fn validate_remote(&self) -> Result<()> {
        let remotes = self.git(&["remote"]).await?;
        if remotes.lines().any(|r| r.trim() == self.remote) {
            return Ok(());
        }

        Err(SweepError::config(format!(
            "Remote '{}' is not configured in {}",
            self.remote,
            self.root.display()
        )))
    }

    fn remote_namespace(&self) -> String {
        format!("refs/remotes/{}", self.remote)
    }

    async fn git(&self, args: &[&str]) -> Result<String> {
        execute_git_command(&self.root, args).await
    }

    fn parse_listing_line(&self, line: &str) -> Option<RemoteBranchListing> {
        let mut fields = line.split('\0');
        let refname = fields.next()?.trim();
        if refname.is_empty() {
            return None;
        }
        let symref = fields.next().unwrap_or("").trim();
        let tip = fields.next().unwrap_or("").trim();
        let timestamp = fields.next().unwrap_or("").trim();
        let author = fields.next().unwrap_or("").trim();

        let reference = match RemoteRef::from_full_name(refname, &self.remote) {
            Ok(reference) => reference,
            Err(e) => {
                debug!("skipping listing entry {}: {}", refname, e);
                return None;
            }
        };

        Some(RemoteBranchListing {
            reference,
            symbolic_target: (!symref.is_empty()).then(|| symref.to_string()),
            metadata: parse_commit_metadata(tip, timestamp, author),
        })
    }
}

fn parse_commit_metadata(
    tip: &str,
    timestamp: &str,
    author: &str,
) -> std::result::Result<CommitMetadata, String> {
    if tip.is_empty() {
        return Err("tip commit id is missing".to_string());
    }
    let seconds: i64 = timestamp
        .parse()
        .map_err(|_| format!("unreadable commit timestamp '{}'", timestamp))?;
    let time = DateTime::<Utc>::from_timestamp(seconds, 0)
        .ok_or_else(|| format!("commit timestamp {} out of range", seconds))?;

    if author.is_empty() {
        return Err("commit has no author".to_string());
    }

    Ok(CommitMetadata {
        tip: tip.to_string(),
        time,
        author: author.to_string(),
    })
}

#[async_trait]
impl VersionControlGateway for GitGateway {
    fn remote(&self) -> &str {
        &self.remote
    }

    async fn refresh(&self) -> Result<()> {
        self.git(&["fetch", "--prune", &self.remote]).await?;
        Ok(())
    }

    async fn list_remote_branches(&self) -> Result<Vec<RemoteBranchListing>> {
        let format = format!("--format={}", LISTING_FORMAT);
        let namespace = self.remote_namespace();
        let output = self
            .git(&["for-each-ref", "--sort=-authordate", &format, &namespace])
            .await?;

        Ok(output
            .lines()
            .filter_map(|line| self.parse_listing_line(line))
            .collect())
    }

    async fn merged_into(&self, base: &str) -> Result<Vec<RemoteRef>> {
        let base_ref = format!("{}/{}", self.remote_namespace(), base);
        let namespace = self.remote_namespace();
        let output = self
            .git(&[
                "for-each-ref",
                "--merged",
                &base_ref,
                "--format=%(refname)",
                &namespace,
            ])
            .await?;

        Ok(output
            .lines()
            .filter_map(|line| RemoteRef::from_full_name(line.trim(), &self.remote).ok())
            .collect())
    }

    async fn delete_remote_branch(
        &self,
        reference: &RemoteRef,
        expected_tip: &str,
    ) -> Result<()> {
        // The lease makes the remote refuse the deletion if the branch moved.
        let lease = format!(
            "--force-with-lease=refs/heads/{}:{}",
            reference.branch, expected_tip
        );
        self.git(&[
            "push",
            &lease,
            &reference.remote,
            "--delete",
            &reference.branch,
        ])
        .await?;
        Ok(())
    }

    async fn local_branches(&self) -> Result<Vec<LocalBranch>> {
        let output = self.git(&["for-each-ref", LOCAL_FORMAT, "refs/heads"]).await?;

        Ok(output
            .lines()
            .filter_map(|line| {
                let (name, tip) = line.split_once('\0')?;
                let name = name.trim();
                (!name.is_empty()).then(|| LocalBranch {
                    name: name.to_string(),
                    tip: tip.trim().to_string(),
                })
            })
            .collect())
    }

    async fn delete_local_branch(&self, name: &str) -> Result<()> {
        self.git(&["branch", "-D", name]).await?;
        Ok(())
    }
}

pub async fn execute_git_command(root: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .current_dir(root)
        .args(args)
        .output()
        .await
        .map_err(|e| SweepError::git_operation(format!("Failed to execute git: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SweepError::git_operation(format!(
            "Git command failed ({}): {}",
            args.join(" "),
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout.trim().to_string())
}
