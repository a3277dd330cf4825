use super::classifier::ClassificationResult;
use super::confirmation::{CancelReason, ConfirmationGate, Decision};
use super::progress::ProgressReporter;
use crate::core::git::{RemoteRef, VersionControlGateway};
use crate::utils::error::{Result, SweepError};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Idle,
    AwaitingConfirmation,
    Executing,
    Completed,
    Cancelled,
}

impl ExecutionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    fn can_transition_to(self, next: ExecutionState) -> bool {
        use ExecutionState::*;
        matches!(
            (self, next),
            (Idle, AwaitingConfirmation)
                | (AwaitingConfirmation, Executing)
                | (AwaitingConfirmation, Cancelled)
                | (Executing, Completed)
        )
    }
}

/// A branch to delete and the commit it must still point at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDeletion {
    pub reference: RemoteRef,
    pub tip: String,
}

/// Branches selected for deletion, in report order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionPlan {
    entries: Vec<PlannedDeletion>,
}

impl DeletionPlan {
    pub fn new(entries: Vec<PlannedDeletion>) -> Self {
        Self { entries }
    }

    pub fn from_results(results: &[ClassificationResult]) -> Self {
        Self::new(
            results
                .iter()
                .filter(|r| r.eligible)
                .map(|r| PlannedDeletion {
                    reference: r.branch.reference.clone(),
                    tip: r.branch.tip.clone(),
                })
                .collect(),
        )
    }

    pub fn entries(&self) -> &[PlannedDeletion] {
        &self.entries
    }

    pub fn branches(&self) -> impl Iterator<Item = &RemoteRef> {
        self.entries.iter().map(|e| &e.reference)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionOutcome {
    pub branch: RemoteRef,
    pub succeeded: bool,
    pub error: Option<String>,
    /// What happened to the matching local branch, when local cleanup is on.
    pub local_note: Option<String>,
}

impl ExecutionOutcome {
    pub fn success(branch: RemoteRef) -> Self {
        Self {
            branch,
            succeeded: true,
            error: None,
            local_note: None,
        }
    }

    pub fn failure(branch: RemoteRef, error: impl Into<String>) -> Self {
        Self {
            branch,
            succeeded: false,
            error: Some(error.into()),
            local_note: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionSummary {
    pub planned: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<ExecutionOutcome>,
}

impl ExecutionSummary {
    fn new(planned: usize) -> Self {
        Self {
            planned,
            ..Default::default()
        }
    }

    fn record(&mut self, outcome: ExecutionOutcome) {
        self.attempted += 1;
        if outcome.succeeded {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.outcomes.push(outcome);
    }

    pub fn not_attempted(&self) -> usize {
        self.planned - self.attempted
    }

    pub fn failures(&self) -> impl Iterator<Item = &ExecutionOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Cancelled {
        reason: CancelReason,
        not_attempted: usize,
    },
    Completed(ExecutionSummary),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// After a remote deletion succeeds, also delete a local branch with the
    /// same name if it points at the deleted commit.
    pub delete_local: bool,
}

/// Runs the confirm-then-delete workflow.
///
/// Cancellation is honored only while awaiting confirmation. Once the state
/// is `Executing`, every planned branch is attempted; a failure on one
/// branch is recorded and the rest still run.
pub struct ExecutionController<'a, G: VersionControlGateway + ?Sized> {
    gateway: &'a G,
    progress: Box<dyn ProgressReporter + 'a>,
    options: ExecutionOptions,
    state: ExecutionState,
}

impl<'a, G: VersionControlGateway + ?Sized> ExecutionController<'a, G> {
    pub fn new(gateway: &'a G, progress: Box<dyn ProgressReporter + 'a>) -> Self {
        Self {
            gateway,
            progress,
            options: ExecutionOptions::default(),
            state: ExecutionState::Idle,
        }
    }

    pub fn with_options(mut self, options: ExecutionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn state(&self) -> ExecutionState {
        self.state
    }

    pub async fn run<C: ConfirmationGate>(
        &mut self,
        plan: &DeletionPlan,
        gate: C,
    ) -> Result<RunOutcome> {
        self.transition(ExecutionState::AwaitingConfirmation)?;

        let decision = match gate.resolve(plan.len()).await {
            Ok(decision) => decision,
            Err(e) => {
                self.transition(ExecutionState::Cancelled)?;
                return Err(e);
            }
        };

        if let Decision::Cancelled(reason) = decision {
            self.transition(ExecutionState::Cancelled)?;
            info!("deletion cancelled ({:?}); nothing was deleted", reason);
            return Ok(RunOutcome::Cancelled {
                reason,
                not_attempted: plan.len(),
            });
        }

        self.transition(ExecutionState::Executing)?;
        let summary = self.execute(plan).await;
        self.transition(ExecutionState::Completed)?;

        Ok(RunOutcome::Completed(summary))
    }

    async fn execute(&mut self, plan: &DeletionPlan) -> ExecutionSummary {
        let total = plan.len();
        let mut summary = ExecutionSummary::new(total);
        let local_branches = self.local_branches().await;

        self.progress.started(total);
        for (index, entry) in plan.entries().iter().enumerate() {
            let branch = &entry.reference;
            let mut outcome = match self.gateway.delete_remote_branch(branch, &entry.tip).await {
                Ok(()) => {
                    debug!("deleted {} at {}", branch, entry.tip);
                    ExecutionOutcome::success(branch.clone())
                }
                Err(e) => {
                    warn!("failed to delete {}: {}", branch, e);
                    ExecutionOutcome::failure(branch.clone(), e.to_string())
                }
            };

            if outcome.succeeded {
                if let Some(local_tip) = local_branches
                    .as_ref()
                    .and_then(|locals| locals.get(&branch.branch))
                {
                    outcome.local_note =
                        Some(self.delete_local(&branch.branch, local_tip, &entry.tip).await);
                }
            }

            self.progress.attempted(index + 1, total, &outcome);
            summary.record(outcome);
        }
        self.progress.finished(&summary);

        summary
    }

    /// Local branch tips by name, fetched once per run; `None` when local
    /// cleanup is off or the listing failed.
    async fn local_branches(&self) -> Option<HashMap<String, String>> {
        if !self.options.delete_local {
            return None;
        }

        match self.gateway.local_branches().await {
            Ok(branches) => Some(branches.into_iter().map(|b| (b.name, b.tip)).collect()),
            Err(e) => {
                warn!("skipping local branch cleanup: {}", e);
                None
            }
        }
    }

    async fn delete_local(&self, name: &str, local_tip: &str, deleted_tip: &str) -> String {
        if local_tip != deleted_tip {
            info!("keeping local branch {}: it has diverged from the remote", name);
            return format!(
                "local branch {} kept: it points at a different commit than the deleted branch",
                name
            );
        }

        match self.gateway.delete_local_branch(name).await {
            Ok(()) => format!("local branch {} deleted", name),
            Err(e) => {
                warn!("failed to delete local branch {}: {}", name, e);
                format!("local branch {} kept: {}", name, e)
            }
        }
    }

    fn transition(&mut self, next: ExecutionState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(SweepError::invalid_state(format!(
                "cannot move from {:?} to {:?}",
                self.state, next
            )));
        }

        debug!("execution state {:?} -> {:?}", self.state, next);
        self.state = next;
        Ok(())
    }
}
