//! Collect, classify, confirm, delete.

pub mod classifier;
pub mod collector;
pub mod confirmation;
pub mod controller;
pub mod policy;
pub mod progress;
pub mod record;

pub use classifier::{classify, ClassificationResult, Rule, RuleOutcome};
pub use collector::MetadataCollector;
pub use confirmation::{CancelReason, ConfirmationGate, CountdownGate, Decision, PromptGate};
pub use controller::{
    DeletionPlan, ExecutionController, ExecutionOptions, ExecutionOutcome, ExecutionState,
    PlannedDeletion,
    ExecutionSummary, RunOutcome,
};
pub use policy::{RetentionPolicy, Scope};
pub use progress::{ConsoleProgress, ProgressReporter};
pub use record::{BranchRecord, Collection, UnclassifiableBranch};
