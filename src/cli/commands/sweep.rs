use super::signals::{install_interrupt_handler, listen_for_enter};
use super::{report, RunMode};
use crate::cli::parser::ConfirmMode;
use crate::config::Config;
use crate::core::git::{GitGateway, VersionControlGateway};
use crate::core::retention::{
    classify, ClassificationResult, Collection, ConsoleProgress, CountdownGate, DeletionPlan,
    ExecutionController, ExecutionOptions, MetadataCollector, PromptGate, RetentionPolicy,
    RunOutcome, Scope,
};
use crate::utils::{Result, SweepError};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone)]
pub struct SweepRequest {
    pub mode: RunMode,
    pub scope: Scope,
    pub confirm: ConfirmMode,
    pub window: Duration,
    pub options: ExecutionOptions,
    pub fetch: bool,
    pub json: bool,
}

/// Everything decided before any mutation.
#[derive(Debug)]
pub struct SweepPlan {
    pub policy: RetentionPolicy,
    pub collection: Collection,
    pub results: Vec<ClassificationResult>,
    pub deletion: DeletionPlan,
}

pub async fn prepare<G: VersionControlGateway + ?Sized>(
    gateway: &G,
    config: &Config,
    scope: Scope,
    fetch: bool,
    now: DateTime<Utc>,
) -> Result<SweepPlan> {
    if fetch {
        gateway.refresh().await.map_err(|e| {
            SweepError::collection(format!("Failed to refresh remote '{}': {}", gateway.remote(), e))
        })?;
    }

    let collection = MetadataCollector::new(gateway, &config.base_branches)
        .collect()
        .await?;
    let policy = RetentionPolicy::from_config(config, scope, now);
    let results = classify(&collection.branches, &policy);
    let deletion = DeletionPlan::from_results(&results);

    info!(
        "{} branches classified, {} eligible for deletion, {} unclassifiable",
        results.len(),
        deletion.len(),
        collection.unclassifiable.len()
    );

    Ok(SweepPlan {
        policy,
        collection,
        results,
        deletion,
    })
}

pub async fn execute(config: Config, request: SweepRequest) -> anyhow::Result<()> {
    config.validate()?;
    let gateway = GitGateway::open(config.repository_path()?, config.remote.clone()).await?;
    let plan = prepare(&gateway, &config, request.scope, request.fetch, Utc::now()).await?;

    if request.json {
        println!(
            "{}",
            report::render_json(&plan.results, &plan.collection.unclassifiable, &plan.policy)?
        );
        return Ok(());
    }

    print!(
        "{}",
        report::render_report(
            &plan.results,
            &plan.collection.unclassifiable,
            &plan.policy,
            request.mode
        )
    );

    match request.mode {
        RunMode::Report => {
            if !plan.deletion.is_empty() {
                print!("{}", report::render_report_hint());
            }
            Ok(())
        }
        RunMode::Delete => delete(&gateway, &plan.deletion, &request).await,
    }
}

async fn delete<G: VersionControlGateway + ?Sized>(
    gateway: &G,
    deletion: &DeletionPlan,
    request: &SweepRequest,
) -> anyhow::Result<()> {
    if deletion.is_empty() {
        println!("Nothing to delete.");
        return Ok(());
    }

    let (cancel_tx, cancel_rx) = install_interrupt_handler()?;
    let mut controller =
        ExecutionController::new(gateway, Box::new(ConsoleProgress)).with_options(request.options);

    let outcome = match request.confirm {
        ConfirmMode::Countdown => {
            println!(
                "\nYou have {} seconds to cancel. Press Enter (or Ctrl-C) to cancel...",
                request.window.as_secs()
            );
            listen_for_enter(cancel_tx);
            let gate = CountdownGate::new(request.window, cancel_rx);
            controller.run(deletion, gate).await?
        }
        ConfirmMode::Prompt => {
            drop(cancel_tx);
            let gate = PromptGate::new("Delete these branches?", cancel_rx)?;
            controller.run(deletion, gate).await?
        }
    };

    match outcome {
        RunOutcome::Cancelled {
            reason,
            not_attempted,
        } => print!("{}", report::render_cancelled(reason, not_attempted)),
        RunOutcome::Completed(summary) => print!("{}", report::render_summary(&summary)),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::default_config;
    use crate::core::retention::{ConfirmationGate, Decision, Rule};
    use crate::test_utils::fake_gateway::{FakeGateway, GatewayCall};
    use crate::test_utils::git_fixture::RemoteFixture;

    fn alice_config() -> Config {
        let mut config = default_config();
        config.target_authors = vec!["alice".to_string()];
        config.retention_days = 30;
        config
    }

    fn scenario_gateway() -> FakeGateway {
        FakeGateway::new()
            .with_symbolic("HEAD", "refs/remotes/origin/main")
            .with_branch("feat-x", "alice", 45)
            .with_branch("main", "alice", 90)
            .with_branch("feat-y", "bob", 90)
            .with_unreadable("broken", "unreadable commit timestamp ''")
    }

    #[tokio::test]
    async fn test_prepare_reference_scenario() {
        let gateway = scenario_gateway();
        let plan = prepare(&gateway, &alice_config(), Scope::All, false, Utc::now())
            .await
            .unwrap();

        let deleting: Vec<String> = plan.deletion.branches().map(|r| r.to_string()).collect();
        assert_eq!(deleting, vec!["origin/feat-x"]);
        assert_eq!(plan.results.len(), 3);
        assert_eq!(plan.collection.unclassifiable.len(), 1);
        assert!(gateway.remote_deletions().is_empty());
    }

    #[tokio::test]
    async fn test_prepare_merged_only_scope() {
        let gateway = scenario_gateway();
        let plan = prepare(&gateway, &alice_config(), Scope::MergedOnly, false, Utc::now())
            .await
            .unwrap();

        assert!(plan.deletion.is_empty());
        let feat_x = plan
            .results
            .iter()
            .find(|r| r.branch.reference.branch == "feat-x")
            .unwrap();
        assert_eq!(feat_x.deciding_rule().unwrap().rule, Rule::Merge);
    }

    #[tokio::test]
    async fn test_prepare_refreshes_first_when_asked() {
        let gateway = FakeGateway::new();
        prepare(&gateway, &alice_config(), Scope::All, true, Utc::now())
            .await
            .unwrap();

        assert_eq!(gateway.calls()[0], GatewayCall::Refresh);
    }

    #[tokio::test]
    async fn test_prepare_against_real_repository() {
        let fixture = RemoteFixture::new();
        fixture.push_branch("feat-x", "alice", 45);
        fixture.push_branch("feat-y", "bob", 90);
        fixture.push_branch("fresh", "alice", 2);
        fixture.push_branch("merged-old", "alice", 60);
        fixture.merge_into_main("merged-old");
        fixture.set_remote_head();

        let config = alice_config().with_repository(fixture.work_path());
        let gateway = GitGateway::open(fixture.work_path(), "origin").await.unwrap();

        let plan = prepare(&gateway, &config, Scope::All, true, Utc::now())
            .await
            .unwrap();
        let mut deleting: Vec<String> =
            plan.deletion.branches().map(|r| r.to_string()).collect();
        deleting.sort();
        assert_eq!(deleting, vec!["origin/feat-x", "origin/merged-old"]);
        assert!(plan
            .results
            .iter()
            .all(|r| r.branch.reference.branch != "HEAD"));

        let merged_plan = prepare(&gateway, &config, Scope::MergedOnly, false, Utc::now())
            .await
            .unwrap();
        let deleting: Vec<String> = merged_plan
            .deletion
            .branches()
            .map(|r| r.to_string())
            .collect();
        assert_eq!(deleting, vec!["origin/merged-old"]);
    }

    struct Proceed;

    #[async_trait::async_trait]
    impl ConfirmationGate for Proceed {
        async fn resolve(self, _pending: usize) -> crate::utils::error::Result<Decision> {
            Ok(Decision::Proceed)
        }
    }

    #[tokio::test]
    async fn test_branch_updated_after_collection_survives() {
        let fixture = RemoteFixture::new();
        fixture.push_branch("feat-x", "alice", 45);

        let config = alice_config().with_repository(fixture.work_path());
        let gateway = GitGateway::open(fixture.work_path(), "origin").await.unwrap();
        let plan = prepare(&gateway, &config, Scope::All, false, Utc::now())
            .await
            .unwrap();
        let deleting: Vec<String> = plan.deletion.branches().map(|r| r.to_string()).collect();
        assert_eq!(deleting, vec!["origin/feat-x"]);

        fixture.push_from_other_clone("feat-x", "carol");
        let fresh_tip = fixture.remote_tip("feat-x");

        let mut controller = ExecutionController::new(&gateway, Box::new(ConsoleProgress));
        let outcome = controller.run(&plan.deletion, Proceed).await.unwrap();

        let RunOutcome::Completed(summary) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.succeeded, 0);
        assert_eq!(fixture.remote_tip("feat-x"), fresh_tip);
    }
}
