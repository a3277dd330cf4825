use super::RunMode;
use crate::core::retention::{
    CancelReason, ClassificationResult, ExecutionSummary, RetentionPolicy, UnclassifiableBranch,
};
use crate::utils::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;

const DIVIDER: &str = "-----------------------------------------------------------------------";

pub fn render_report(
    results: &[ClassificationResult],
    unclassifiable: &[UnclassifiableBranch],
    policy: &RetentionPolicy,
    mode: RunMode,
) -> String {
    let mut out = String::new();
    let (delete, keep): (Vec<_>, Vec<_>) = results.iter().partition(|r| r.eligible);

    match mode {
        RunMode::Report => out.push_str("Branches the retention policy would delete (report only)\n"),
        RunMode::Delete => out.push_str("The following branches will be deleted:\n"),
    }
    let _ = writeln!(
        out,
        "Cutoff: last commit before {}{}",
        policy.cutoff().format("%d/%m/%Y"),
        if policy.require_merged {
            ", merged branches only"
        } else {
            ""
        }
    );
    let _ = writeln!(out, "{}", DIVIDER);

    if delete.is_empty() {
        out.push_str("  No branches are eligible for deletion.\n");
    }
    for result in &delete {
        let _ = writeln!(out, "🗑  {}", branch_line(result));
    }

    if !keep.is_empty() {
        let _ = writeln!(out, "\nKept ({}):", keep.len());
        for result in &keep {
            let reason = result
                .deciding_rule()
                .map(|r| format!("{}: {}", r.rule, r.detail))
                .unwrap_or_default();
            let _ = writeln!(out, "✋ {}", branch_line(result));
            let _ = writeln!(out, "      {}", reason);
        }
    }

    if !unclassifiable.is_empty() {
        let _ = writeln!(out, "\nUnclassifiable ({}):", unclassifiable.len());
        for branch in unclassifiable {
            let _ = writeln!(out, "⚠️  {}: {}", branch.reference, branch.error);
        }
    }

    let _ = writeln!(out, "{}", DIVIDER);
    let _ = writeln!(
        out,
        "{} to delete, {} kept, {} unclassifiable",
        delete.len(),
        keep.len(),
        unclassifiable.len()
    );

    out
}

fn branch_line(result: &ClassificationResult) -> String {
    let branch = &result.branch;
    let merge = if branch.is_merged() {
        let bases: Vec<&str> = branch.merged_into.iter().map(String::as_str).collect();
        format!("merged into {}", bases.join(", "))
    } else {
        "unmerged".to_string()
    };

    format!(
        "{:<40} {}  {:<20} {}",
        branch.name(),
        branch.last_commit_time.format("%d/%m/%Y"),
        branch.last_commit_author,
        merge
    )
}

pub fn render_report_hint() -> String {
    "This was informational only. To delete these branches run:\n  $ branch-sweep --delete\n"
        .to_string()
}

pub fn render_cancelled(reason: CancelReason, not_attempted: usize) -> String {
    let headline = match reason {
        CancelReason::UserRequested => "Operation cancelled by user.",
        CancelReason::Interrupted => "Operation interrupted.",
        CancelReason::Declined => "Deletion declined.",
    };
    format!(
        "{} No branches were deleted ({} not attempted).\n",
        headline, not_attempted
    )
}

pub fn render_summary(summary: &ExecutionSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n🧹 Deletion complete");
    let _ = writeln!(out, "  attempted:     {}", summary.attempted);
    let _ = writeln!(out, "  ✅ succeeded:  {}", summary.succeeded);
    let _ = writeln!(out, "  ❌ failed:     {}", summary.failed);
    for failure in summary.failures() {
        let _ = writeln!(
            out,
            "      • {}: {}",
            failure.branch,
            failure.error.as_deref().unwrap_or("unknown error")
        );
    }
    let _ = writeln!(out, "  not attempted: {}", summary.not_attempted());
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    evaluated_at: DateTime<Utc>,
    cutoff: DateTime<Utc>,
    require_merged: bool,
    results: &'a [ClassificationResult],
    unclassifiable: &'a [UnclassifiableBranch],
}

pub fn render_json(
    results: &[ClassificationResult],
    unclassifiable: &[UnclassifiableBranch],
    policy: &RetentionPolicy,
) -> Result<String> {
    let report = JsonReport {
        evaluated_at: policy.evaluated_at,
        cutoff: policy.cutoff(),
        require_merged: policy.require_merged,
        results,
        unclassifiable,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::git::RemoteRef;
    use crate::core::retention::{classify, BranchRecord, ExecutionOutcome};
    use chrono::{Duration, TimeZone};

    fn sample() -> (Vec<ClassificationResult>, Vec<UnclassifiableBranch>, RetentionPolicy) {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let record = |name: &str, author: &str, days: i64, merged: &[&str]| BranchRecord {
            reference: RemoteRef::new("origin", name),
            tip: format!("tip-{}", name),
            last_commit_time: now - Duration::days(days),
            last_commit_author: author.to_string(),
            merged_into: merged.iter().map(|m| m.to_string()).collect(),
        };
        let policy = RetentionPolicy::new(Duration::days(30), now)
            .with_target_authors(["alice".to_string()])
            .with_protected_names(["main".to_string()]);
        let results = classify(
            &[
                record("feat-x", "alice", 45, &["main"]),
                record("main", "alice", 90, &[]),
                record("feat-y", "bob", 90, &[]),
            ],
            &policy,
        );
        let unclassifiable = vec![UnclassifiableBranch {
            reference: RemoteRef::new("origin", "broken"),
            error: "unreadable commit timestamp ''".to_string(),
        }];
        (results, unclassifiable, policy)
    }

    #[test]
    fn test_report_lists_decisions_and_reasons() {
        let (results, unclassifiable, policy) = sample();
        let report = render_report(&results, &unclassifiable, &policy, RunMode::Report);

        assert!(report.starts_with("Branches the retention policy would delete (report only)"));
        assert!(report.contains("Cutoff: last commit before 19/09/2026"));
        assert!(report.contains("🗑  origin/feat-x"));
        assert!(report.contains("04/09/2026"));
        assert!(report.contains("merged into main"));
        assert!(report.contains("protected: protected by 'main'"));
        assert!(report.contains("author: bob is not a target author"));
        assert!(report.contains("⚠️  origin/broken: unreadable commit timestamp ''"));
        assert!(report.contains("1 to delete, 2 kept, 1 unclassifiable"));
    }

    #[test]
    fn test_delete_mode_header() {
        let (results, _, policy) = sample();
        let report = render_report(&results, &[], &policy, RunMode::Delete);
        assert!(report.starts_with("The following branches will be deleted:"));
        assert!(!report.contains("Unclassifiable"));
    }

    #[test]
    fn test_empty_report() {
        let (_, _, policy) = sample();
        let report = render_report(&[], &[], &policy, RunMode::Report);
        assert!(report.contains("No branches are eligible for deletion."));
        assert!(report.contains("0 to delete, 0 kept, 0 unclassifiable"));
    }

    #[test]
    fn test_json_report() {
        let (results, unclassifiable, policy) = sample();
        let json = render_json(&results, &unclassifiable, &policy).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["results"].as_array().unwrap().len(), 3);
        assert_eq!(value["results"][0]["eligible"], true);
        assert_eq!(value["results"][0]["branch"]["reference"]["branch"], "feat-x");
        assert_eq!(value["results"][1]["reasons"][0]["rule"], "protected");
        assert_eq!(value["unclassifiable"][0]["reference"]["branch"], "broken");
        assert_eq!(value["require_merged"], false);
    }

    #[test]
    fn test_summary_distinguishes_outcomes() {
        let summary = ExecutionSummary {
            planned: 3,
            attempted: 2,
            succeeded: 1,
            failed: 1,
            outcomes: vec![
                ExecutionOutcome::success(RemoteRef::new("origin", "a")),
                ExecutionOutcome::failure(RemoteRef::new("origin", "b"), "remote rejected"),
            ],
        };
        let text = render_summary(&summary);

        assert!(text.contains("attempted:     2"));
        assert!(text.contains("✅ succeeded:  1"));
        assert!(text.contains("❌ failed:     1"));
        assert!(text.contains("• origin/b: remote rejected"));
        assert!(text.contains("not attempted: 1"));
    }

    #[test]
    fn test_cancelled_message() {
        assert_eq!(
            render_cancelled(CancelReason::UserRequested, 4),
            "Operation cancelled by user. No branches were deleted (4 not attempted).\n"
        );
        assert!(render_cancelled(CancelReason::Declined, 1).starts_with("Deletion declined."));
    }
}
