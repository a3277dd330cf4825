use super::policy::RetentionPolicy;
use super::record::BranchRecord;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Protected,
    Author,
    Age,
    Merge,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Rule::Protected => "protected",
            Rule::Author => "author",
            Rule::Age => "age",
            Rule::Merge => "merge",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleOutcome {
    pub rule: Rule,
    /// `false` means this rule keeps the branch.
    pub passed: bool,
    pub detail: String,
}

impl RuleOutcome {
    fn pass(rule: Rule, detail: impl Into<String>) -> Self {
        Self {
            rule,
            passed: true,
            detail: detail.into(),
        }
    }

    fn keep(rule: Rule, detail: impl Into<String>) -> Self {
        Self {
            rule,
            passed: false,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub branch: BranchRecord,
    pub eligible: bool,
    /// Every rule's outcome, in evaluation order.
    pub reasons: Vec<RuleOutcome>,
}

impl ClassificationResult {
    /// The first rule that kept the branch, if any.
    pub fn deciding_rule(&self) -> Option<&RuleOutcome> {
        self.reasons.iter().find(|r| !r.passed)
    }
}

/// Classifies every branch. Does no I/O and depends only on its arguments.
pub fn classify(branches: &[BranchRecord], policy: &RetentionPolicy) -> Vec<ClassificationResult> {
    branches
        .iter()
        .map(|branch| classify_branch(branch, policy))
        .collect()
}

/// Rules are evaluated in order protected, author, age, merge. All of them
/// are recorded; the branch is eligible only when every one passes.
pub fn classify_branch(branch: &BranchRecord, policy: &RetentionPolicy) -> ClassificationResult {
    let reasons = vec![
        protected_rule(branch, policy),
        author_rule(branch, policy),
        age_rule(branch, policy),
        merge_rule(branch, policy),
    ];
    let eligible = reasons.iter().all(|r| r.passed);

    ClassificationResult {
        branch: branch.clone(),
        eligible,
        reasons,
    }
}

pub fn delete_set(results: &[ClassificationResult]) -> Vec<&ClassificationResult> {
    results.iter().filter(|r| r.eligible).collect()
}

pub fn keep_set(results: &[ClassificationResult]) -> Vec<&ClassificationResult> {
    results.iter().filter(|r| !r.eligible).collect()
}

fn protected_rule(branch: &BranchRecord, policy: &RetentionPolicy) -> RuleOutcome {
    match policy.protection_for(&branch.name()) {
        Some(entry) => RuleOutcome::keep(Rule::Protected, format!("protected by '{}'", entry)),
        None => RuleOutcome::pass(Rule::Protected, "not protected"),
    }
}

fn author_rule(branch: &BranchRecord, policy: &RetentionPolicy) -> RuleOutcome {
    let author = &branch.last_commit_author;
    match (policy.uses_exclusions(), policy.author_eligible(author)) {
        (true, true) => RuleOutcome::pass(Rule::Author, format!("{} is not excluded", author)),
        (true, false) => RuleOutcome::keep(Rule::Author, format!("{} is excluded", author)),
        (false, true) => RuleOutcome::pass(Rule::Author, format!("{} is a target author", author)),
        (false, false) => {
            RuleOutcome::keep(Rule::Author, format!("{} is not a target author", author))
        }
    }
}

fn age_rule(branch: &BranchRecord, policy: &RetentionPolicy) -> RuleOutcome {
    let cutoff = policy.cutoff();
    let last = branch.last_commit_time.format("%Y-%m-%d");
    if branch.last_commit_time < cutoff {
        RuleOutcome::pass(
            Rule::Age,
            format!("last commit {} is older than {}", last, cutoff.format("%Y-%m-%d")),
        )
    } else {
        RuleOutcome::keep(
            Rule::Age,
            format!(
                "last commit {} is within the retention window (cutoff {})",
                last,
                cutoff.format("%Y-%m-%d")
            ),
        )
    }
}

fn merge_rule(branch: &BranchRecord, policy: &RetentionPolicy) -> RuleOutcome {
    if !policy.require_merged {
        return RuleOutcome::pass(Rule::Merge, "merge not required");
    }

    if branch.is_merged() {
        let bases: Vec<&str> = branch.merged_into.iter().map(String::as_str).collect();
        RuleOutcome::pass(Rule::Merge, format!("merged into {}", bases.join(", ")))
    } else {
        RuleOutcome::keep(Rule::Merge, "not merged into any base branch")
    }
}
