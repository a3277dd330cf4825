use super::RunMode;
use crate::core::retention::Scope;
use crate::utils::{is_non_interactive, Result, SweepError};
use dialoguer::Select;

const RUN_MODES: [(&str, RunMode); 2] = [
    ("Report only (no changes)", RunMode::Report),
    ("Delete eligible branches", RunMode::Delete),
];

const SCOPES: [(&str, Scope); 2] = [
    ("All eligible branches", Scope::All),
    ("Only branches already merged into a base branch", Scope::MergedOnly),
];

pub fn choose_run_mode() -> Result<RunMode> {
    let index = select("What do you want to do?", &RUN_MODES.map(|(label, _)| label))?;
    Ok(RUN_MODES[index].1)
}

pub fn choose_scope() -> Result<Scope> {
    let index = select("Which branches?", &SCOPES.map(|(label, _)| label))?;
    Ok(SCOPES[index].1)
}

fn select(prompt: &str, items: &[&str]) -> Result<usize> {
    if is_non_interactive() {
        return Err(SweepError::invalid_args(
            "Interactive mode needs a terminal. Use --delete / --merged-only instead.",
        ));
    }

    Select::new()
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact()
        .map_err(|e| SweepError::invalid_args(format!("Selection aborted: {}", e)))
}
