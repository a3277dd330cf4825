pub mod error;

pub use error::{Result, SweepError};

/// True when nobody can answer a prompt: CI, an explicit opt-out, or stdin
/// not attached to a terminal.
pub fn is_non_interactive() -> bool {
    std::env::var("BRANCH_SWEEP_NON_INTERACTIVE").is_ok()
        || std::env::var("CI").is_ok()
        || !atty::is(atty::Stream::Stdin)
}

/// Splits a `,` or `|` separated list, trimming entries and dropping empties.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split([',', '|'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
