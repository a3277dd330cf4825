use crate::utils::{Result, SweepError};
use clap::{ArgAction, Parser, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "branch-sweep")]
#[command(about = "Find and retire stale remote branches")]
#[command(
    version,
    long_about = "Without --delete, prints which remote branches the retention policy would delete and changes nothing.

Policy is read from the environment (or a .env file): TARGET_AUTHORS, EXCLUDE_AUTHORS, GIT_PATH, PROTECTED_BRANCHES, BASE_BRANCHES, RETENTION_DAYS, GIT_REMOTE, CONFIRMATION_SECONDS."
)]
pub struct Cli {
    /// Delete eligible branches after confirmation
    #[arg(long, help = "Delete eligible branches after confirmation")]
    pub delete: bool,

    /// Choose run mode and scope interactively
    #[arg(long, short, conflicts_with_all = ["delete", "merged_only", "json"])]
    pub interactive: bool,

    /// Only consider branches already merged into a base branch
    #[arg(long, help = "Only consider branches merged into a base branch")]
    pub merged_only: bool,

    /// How deletion is confirmed
    #[arg(long, value_enum, default_value_t = ConfirmMode::Countdown)]
    pub confirm: ConfirmMode,

    /// Length of the cancellation window (overrides CONFIRMATION_SECONDS)
    #[arg(long, value_name = "SECONDS")]
    pub countdown_secs: Option<u64>,

    /// Also delete local branches with the same name
    #[arg(long, help = "Also delete matching local branches once the remote deletion succeeds")]
    pub delete_local: bool,

    /// Fetch and prune the remote before collecting branches
    #[arg(long)]
    pub fetch: bool,

    /// Repository location (overrides GIT_PATH)
    #[arg(long, value_name = "PATH")]
    pub repo: Option<PathBuf>,

    /// Print the classification report as JSON
    #[arg(long, conflicts_with = "delete")]
    pub json: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    pub show_config: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmMode {
    /// Proceed after a countdown unless Enter or Ctrl-C is pressed
    Countdown,
    /// Ask for an explicit yes
    Prompt,
}

impl Cli {
    pub fn validate(&self) -> Result<()> {
        if self.delete_local && !(self.delete || self.interactive) {
            return Err(SweepError::invalid_args(
                "--delete-local only applies together with --delete or --interactive",
            ));
        }

        if self.countdown_secs == Some(0) {
            return Err(SweepError::invalid_args(
                "--countdown-secs must be greater than zero",
            ));
        }

        Ok(())
    }
}
