pub mod commands;
pub mod parser;

#[cfg(test)]
mod tests;

pub use parser::{Cli, ConfirmMode};

use crate::config::Config;
use crate::core::retention::{ExecutionOptions, Scope};
use clap::CommandFactory;
use commands::interactive::{choose_run_mode, choose_scope};
use commands::sweep::SweepRequest;
use commands::RunMode;
use std::time::Duration;

pub async fn execute_command(cli: Cli) -> anyhow::Result<()> {
    cli.validate()?;

    if let Some(shell) = cli.completions {
        clap_complete::generate(
            shell,
            &mut Cli::command(),
            "branch-sweep",
            &mut std::io::stdout(),
        );
        return Ok(());
    }

    let mut config = Config::from_env()?;
    if let Some(repo) = &cli.repo {
        config = config.with_repository(repo);
    }

    if cli.show_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let (mode, scope) = if cli.interactive {
        (choose_run_mode()?, choose_scope()?)
    } else {
        selected_mode_and_scope(&cli)
    };

    let request = build_request(&cli, &config, mode, scope);
    commands::sweep::execute(config, request).await
}

fn selected_mode_and_scope(cli: &Cli) -> (RunMode, Scope) {
    let mode = if cli.delete {
        RunMode::Delete
    } else {
        RunMode::Report
    };
    let scope = if cli.merged_only {
        Scope::MergedOnly
    } else {
        Scope::All
    };
    (mode, scope)
}

fn build_request(cli: &Cli, config: &Config, mode: RunMode, scope: Scope) -> SweepRequest {
    SweepRequest {
        mode,
        scope,
        confirm: cli.confirm,
        window: cli
            .countdown_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| config.confirmation_window()),
        options: ExecutionOptions {
            delete_local: cli.delete_local,
        },
        fetch: cli.fetch,
        json: cli.json,
    }
}
