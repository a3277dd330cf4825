use branch_sweep::cli::{execute_command, Cli};
use branch_sweep::observability::init_logging;
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("branch-sweep: {:#}", e);
        std::process::exit(1);
    }

    // Exit explicitly so a pending stdin reader or prompt thread does not hold
    // the runtime open.
    let code = match execute_command(cli).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("branch-sweep: {:#}", e);
            1
        }
    };
    std::process::exit(code);
}
