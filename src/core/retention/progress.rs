use super::controller::{ExecutionOutcome, ExecutionSummary};

/// Receives a callback after every deletion attempt.
pub trait ProgressReporter: Send {
    fn started(&mut self, _total: usize) {}

    fn attempted(&mut self, position: usize, total: usize, outcome: &ExecutionOutcome);

    fn finished(&mut self, _summary: &ExecutionSummary) {}
}

/// Prints one line per attempt to stdout.
#[derive(Debug, Default)]
pub struct ConsoleProgress;

impl ProgressReporter for ConsoleProgress {
    fn started(&mut self, total: usize) {
        println!("Deleting {} branches...", total);
    }

    fn attempted(&mut self, position: usize, total: usize, outcome: &ExecutionOutcome) {
        println!("{}", format_attempt(position, total, outcome));
        if let Some(note) = &outcome.local_note {
            println!("        {}", note);
        }
    }
}

pub fn format_attempt(position: usize, total: usize, outcome: &ExecutionOutcome) -> String {
    match &outcome.error {
        None => format!("[{}/{}] ✅ deleted {}", position, total, outcome.branch),
        Some(error) => format!("[{}/{}] ❌ {}: {}", position, total, outcome.branch, error),
    }
}
