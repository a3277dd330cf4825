pub mod interactive;
pub mod report;
pub mod signals;
pub mod sweep;

/// Whether a run only reports or goes on to delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Report,
    Delete,
}
