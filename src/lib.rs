pub mod cli;
pub mod config;
pub mod core;
pub mod observability;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::Config;
pub use core::git::{GitGateway, RemoteRef, VersionControlGateway};
pub use core::retention::{classify, BranchRecord, RetentionPolicy};
pub use utils::{Result, SweepError};
