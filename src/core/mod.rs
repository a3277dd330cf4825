pub mod git;
pub mod retention;
