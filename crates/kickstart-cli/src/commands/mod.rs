//! Command handlers. Each translates parsed arguments into core calls and
//! hands the results to the [`OutputManager`](crate::output::OutputManager).

pub mod check;
pub mod completions;
pub mod config;
pub mod context;
pub mod init;
pub mod list;
pub mod plan;
pub mod rollback;
pub mod run;
