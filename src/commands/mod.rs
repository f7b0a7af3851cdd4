//! CLI command implementations.

pub mod compare;
pub mod list;

pub use compare::{CompareCommand, RunReport, RunSummary};
pub use list::ListCommand;
