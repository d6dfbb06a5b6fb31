//! CLI module
//!
//! Command-line interface over the node operations.
//!
//! # Commands
//!
//! - `fetch` - Paginated fetch of any list endpoint
//! - `call` - Single request
//! - `drives` / `delete-drive` - Shared drives
//! - `messages` / `mime` - Mail
//! - `profiles` - List built-in profiles

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat, StrategyKind};
pub use runner::{build_strategy, Runner};
