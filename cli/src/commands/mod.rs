//! Non-interactive subcommands.

pub mod config;
pub mod hidden;
pub mod kill;
pub mod label;
pub mod list;
