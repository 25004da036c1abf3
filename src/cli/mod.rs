//! Command-line interface for playdeck.
//!
//! Browses collections and plans queues against the live catalog (or a
//! JSON fixture) without a graphical front end.

mod commands;
mod engine;

pub use commands::{Cli, Commands, run_command};
