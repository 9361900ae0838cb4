//! Subcommand implementations.

pub mod analyze;
pub mod config;
pub mod credential;
pub mod key;
pub mod render;
pub mod serve;
pub mod theme;
