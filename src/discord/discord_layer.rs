// Discord layer - commands and event handlers.

#[path = "automod/mod.rs"]
pub mod automod;

#[path = "commands/command_catalog.rs"]
pub mod commands;

// Re-export shared command types for convenience
pub use commands::{Context, Data, Error};
