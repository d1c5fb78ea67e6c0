// Discord commands module - shared types for every command.

use crate::core::automod::AutomodService;
use crate::discord::automod::enforcement::SerenityEnforcementPort;
use crate::infra::automod::JsonConfigStore;
use std::sync::Arc;

/// Type alias for our bot's error and context.
/// This is what every command receives as its first parameter.
pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Data that's shared across all commands.
/// This is where we store our services and configuration.
pub struct Data {
    pub automod: Arc<AutomodService<JsonConfigStore, SerenityEnforcementPort>>,
}
