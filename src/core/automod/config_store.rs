// Storage port for per-guild moderation configuration.
//
// Every configuration change in the whole bot goes through `mutate` - a
// single whole-document read-modify-write. Earlier versions of this bot had
// several code paths that each loaded part of the config file, patched it,
// and wrote their slice back, which silently dropped fields written by the
// other paths. Funneling everything through one accessor closes that hole.

use super::automod_models::GuildConfig;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AutomodError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Closure applied to one guild's config inside the store's critical section.
pub type ConfigUpdate = Box<dyn FnOnce(&mut GuildConfig) + Send>;

/// Trait for persisting guild configuration.
///
/// Implementations must serialize concurrent `mutate` calls against the same
/// document: two simultaneous violations by the same user must never both
/// read the same stale count and both write count+1.
#[async_trait]
pub trait GuildConfigStore: Send + Sync {
    /// Return the guild's config, creating and persisting the default one if
    /// the guild has never been seen. Only fails on storage I/O problems.
    async fn ensure(&self, guild_id: u64) -> Result<GuildConfig, AutomodError>;

    /// Load the full persisted document, apply `update` to this guild's
    /// config (creating the default first if needed), persist the whole
    /// document, and return the updated config.
    ///
    /// If the document cannot be read, the call aborts without writing -
    /// the store must never replace data it could not load with defaults.
    async fn mutate(&self, guild_id: u64, update: ConfigUpdate)
        -> Result<GuildConfig, AutomodError>;
}
