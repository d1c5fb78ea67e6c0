// In-memory implementation of GuildConfigStore.
//
// Used by the core test suites, and usable as-is for throwaway deployments
// that don't care about surviving a restart.
//
// DashMap's entry guard holds a write lock on the key's shard for as long
// as the guard lives, which is exactly the critical section `mutate` needs:
// two concurrent mutations of the same guild run one after the other.

use crate::core::automod::{AutomodError, ConfigUpdate, GuildConfig, GuildConfigStore};
use async_trait::async_trait;
use dashmap::DashMap;

pub struct InMemoryConfigStore {
    configs: DashMap<u64, GuildConfig>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self {
            configs: DashMap::new(),
        }
    }
}

impl Default for InMemoryConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GuildConfigStore for InMemoryConfigStore {
    async fn ensure(&self, guild_id: u64) -> Result<GuildConfig, AutomodError> {
        Ok(self.configs.entry(guild_id).or_default().clone())
    }

    async fn mutate(
        &self,
        guild_id: u64,
        update: ConfigUpdate,
    ) -> Result<GuildConfig, AutomodError> {
        let mut entry = self.configs.entry(guild_id).or_default();
        update(entry.value_mut());
        Ok(entry.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ensure_lazily_creates_defaults() {
        let store = InMemoryConfigStore::new();
        let config = store.ensure(1).await.unwrap();
        assert!(config.moderation_enabled);
        assert!(config.denylist.is_empty());
    }

    #[tokio::test]
    async fn mutate_returns_the_updated_config() {
        let store = InMemoryConfigStore::new();
        let config = store
            .mutate(1, Box::new(|c| c.denylist.push("spam".to_string())))
            .await
            .unwrap();
        assert_eq!(config.denylist, vec!["spam"]);

        // And the change sticks.
        assert_eq!(store.ensure(1).await.unwrap().denylist, vec!["spam"]);
    }
}
