// JSON-file implementation of GuildConfigStore. Persists every guild's
// config in a single document: { "servers": { guild_id: GuildConfig } }.
//
// The whole read-modify-write - load document, apply update, write document
// - runs inside one mutex critical section, so concurrent mutations against
// the same file are serialized and increments can't be lost. Writes go to a
// temp file followed by a rename, so a failed serialize never destroys the
// existing document.

use crate::core::automod::{AutomodError, ConfigUpdate, GuildConfig, GuildConfigStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::path::PathBuf;
use tokio::sync::Mutex;

#[derive(Debug, Serialize, Deserialize, Default)]
struct ConfigDocument {
    #[serde(default)]
    servers: HashMap<u64, GuildConfig>,
}

pub struct JsonConfigStore {
    path: PathBuf,
    // Guards the whole load-update-persist cycle.
    write_lock: Mutex<()>,
}

impl JsonConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn load_document(&self) -> Result<ConfigDocument, AutomodError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => serde_json::from_str(&text).map_err(|e| {
                AutomodError::Config(format!(
                    "malformed config document at {}: {}",
                    self.path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigDocument::default()),
            Err(e) => Err(AutomodError::Storage(e.to_string())),
        }
    }

    fn persist(&self, document: &ConfigDocument) -> Result<(), AutomodError> {
        let tmp_path = self.path.with_extension("json.tmp");
        let file = File::create(&tmp_path).map_err(|e| AutomodError::Storage(e.to_string()))?;
        serde_json::to_writer_pretty(file, document)
            .map_err(|e| AutomodError::Storage(e.to_string()))?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| AutomodError::Storage(e.to_string()))
    }
}

#[async_trait]
impl GuildConfigStore for JsonConfigStore {
    async fn ensure(&self, guild_id: u64) -> Result<GuildConfig, AutomodError> {
        let _guard = self.write_lock.lock().await;

        let mut document = match self.load_document() {
            Ok(document) => document,
            Err(AutomodError::Config(e)) => {
                // Unreadable document: serve defaults for this read, but do
                // not persist them - the file on disk stays untouched until
                // a successful full rewrite.
                tracing::error!("{}; falling back to defaults for reads", e);
                return Ok(GuildConfig::default());
            }
            Err(e) => return Err(e),
        };

        if let Some(config) = document.servers.get(&guild_id) {
            return Ok(config.clone());
        }

        let config = GuildConfig::default();
        document.servers.insert(guild_id, config.clone());
        self.persist(&document)?;
        Ok(config)
    }

    async fn mutate(
        &self,
        guild_id: u64,
        update: ConfigUpdate,
    ) -> Result<GuildConfig, AutomodError> {
        let _guard = self.write_lock.lock().await;

        // Any load failure aborts here, before the update runs - a document
        // we can't read must never be replaced with defaults.
        let mut document = self.load_document()?;

        let config = document.servers.entry(guild_id).or_default();
        update(config);
        let updated = config.clone();

        self.persist(&document)?;
        Ok(updated)
    }
}
