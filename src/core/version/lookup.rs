use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::warn;

use super::manifest::VersionManifest;

/// Canonical name of a game version as the authoritative source knows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameVersionInfo {
    pub name: String,
    pub is_snapshot: bool,
}

/// Resolves a user-supplied game version against an authoritative list.
#[async_trait]
pub trait GameVersionLookup: Send + Sync {
    async fn find_version_by_name(&self, name: &str) -> Option<GameVersionInfo>;
}

/// Lookup backed by the Mojang version manifest, fetched once.
pub struct MojangVersionLookup {
    client: reqwest::Client,
    manifest_url: String,
    manifest: OnceCell<Option<VersionManifest>>,
}

impl MojangVersionLookup {
    pub fn new(client: reqwest::Client, manifest_url: impl Into<String>) -> Self {
        Self {
            client,
            manifest_url: manifest_url.into(),
            manifest: OnceCell::new(),
        }
    }

    async fn manifest(&self) -> Option<&VersionManifest> {
        self.manifest
            .get_or_init(|| async {
                match VersionManifest::fetch(&self.client, &self.manifest_url).await {
                    Ok(manifest) => Some(manifest),
                    Err(e) => {
                        warn!("Version manifest unavailable, falling back to syntactic matching: {}", e);
                        None
                    }
                }
            })
            .await
            .as_ref()
    }
}

#[async_trait]
impl GameVersionLookup for MojangVersionLookup {
    async fn find_version_by_name(&self, name: &str) -> Option<GameVersionInfo> {
        let entry = self.manifest().await?.find_version(name)?;
        Some(GameVersionInfo {
            name: entry.id.clone(),
            is_snapshot: entry.is_snapshot(),
        })
    }
}

/// Fixed in-memory table, for offline runs and tests.
#[derive(Debug, Default, Clone)]
pub struct StaticVersionLookup {
    versions: HashMap<String, GameVersionInfo>,
}

impl StaticVersionLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, name: &str, is_snapshot: bool) -> Self {
        self.versions.insert(
            name.to_string(),
            GameVersionInfo {
                name: name.to_string(),
                is_snapshot,
            },
        );
        self
    }
}

#[async_trait]
impl GameVersionLookup for StaticVersionLookup {
    async fn find_version_by_name(&self, name: &str) -> Option<GameVersionInfo> {
        self.versions.get(name).cloned()
    }
}
