use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::error::{PublishError, PublishResult};
use crate::core::http::{build_http_client, APP_USER_AGENT};
use crate::core::publishing::{Publisher, PublisherTarget, CURSEFORGE_API_BASE, POLYMART_API_BASE};
use crate::core::version::{
    CatalogCache, GameVersionLookup, MojangVersionLookup, VersionReconciler, VERSION_MANIFEST_URL,
};

const APP_DIR_NAME: &str = "mc-publish";
const SETTINGS_FILE: &str = "publish_settings.json";

/// Endpoints and client identity, persisted as JSON in the config dir.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PublishSettings {
    pub curseforge_api_base: String,
    pub polymart_api_base: String,
    pub user_agent: String,
    pub version_manifest_url: String,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            curseforge_api_base: CURSEFORGE_API_BASE.to_string(),
            polymart_api_base: POLYMART_API_BASE.to_string(),
            user_agent: APP_USER_AGENT.to_string(),
            version_manifest_url: VERSION_MANIFEST_URL.to_string(),
        }
    }
}

impl PublishSettings {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME)
            .join(SETTINGS_FILE)
    }

    /// Missing or unreadable settings fall back to the defaults.
    pub fn load_from(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => {
                debug!("No settings at {}, using defaults", path.display());
                return Self::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Ignoring malformed settings at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> PublishResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| PublishError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| PublishError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Shared services for every publish call in the process.
pub struct AppState {
    pub settings: PublishSettings,
    pub http_client: Client,
    pub catalog_cache: Arc<CatalogCache>,
    pub version_lookup: Arc<dyn GameVersionLookup>,
    pub reconciler: Arc<VersionReconciler>,
}

impl AppState {
    /// State built from the settings file in the user's config dir.
    pub fn new() -> PublishResult<Self> {
        Self::with_settings(PublishSettings::load_from(&PublishSettings::default_path()))
    }

    pub fn with_settings(settings: PublishSettings) -> PublishResult<Self> {
        let http_client = build_http_client(&settings.user_agent)?;
        let lookup: Arc<dyn GameVersionLookup> = Arc::new(MojangVersionLookup::new(
            http_client.clone(),
            settings.version_manifest_url.clone(),
        ));
        Ok(Self::with_lookup(settings, http_client, lookup))
    }

    /// State with an explicit game version lookup, e.g. an offline table.
    pub fn with_lookup(
        settings: PublishSettings,
        http_client: Client,
        version_lookup: Arc<dyn GameVersionLookup>,
    ) -> Self {
        let catalog_cache = Arc::new(CatalogCache::new());
        let reconciler = Arc::new(VersionReconciler::new(
            catalog_cache.clone(),
            version_lookup.clone(),
        ));
        Self {
            settings,
            http_client,
            catalog_cache,
            version_lookup,
            reconciler,
        }
    }

    pub fn publisher(&self, target: PublisherTarget) -> Publisher {
        Publisher::new(
            target,
            self.http_client.clone(),
            &self.settings,
            self.reconciler.clone(),
        )
    }

    pub fn save_settings(&self) -> PublishResult<()> {
        self.settings.save_to(&PublishSettings::default_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_settings_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = PublishSettings::load_from(&dir.path().join("nope.json"));
        assert_eq!(settings, PublishSettings::default());
        assert_eq!(settings.polymart_api_base, "https://api.polymart.org/v1");
    }

    #[test]
    fn partial_settings_fill_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, r#"{ "curseforge_api_base": "http://localhost:1234" }"#).unwrap();

        let settings = PublishSettings::load_from(&path);
        assert_eq!(settings.curseforge_api_base, "http://localhost:1234");
        assert_eq!(settings.user_agent, APP_USER_AGENT);
    }

    #[test]
    fn settings_survive_a_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);
        let settings = PublishSettings {
            polymart_api_base: "http://localhost:9999".into(),
            ..Default::default()
        };

        settings.save_to(&path).unwrap();
        assert_eq!(PublishSettings::load_from(&path), settings);
    }

    #[test]
    fn malformed_settings_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(PublishSettings::load_from(&path), PublishSettings::default());
    }
}
