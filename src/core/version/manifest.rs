// ─── Version Manifest ───
// Handles fetching and parsing the Mojang version manifest v2, the
// authoritative list of game version names.

use serde::Deserialize;
use tracing::info;

use crate::core::error::{PublishError, PublishResult};

pub const VERSION_MANIFEST_URL: &str =
    "https://piston-meta.mojang.com/mc/game/version_manifest_v2.json";

/// Top-level Mojang version manifest.
#[derive(Debug, Deserialize)]
pub struct VersionManifest {
    pub versions: Vec<ManifestEntry>,
}

/// A single entry in the manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub version_type: String,
}

impl ManifestEntry {
    pub fn is_snapshot(&self) -> bool {
        self.version_type == "snapshot"
    }
}

impl VersionManifest {
    /// Fetch the version manifest using a shared HTTP client.
    pub async fn fetch(client: &reqwest::Client, url: &str) -> PublishResult<Self> {
        info!("Fetching Minecraft version manifest...");

        let response = client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(PublishError::Other(format!(
                "Version manifest returned {} for {}",
                response.status(),
                url
            )));
        }
        let manifest: VersionManifest = response.json().await?;

        info!("Loaded {} versions from manifest", manifest.versions.len());
        Ok(manifest)
    }

    /// Find a specific version entry by ID (e.g. "1.20.4").
    pub fn find_version(&self, id: &str) -> Option<&ManifestEntry> {
        self.versions.iter().find(|v| v.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_manifest() {
        let json = r#"{
            "latest": { "release": "1.20.4", "snapshot": "24w03a" },
            "versions": [
                { "id": "24w03a", "type": "snapshot", "releaseTime": "2024-01-17T12:00:00+00:00" },
                { "id": "1.20.4", "type": "release", "releaseTime": "2023-12-07T08:00:00+00:00" }
            ]
        }"#;
        let manifest: VersionManifest = serde_json::from_str(json).unwrap();

        assert!(manifest.find_version("24w03a").unwrap().is_snapshot());
        assert!(!manifest.find_version("1.20.4").unwrap().is_snapshot());
        assert!(manifest.find_version("1.99").is_none());
    }
}
