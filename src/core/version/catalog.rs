// ─── Platform Version Catalog ───
// CurseForge identifies game versions, loaders and Java runtimes by numeric
// ids. The catalog is fetched once per process and reused by every publish.

use std::collections::HashSet;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::core::error::{ClassifiedError, PublishError, PublishResult};
use crate::core::http::{classify_response, read_body, send};

const HTML_INSTEAD_OF_JSON: &str = "CurseForge sometimes returns Cloudflare's HTML page instead of its API response. \
     Just wait 15-20 minutes, then try re-running the publish, and you should be fine.";

/// A version type of the taxonomy (`minecraft-1-20`, `modloader`, `java`, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionType {
    pub id: u64,
    pub slug: String,
}

/// One numerically identified version known to the platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionEntry {
    pub id: u64,
    #[serde(rename = "gameVersionTypeID", default)]
    pub version_type_id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlatformVersionCatalog {
    pub game_versions: Vec<VersionEntry>,
    pub loaders: Vec<VersionEntry>,
    pub runtime_versions: Vec<VersionEntry>,
}

impl PlatformVersionCatalog {
    /// Bucket `versions` by the slug prefix of their version type.
    pub fn from_taxonomy(types: &[VersionType], versions: Vec<VersionEntry>) -> Self {
        let ids_with_prefix = |prefix: &str| -> HashSet<u64> {
            types
                .iter()
                .filter(|t| t.slug.starts_with(prefix))
                .map(|t| t.id)
                .collect()
        };
        let runtime_types = ids_with_prefix("java");
        let game_types = ids_with_prefix("minecraft");
        let loader_types = ids_with_prefix("modloader");

        let mut catalog = Self::default();
        for version in versions {
            if runtime_types.contains(&version.version_type_id) {
                catalog.runtime_versions.push(version);
            } else if game_types.contains(&version.version_type_id) {
                catalog.game_versions.push(version);
            } else if loader_types.contains(&version.version_type_id) {
                catalog.loaders.push(version);
            }
        }
        catalog
    }

    /// Fetch the taxonomy and the version list from `base_url`.
    pub async fn fetch(client: &reqwest::Client, base_url: &str, token: &str) -> PublishResult<Self> {
        info!("Fetching CurseForge version catalog...");

        let types: Vec<VersionType> =
            fetch_json_array(client, &format!("{}/game/version-types", base_url), token).await?;
        let versions: Vec<VersionEntry> =
            fetch_json_array(client, &format!("{}/game/versions", base_url), token).await?;

        let catalog = Self::from_taxonomy(&types, versions);
        info!(
            "Loaded {} game versions, {} loaders, {} Java versions",
            catalog.game_versions.len(),
            catalog.loaders.len(),
            catalog.runtime_versions.len()
        );
        Ok(catalog)
    }
}

/// GET a JSON array, treating anything that is not an array as a transient
/// platform hiccup.
pub async fn fetch_json_array<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    token: &str,
) -> PublishResult<Vec<T>> {
    let response = send("Failed to fetch versions", client.get(url).query(&[("token", token)]))
        .await
        .map_err(PublishError::CatalogFetch)?;
    if !response.status().is_success() {
        return Err(PublishError::CatalogFetch(
            classify_response("Failed to fetch versions", response).await,
        ));
    }

    let body = read_body("Failed to fetch versions", response)
        .await
        .map_err(PublishError::CatalogFetch)?;
    let value = match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(value @ serde_json::Value::Array(_)) => value,
        _ => {
            debug!("Expected a JSON array from {}, got {} bytes of something else", url, body.len());
            return Err(PublishError::CatalogFetch(ClassifiedError::soft(HTML_INSTEAD_OF_JSON)));
        }
    };

    serde_json::from_value(value).map_err(|e| {
        PublishError::CatalogFetch(ClassifiedError::hard(format!(
            "Unexpected version entry shape from {}: {}",
            url, e
        )))
    })
}

/// Process-wide catalog holder. Populated at most once until [`reset`].
///
/// Two concurrent first uses may both fetch; the last one wins and both
/// results are identical.
///
/// [`reset`]: CatalogCache::reset
#[derive(Debug, Default)]
pub struct CatalogCache {
    catalog: RwLock<Option<Arc<PlatformVersionCatalog>>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Option<Arc<PlatformVersionCatalog>> {
        self.catalog.read().await.clone()
    }

    pub async fn get_or_load<F, Fut>(&self, load: F) -> PublishResult<Arc<PlatformVersionCatalog>>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = PublishResult<PlatformVersionCatalog>>,
    {
        if let Some(catalog) = self.get().await {
            return Ok(catalog);
        }

        let catalog = Arc::new(load().await?);
        *self.catalog.write().await = Some(catalog.clone());
        Ok(catalog)
    }

    pub async fn reset(&self) {
        *self.catalog.write().await = None;
    }
}
