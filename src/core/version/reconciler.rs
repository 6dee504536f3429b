use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use super::catalog::{CatalogCache, PlatformVersionCatalog, VersionEntry};
use super::lookup::GameVersionLookup;
use super::normalize::{unify_game_version, unify_java, unify_loader};
use crate::core::error::PublishResult;

/// Free-form version declarations of a release.
#[derive(Debug, Clone, Default)]
pub struct VersionQuery<'a> {
    pub game_versions: &'a [String],
    pub loaders: &'a [String],
    pub runtime_versions: &'a [String],
}

/// Translates version declarations into a platform's numeric version ids.
pub struct VersionReconciler {
    cache: Arc<CatalogCache>,
    lookup: Arc<dyn GameVersionLookup>,
}

impl VersionReconciler {
    pub fn new(cache: Arc<CatalogCache>, lookup: Arc<dyn GameVersionLookup>) -> Self {
        Self { cache, lookup }
    }

    pub fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    /// Load (or reuse) the CurseForge catalog and intersect `query` with it.
    pub async fn reconcile(
        &self,
        client: &reqwest::Client,
        base_url: &str,
        token: &str,
        query: VersionQuery<'_>,
    ) -> PublishResult<Vec<u64>> {
        let catalog = self
            .cache
            .get_or_load(|| PlatformVersionCatalog::fetch(client, base_url, token))
            .await?;
        Ok(self.reconcile_with(&catalog, query).await)
    }

    /// Intersect `query` with an already loaded catalog.
    ///
    /// Versions the platform does not know are skipped, not reported.
    pub async fn reconcile_with(
        &self,
        catalog: &PlatformVersionCatalog,
        query: VersionQuery<'_>,
    ) -> Vec<u64> {
        let mut ids = BTreeSet::new();

        for game_version in query.game_versions {
            let unified = unify_game_version(self.lookup.as_ref(), game_version).await;
            add_match(&catalog.game_versions, &unified, |v| &v.name, &mut ids);
        }

        for loader in query.loaders {
            let unified = unify_loader(loader);
            add_match(&catalog.loaders, &unified, |v| &v.slug, &mut ids);
        }

        for java in query.runtime_versions {
            let unified = unify_java(java);
            add_match(&catalog.runtime_versions, &unified, |v| &v.name, &mut ids);
        }

        ids.into_iter().collect()
    }
}

fn add_match(
    entries: &[VersionEntry],
    unified: &str,
    key: impl Fn(&VersionEntry) -> &String,
    ids: &mut BTreeSet<u64>,
) {
    match entries.iter().find(|entry| key(entry) == unified) {
        Some(entry) => {
            ids.insert(entry.id);
        }
        None => debug!("Platform does not know version \"{}\", skipping", unified),
    }
}
