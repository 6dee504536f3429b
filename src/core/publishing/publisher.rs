use std::sync::Arc;

use async_trait::async_trait;

use super::curseforge::{CurseForgeApi, CurseForgePublisher};
use super::polymart::{PolymartApi, PolymartPublisher};
use super::request::{PublishRequest, PublishedVersion};
use super::target::PublisherTarget;
use crate::core::error::PublishResult;
use crate::core::state::PublishSettings;
use crate::core::version::VersionReconciler;

/// Common contract for every target platform.
#[async_trait]
pub trait TargetPublisher: Send + Sync {
    fn target(&self) -> PublisherTarget;

    /// Publish one version and report what the platform created.
    async fn publish(&self, request: &PublishRequest) -> PublishResult<PublishedVersion>;
}

/// Closed set of publishers, one per target.
pub enum Publisher {
    CurseForge(CurseForgePublisher),
    Polymart(PolymartPublisher),
}

impl Publisher {
    pub fn new(
        target: PublisherTarget,
        client: reqwest::Client,
        settings: &PublishSettings,
        reconciler: Arc<VersionReconciler>,
    ) -> Self {
        match target {
            PublisherTarget::CurseForge => Publisher::CurseForge(CurseForgePublisher::new(
                CurseForgeApi::new(client, settings.curseforge_api_base.clone()),
                reconciler,
            )),
            PublisherTarget::Polymart => Publisher::Polymart(PolymartPublisher::new(
                PolymartApi::new(client, settings.polymart_api_base.clone()),
            )),
        }
    }

    pub fn target(&self) -> PublisherTarget {
        match self {
            Publisher::CurseForge(p) => p.target(),
            Publisher::Polymart(p) => p.target(),
        }
    }

    pub async fn publish(&self, request: &PublishRequest) -> PublishResult<PublishedVersion> {
        match self {
            Publisher::CurseForge(p) => p.publish(request).await,
            Publisher::Polymart(p) => p.publish(request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::version::{CatalogCache, StaticVersionLookup};

    #[test]
    fn dispatches_by_target() {
        let reconciler = Arc::new(VersionReconciler::new(
            Arc::new(CatalogCache::new()),
            Arc::new(StaticVersionLookup::new()),
        ));
        let settings = PublishSettings::default();

        for target in PublisherTarget::ALL {
            let publisher =
                Publisher::new(target, reqwest::Client::new(), &settings, reconciler.clone());
            assert_eq!(publisher.target(), target);
        }
    }
}
