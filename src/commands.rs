use std::path::Path;

use futures_util::future::join_all;
use tracing::{error, info, warn};

use crate::core::error::{PublishError, PublishResult};
use crate::core::metadata::{MetadataReader, ModMetadata};
use crate::core::publishing::{PublishRequest, PublishedVersion, PublisherTarget};
use crate::core::state::AppState;

/// Read the loader descriptor out of a built jar.
pub async fn read_mod_metadata(loader_tag: &str, path: &Path) -> PublishResult<ModMetadata> {
    let reader = MetadataReader::from_tag(loader_tag)?;
    info!("Reading {} from {}", reader.config_file_name(), path.display());
    reader.read_file(path).await
}

/// Seed a request for `target` from what the descriptor already declares.
///
/// Files, token, channel and changelog are left to the caller.
pub fn request_from_metadata(
    metadata: &ModMetadata,
    target: PublisherTarget,
) -> PublishResult<PublishRequest> {
    let target_id = metadata.project_id(target).ok_or_else(|| {
        PublishError::Other(format!(
            "{} does not declare a {} project id",
            metadata.id, target
        ))
    })?;

    Ok(PublishRequest {
        target_id: target_id.to_string(),
        name: metadata.name.clone(),
        version: metadata.version.clone(),
        loaders: metadata.loaders.clone(),
        dependencies: metadata.published_dependencies().cloned().collect(),
        ..Default::default()
    })
}

pub async fn publish(
    state: &AppState,
    target: PublisherTarget,
    request: &PublishRequest,
) -> PublishResult<PublishedVersion> {
    let result = state.publisher(target).publish(request).await;
    match &result {
        Ok(published) => info!("{} accepted {} as {}", target, request.version, published.id),
        Err(e) if e.is_soft() => warn!("{} publish failed, retry later: {}", target, e),
        Err(e) => error!("{} publish failed: {}", target, e),
    }
    result
}

/// Publish to several targets at once. Results come back in request order.
pub async fn publish_all(
    state: &AppState,
    requests: Vec<(PublisherTarget, PublishRequest)>,
) -> Vec<(PublisherTarget, PublishResult<PublishedVersion>)> {
    let pending = requests.iter().map(|(target, request)| async move {
        (*target, publish(state, *target, request).await)
    });
    join_all(pending).await
}

/// One-line explanation of an error for the person running the publish.
pub fn describe_error(err: &PublishError) -> String {
    if err.is_soft() {
        return format!("Temporary failure, try again in a few minutes. {}", err);
    }
    match err.classified() {
        Some(classified) => match classified.detail.as_ref().and_then(|d| d.get("errorMessage")) {
            Some(serde_json::Value::String(message)) => {
                format!("Publishing failed: {} ({})", message, classified.message)
            }
            _ => format!("Publishing failed: {}", classified.message),
        },
        None => format!("Publishing failed: {}", err),
    }
}
