// ─── CurseForge ───
// One file per upload call. Extra files are attached to the first one through
// `parentFileID`, and versions are sent as reconciled numeric ids.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::publisher::TargetPublisher;
use super::request::{PublishFile, PublishRequest, PublishedVersion, ReleaseChannel};
use super::target::PublisherTarget;
use crate::core::error::{PublishError, PublishResult};
use crate::core::http::{classify_response, read_body, send};
use crate::core::metadata::{Dependency, DependencyKind};
use crate::core::version::{VersionQuery, VersionReconciler};

pub const CURSEFORGE_API_BASE: &str = "https://minecraft.curseforge.com/api";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CurseForgeProjectRelation {
    pub slug: String,
    #[serde(rename = "type")]
    pub relation_type: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CurseForgeRelations {
    pub projects: Vec<CurseForgeProjectRelation>,
}

/// JSON document sent in the `metadata` part of an upload.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CurseForgeUploadMetadata {
    pub changelog: String,
    pub changelog_type: &'static str,
    pub display_name: String,
    #[serde(rename = "parentFileID", skip_serializing_if = "Option::is_none")]
    pub parent_file_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_versions: Option<Vec<u64>>,
    pub release_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relations: Option<CurseForgeRelations>,
}

impl CurseForgeUploadMetadata {
    /// Drop fields the API rejects in combination.
    ///
    /// A child file inherits game versions and relations from its parent, and
    /// an empty relation list is omitted rather than sent.
    pub fn normalized(mut self) -> Self {
        let has_parent = self.parent_file_id.is_some();
        if self
            .relations
            .as_ref()
            .is_some_and(|r| r.projects.is_empty() || has_parent)
        {
            self.relations = None;
        }
        if has_parent {
            self.game_versions = None;
        }
        self
    }
}

#[derive(Debug, Deserialize)]
struct CurseForgeUploadResponse {
    id: u64,
}

fn release_type(channel: ReleaseChannel) -> &'static str {
    match channel {
        ReleaseChannel::Release => "release",
        ReleaseChannel::Beta => "beta",
        ReleaseChannel::Alpha => "alpha",
    }
}

fn relation_type(kind: DependencyKind) -> &'static str {
    match kind {
        DependencyKind::Depends => "requiredDependency",
        DependencyKind::Recommends => "optionalDependency",
        DependencyKind::Suggests => "tool",
        DependencyKind::Include => "embeddedLibrary",
        DependencyKind::Conflicts => "incompatible",
    }
}

/// Project relations for every dependency that is not ignored.
pub fn relations_for(dependencies: &[Dependency]) -> Vec<CurseForgeProjectRelation> {
    dependencies
        .iter()
        .filter(|d| !d.ignore)
        .map(|d| CurseForgeProjectRelation {
            slug: d.project_slug(PublisherTarget::CurseForge).to_string(),
            relation_type: relation_type(d.kind),
        })
        .collect()
}

/// Thin client for the CurseForge upload API.
pub struct CurseForgeApi {
    client: reqwest::Client,
    base_url: String,
}

impl CurseForgeApi {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload a single file and return the id CurseForge assigned to it.
    pub async fn upload_file(
        &self,
        project_id: &str,
        metadata: CurseForgeUploadMetadata,
        file: Part,
        token: &str,
    ) -> PublishResult<u64> {
        let metadata = metadata.normalized();
        let form = Form::new()
            .part("file", file)
            .text("metadata", serde_json::to_string(&metadata)?);

        let url = format!("{}/projects/{}/upload-file", self.base_url, project_id);
        let request = self.client.post(&url).query(&[("token", token)]).multipart(form);
        let response = send("Failed to upload file", request)
            .await
            .map_err(PublishError::Upload)?;

        if !response.status().is_success() {
            return Err(PublishError::Upload(
                classify_response("Failed to upload file", response).await,
            ));
        }

        let body = read_body("Failed to upload file", response)
            .await
            .map_err(PublishError::Upload)?;
        let uploaded: CurseForgeUploadResponse = serde_json::from_str(&body).map_err(|e| {
            PublishError::MalformedResponse(format!("CurseForge upload response: {}", e))
        })?;
        debug!("CurseForge accepted file {}", uploaded.id);
        Ok(uploaded.id)
    }
}

pub struct CurseForgePublisher {
    api: CurseForgeApi,
    reconciler: Arc<VersionReconciler>,
}

impl CurseForgePublisher {
    pub fn new(api: CurseForgeApi, reconciler: Arc<VersionReconciler>) -> Self {
        Self { api, reconciler }
    }

    fn metadata_for(
        request: &PublishRequest,
        version_ids: &[u64],
        parent_file_id: Option<u64>,
    ) -> CurseForgeUploadMetadata {
        CurseForgeUploadMetadata {
            changelog: request.changelog.clone(),
            changelog_type: "markdown",
            display_name: request.title().to_string(),
            parent_file_id,
            game_versions: Some(version_ids.to_vec()),
            release_type: release_type(request.channel),
            relations: Some(CurseForgeRelations {
                projects: relations_for(&request.dependencies),
            }),
        }
        .normalized()
    }

    async fn upload(
        &self,
        request: &PublishRequest,
        file: &PublishFile,
        metadata: CurseForgeUploadMetadata,
    ) -> PublishResult<u64> {
        debug!("Uploading {} to CurseForge", file.name);
        self.api
            .upload_file(&request.target_id, metadata, file.to_part().await?, &request.token)
            .await
    }
}

#[async_trait]
impl TargetPublisher for CurseForgePublisher {
    fn target(&self) -> PublisherTarget {
        PublisherTarget::CurseForge
    }

    async fn publish(&self, request: &PublishRequest) -> PublishResult<PublishedVersion> {
        let started = Instant::now();
        info!("Publishing {} to CurseForge", request.version);

        let files = request.require_files()?;
        let version_ids = self
            .reconciler
            .reconcile(
                self.api.client(),
                self.api.base_url(),
                &request.token,
                VersionQuery {
                    game_versions: &request.game_versions,
                    loaders: &request.loaders,
                    runtime_versions: &request.runtime_versions,
                },
            )
            .await?;
        if version_ids.is_empty() {
            warn!("None of the declared versions are known to CurseForge");
        }

        let (primary, children) = files
            .split_first()
            .ok_or_else(|| PublishError::Other("No files to publish".into()))?;

        let parent_id = self
            .upload(request, primary, Self::metadata_for(request, &version_ids, None))
            .await?;
        for child in children {
            self.upload(
                request,
                child,
                Self::metadata_for(request, &version_ids, Some(parent_id)),
            )
            .await?;
        }

        info!(
            "Published {} to CurseForge as file {} in {:.2?}",
            request.version,
            parent_id,
            started.elapsed()
        );
        Ok(PublishedVersion {
            target: PublisherTarget::CurseForge,
            id: parent_id.to_string(),
            version: Some(request.version.clone()),
            url: None,
        })
    }
}
