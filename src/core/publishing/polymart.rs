// ─── Polymart ───
// Plain form fields, every file in the same multipart body, and a
// `{ request, response: { success, ... } }` envelope around every reply.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::multipart::Form;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

use super::publisher::TargetPublisher;
use super::request::{PublishFile, PublishRequest, PublishedVersion};
use super::target::PublisherTarget;
use crate::core::error::{ClassifiedError, PublishError, PublishResult};
use crate::core::http::{classify_response, read_body, send};

pub const POLYMART_API_BASE: &str = "https://api.polymart.org/v1";

/// Polymart sends ids and counters as strings or numbers depending on the
/// endpoint.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(if b { "1" } else { "0" }.to_string()),
        _ => Ok(String::new()),
    }
}

#[derive(Debug, Deserialize)]
struct PolymartEnvelope {
    response: PolymartResponse,
}

#[derive(Debug, Deserialize)]
struct PolymartResponse {
    success: bool,
    #[serde(default)]
    errors: serde_json::Value,
    update: Option<Update>,
    updates: Option<Vec<Update>>,
    resource: Option<Resource>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Update {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub version: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub download_ready: Option<bool>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub time: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub snapshot: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub beta: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Owner {
    pub name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "type", default)]
    pub owner_type: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LatestUpdate {
    pub latest: Option<Update>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub owner: Option<Owner>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub price: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub supported_minecraft_versions: Vec<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub downloads: String,
    pub updates: Option<LatestUpdate>,
    pub url: Option<String>,
}

/// Text fields of a `postUpdate` call, in the order they are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolymartUpdateForm {
    pub resource_id: String,
    pub api_key: String,
    pub title: String,
    pub version_number: String,
    pub message: String,
    pub beta: &'static str,
    pub snapshot: &'static str,
    pub game_versions: Vec<String>,
    pub loaders: Vec<String>,
}

impl PolymartUpdateForm {
    pub fn from_request(request: &PublishRequest) -> Self {
        Self {
            resource_id: request.target_id.clone(),
            api_key: request.token.clone(),
            title: request.title().to_string(),
            version_number: request.version.clone(),
            message: request.changelog.clone(),
            beta: request.channel.beta_flag(),
            snapshot: request.channel.snapshot_flag(),
            game_versions: request.game_versions.clone(),
            loaders: request.loaders.clone(),
        }
    }

    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("resource_id", self.resource_id.clone()),
            ("api_key", self.api_key.clone()),
            ("title", self.title.clone()),
            ("version_number", self.version_number.clone()),
            ("message", self.message.clone()),
            ("beta", self.beta.to_string()),
            ("snapshot", self.snapshot.to_string()),
        ];
        fields.extend(self.game_versions.iter().map(|v| ("game_versions[]", v.clone())));
        fields.extend(self.loaders.iter().map(|l| ("loaders[]", l.clone())));
        fields
    }
}

/// Client for the Polymart v1 API.
pub struct PolymartApi {
    client: reqwest::Client,
    base_url: String,
}

impl PolymartApi {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Post a new update with every file attached under `file`.
    pub async fn create_version(
        &self,
        form: &PolymartUpdateForm,
        files: &[PublishFile],
    ) -> PublishResult<Update> {
        let mut multipart = Form::new();
        for (key, value) in form.fields() {
            multipart = multipart.text(key, value);
        }
        for file in files {
            debug!("Attaching {} to the Polymart update", file.name);
            multipart = multipart.part("file", file.to_part().await?);
        }

        let request = self
            .client
            .post(format!("{}/postUpdate", self.base_url))
            .multipart(multipart);
        let response = send("Failed to post update", request)
            .await
            .map_err(PublishError::Upload)?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(PublishError::Upload(
                classify_response("Failed to post update", response).await,
            ));
        }

        let body = Self::decode("Failed to post update", response, PublishError::Upload).await?;
        body.update.ok_or_else(|| {
            PublishError::MalformedResponse("Polymart did not return the created update".into())
        })
    }

    /// `None` when the resource does not exist.
    pub async fn get_resource(&self, resource_id: &str) -> PublishResult<Option<Resource>> {
        let request = self
            .client
            .get(format!("{}/getResourceInfo", self.base_url))
            .query(&[("resource_id", resource_id)]);
        let response = send("Failed to fetch resource", request)
            .await
            .map_err(PublishError::Request)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(PublishError::Request(
                classify_response("Failed to fetch resource", response).await,
            ));
        }

        let body = Self::decode("Failed to fetch resource", response, PublishError::Request).await?;
        Ok(body.resource)
    }

    /// Empty when the resource does not exist.
    pub async fn get_resource_updates(&self, resource_id: &str) -> PublishResult<Vec<Update>> {
        let request = self
            .client
            .get(format!("{}/getResourceUpdates", self.base_url))
            .query(&[("resource_id", resource_id)]);
        let response = send("Failed to fetch resource updates", request)
            .await
            .map_err(PublishError::Request)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(PublishError::Request(
                classify_response("Failed to fetch resource updates", response).await,
            ));
        }

        let body =
            Self::decode("Failed to fetch resource updates", response, PublishError::Request).await?;
        Ok(body.updates.unwrap_or_default())
    }

    async fn decode(
        context: &str,
        response: reqwest::Response,
        transport: fn(ClassifiedError) -> PublishError,
    ) -> PublishResult<PolymartResponse> {
        let body = read_body(context, response).await.map_err(transport)?;
        let envelope: PolymartEnvelope = serde_json::from_str(&body)
            .map_err(|e| PublishError::MalformedResponse(format!("Polymart response: {}", e)))?;

        if !envelope.response.success {
            return Err(PublishError::MalformedResponse(format!(
                "Polymart reported failure: {}",
                envelope.response.errors
            )));
        }
        Ok(envelope.response)
    }
}

pub struct PolymartPublisher {
    api: PolymartApi,
}

impl PolymartPublisher {
    pub fn new(api: PolymartApi) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &PolymartApi {
        &self.api
    }
}

#[async_trait]
impl TargetPublisher for PolymartPublisher {
    fn target(&self) -> PublisherTarget {
        PublisherTarget::Polymart
    }

    async fn publish(&self, request: &PublishRequest) -> PublishResult<PublishedVersion> {
        let started = Instant::now();
        info!("Publishing {} to Polymart", request.version);

        let files = request.require_files()?;
        let form = PolymartUpdateForm::from_request(request);
        let update = self.api.create_version(&form, files).await?;

        info!(
            "Published {} to Polymart as update {} in {:.2?}",
            request.version,
            update.id,
            started.elapsed()
        );
        Ok(PublishedVersion {
            target: PublisherTarget::Polymart,
            id: update.id,
            version: update.version.or_else(|| Some(request.version.clone())),
            url: update.url,
        })
    }
}
