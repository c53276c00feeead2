//! Dialogflow - Client for the entity type administration API
//!
//! Covers the two calls this service makes: creating agent-level entity
//! types at setup time, and creating session-scoped entity type
//! overrides while a conversation is in progress.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::TriviaConfig;
use crate::dataset::StreetEntry;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Dialogflow request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Dialogflow returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Dialogflow access token not configured")]
    MissingToken,
}

/// Parent path of all agent resources for a project
pub fn agent_path(project_id: &str) -> String {
    format!("projects/{}/agent", project_id)
}

/// Name of a session-scoped override of an agent entity type
pub fn session_entity_type_name(session: &str, display_name: &str) -> String {
    format!("{}/entityTypes/{}", session, display_name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    #[serde(rename = "KIND_MAP")]
    Map,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityOverrideMode {
    /// Session entities replace the agent's entities
    #[serde(rename = "ENTITY_OVERRIDE_MODE_OVERRIDE")]
    Override,
    /// Session entities are added to the agent's entities. Not sent by
    /// this service; kept so every API value round-trips.
    #[serde(rename = "ENTITY_OVERRIDE_MODE_SUPPLEMENT")]
    Supplement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub value: String,
    pub synonyms: Vec<String>,
}

impl From<&StreetEntry> for Entity {
    fn from(street: &StreetEntry) -> Self {
        Self {
            value: street.value.clone(),
            synonyms: street.synonyms.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityType {
    /// Server-assigned resource name, present in responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub display_name: String,
    pub kind: EntityKind,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEntityType {
    pub name: String,
    pub entity_override_mode: EntityOverrideMode,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

/// Entity type administration calls
#[async_trait]
pub trait EntityTypesApi: Send + Sync {
    /// Create an entity type under `parent` (an agent path)
    async fn create_entity_type(
        &self,
        parent: &str,
        entity_type: &EntityType,
    ) -> Result<EntityType, ApiError>;

    /// Create a session entity type under `session`
    async fn create_session_entity_type(
        &self,
        session: &str,
        session_entity_type: &SessionEntityType,
    ) -> Result<SessionEntityType, ApiError>;
}

/// REST implementation of [`EntityTypesApi`]
#[derive(Clone)]
pub struct DialogflowClient {
    http_client: Client,
    base_url: String,
    access_token: String,
}

impl DialogflowClient {
    pub fn new(config: &TriviaConfig) -> Result<Self, ApiError> {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        })
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + Sync,
        R: for<'de> Deserialize<'de>,
    {
        if self.access_token.is_empty() {
            return Err(ApiError::MissingToken);
        }

        let url = format!("{}/v2/{}", self.base_url, path);
        debug!(%url, "Calling Dialogflow");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<R>().await?)
    }
}

#[async_trait]
impl EntityTypesApi for DialogflowClient {
    async fn create_entity_type(
        &self,
        parent: &str,
        entity_type: &EntityType,
    ) -> Result<EntityType, ApiError> {
        self.post(&format!("{}/entityTypes", parent), entity_type)
            .await
    }

    async fn create_session_entity_type(
        &self,
        session: &str,
        session_entity_type: &SessionEntityType,
    ) -> Result<SessionEntityType, ApiError> {
        self.post(&format!("{}/entityTypes", session), session_entity_type)
            .await
    }
}
