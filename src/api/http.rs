//! reqwest-backed client for the OpenAI Assistants API.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::api::AssistantsApi;
use crate::assistant::{Assistant, CreateAssistant, UpdateAssistant};
use crate::error::ApiError;

/// Beta opt-in header required by the Assistants endpoints.
const BETA_HEADER: (&str, &str) = ("OpenAI-Beta", "assistants=v2");

/// Body snippet length kept in status errors.
const ERROR_BODY_SNIPPET: usize = 200;

/// List responses arrive wrapped in a `data` envelope.
#[derive(Debug, Deserialize)]
struct ListEnvelope {
    data: Vec<Assistant>,
}

/// HTTP client for the `/assistants` resource.
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl OpenAiClient {
    pub fn new(base_url: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(self.api_key.expose_secret())
            .header(BETA_HEADER.0, BETA_HEADER.1)
    }

    /// Check the status and decode the body, keeping a snippet on failure.
    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_SNIPPET).collect(),
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl AssistantsApi for OpenAiClient {
    async fn list(&self, limit: usize) -> Result<Vec<Assistant>, ApiError> {
        let response = self
            .request(reqwest::Method::GET, "/assistants")
            .query(&[("limit", limit)])
            .send()
            .await?;
        let envelope: ListEnvelope = Self::read_json(response).await?;
        Ok(envelope.data)
    }

    async fn create(&self, fields: CreateAssistant) -> Result<Assistant, ApiError> {
        let response = self
            .request(reqwest::Method::POST, "/assistants")
            .json(&fields)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn update(&self, id: &str, fields: UpdateAssistant) -> Result<Assistant, ApiError> {
        let response = self
            .request(reqwest::Method::POST, &format!("/assistants/{id}"))
            .json(&fields)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("/assistants/{id}"))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_SNIPPET).collect(),
            });
        }
        Ok(())
    }
}
