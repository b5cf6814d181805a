//! HTTP implementation of the flag gateway.
//!
//! One reqwest client, one request per gateway method. Every request
//! carries the service access token in the `Authorization` header.
//! Timeouts, pooling, and TLS belong to reqwest; nothing is retried here.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, StatusCode};
use serde::Serialize;

use crate::error::{Error, Result};

use super::gateway::FlagGateway;
use super::types::{
    EnvironmentInfo, FlagDocument, FlagStatus, PatchOperation, SemanticInstruction,
};

/// Content type marker that switches the PATCH endpoint from raw
/// JSON-patch semantics to semantic-patch instructions.
pub const SEMANTIC_PATCH_CONTENT_TYPE: &str =
    "application/json; domain-model=launchdarkly.semanticpatch";

/// Client for the flag management REST API.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Body of a semantic patch request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SemanticPatchRequest<'a> {
    environment_key: &'a str,
    instructions: &'a [&'a SemanticInstruction],
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
}

/// Body of a raw document patch request.
#[derive(Debug, Serialize)]
struct DocumentPatchRequest<'a> {
    patch: &'a [PatchOperation],
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
}

/// Environment listing envelope.
#[derive(Debug, serde::Deserialize)]
struct EnvironmentsResponse {
    #[serde(default)]
    items: Vec<EnvironmentInfo>,
}

impl ApiClient {
    /// Create a client against the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key: api_key.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET a resource, mapping 404 to `None` and any other non-success
    /// status to a service error.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        tracing::debug!(url, "GET");

        let response = self
            .client
            .get(url)
            .header("Authorization", &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check_status(response).await?;

        Ok(Some(response.json().await?))
    }

    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(Error::Service {
            status: status.as_u16(),
            message: if message.is_empty() {
                status.to_string()
            } else {
                message
            },
        })
    }

    /// Submit a PATCH body with the given content type.
    ///
    /// Returns the success reported by the service; the response body of
    /// a failed patch is logged, not surfaced.
    async fn patch(&self, url: &str, content_type: &str, body: Vec<u8>) -> Result<bool> {
        tracing::debug!(url, content_type, "PATCH");

        let response = self
            .client
            .patch(url)
            .header("Authorization", &self.api_key)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(true)
        } else {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), message, "patch rejected");
            Ok(false)
        }
    }
}

impl FlagGateway for ApiClient {
    async fn get_flag(&self, project_key: &str, flag_key: &str) -> Result<Option<FlagDocument>> {
        let url = self.url(&format!("/api/v2/flags/{project_key}/{flag_key}"));
        self.get_json(&url).await
    }

    async fn get_project_environments(&self, project_key: &str) -> Result<Vec<EnvironmentInfo>> {
        let url = self.url(&format!("/api/v2/projects/{project_key}/environments"));
        let listing: Option<EnvironmentsResponse> = self.get_json(&url).await?;
        Ok(listing.map(|l| l.items).unwrap_or_default())
    }

    async fn get_flag_status(
        &self,
        project_key: &str,
        flag_key: &str,
        environment_key: Option<&str>,
    ) -> Result<Option<FlagStatus>> {
        let url = match environment_key {
            Some(env) => {
                self.url(&format!("/api/v2/flag-statuses/{project_key}/{env}/{flag_key}"))
            }
            None => self.url(&format!("/api/v2/flag-status/{project_key}/{flag_key}")),
        };
        self.get_json(&url).await
    }

    async fn apply_semantic_instruction(
        &self,
        project_key: &str,
        flag_key: &str,
        environment_key: &str,
        instruction: &SemanticInstruction,
        comment: Option<&str>,
    ) -> Result<bool> {
        let url = self.url(&format!("/api/v2/flags/{project_key}/{flag_key}"));
        let request = SemanticPatchRequest {
            environment_key,
            instructions: &[instruction],
            comment,
        };
        let body = serde_json::to_vec(&request)?;
        self.patch(&url, SEMANTIC_PATCH_CONTENT_TYPE, body).await
    }

    async fn apply_document_patch(
        &self,
        project_key: &str,
        flag_key: &str,
        operations: &[PatchOperation],
        comment: Option<&str>,
    ) -> Result<bool> {
        let url = self.url(&format!("/api/v2/flags/{project_key}/{flag_key}"));
        let request = DocumentPatchRequest { patch: operations, comment };
        let body = serde_json::to_vec(&request)?;
        self.patch(&url, "application/json", body).await
    }
}
