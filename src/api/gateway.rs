//! Flag gateway trait.
//!
//! Defines the interface the command and patch layers depend on. The
//! production implementation is [`super::client::ApiClient`]; tests
//! substitute an in-memory fake.

use std::future::Future;

use crate::error::Result;

use super::types::{
    EnvironmentInfo, FlagDocument, FlagStatus, PatchOperation, SemanticInstruction,
};

/// Trait for the remote flag management service.
///
/// Every method maps to one request/response exchange. `None` means the
/// resource does not exist (HTTP 404); transport failures and non-success
/// statuses surface as errors.
pub trait FlagGateway: Send + Sync {
    /// Fetch a flag document, or `None` if the flag does not exist.
    fn get_flag(
        &self,
        project_key: &str,
        flag_key: &str,
    ) -> impl Future<Output = Result<Option<FlagDocument>>> + Send;

    /// Fetch a flag with derived display defaults filled in.
    ///
    /// Read-only convenience view; default implementation normalizes
    /// the plain document.
    fn get_flag_details(
        &self,
        project_key: &str,
        flag_key: &str,
    ) -> impl Future<Output = Result<Option<FlagDocument>>> + Send {
        async move {
            Ok(self
                .get_flag(project_key, flag_key)
                .await?
                .map(FlagDocument::into_normalized))
        }
    }

    /// List the project's environments, in service order.
    fn get_project_environments(
        &self,
        project_key: &str,
    ) -> impl Future<Output = Result<Vec<EnvironmentInfo>>> + Send;

    /// Fetch a flag's evaluation status, or `None` if none is recorded.
    ///
    /// With an environment key the status is environment-scoped;
    /// without one the service aggregates across environments.
    fn get_flag_status(
        &self,
        project_key: &str,
        flag_key: &str,
        environment_key: Option<&str>,
    ) -> impl Future<Output = Result<Option<FlagStatus>>> + Send;

    /// Apply one semantic instruction to a flag.
    ///
    /// Returns the success reported by the remote call.
    fn apply_semantic_instruction(
        &self,
        project_key: &str,
        flag_key: &str,
        environment_key: &str,
        instruction: &SemanticInstruction,
        comment: Option<&str>,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// Apply a raw document patch to a flag.
    fn apply_document_patch(
        &self,
        project_key: &str,
        flag_key: &str,
        operations: &[PatchOperation],
        comment: Option<&str>,
    ) -> impl Future<Output = Result<bool>> + Send;
}
