//! Single entry point for callers.
//!
//! `KoboClient` validates configuration, picks the backend for the
//! configured API version once, and forwards every call to it.

use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;

use kobo_core::config::{ClientConfig, ResolvedConfig};
use kobo_core::constants;
use kobo_core::error::{KoboError, KoboResult};

use crate::client::ApiClient;
use crate::models::{Asset, SubmissionFilter, SubmissionRecord};
use crate::response::AttachmentEnvelope;
use crate::transport::{ReqwestTransport, Transport};

/// Supported API versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V2,
}

impl ApiVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V2 => "v2",
        }
    }
}

impl FromStr for ApiVersion {
    type Err = KoboError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v2" => Ok(ApiVersion::V2),
            _ => Err(KoboError::UnsupportedVersion(s.to_string())),
        }
    }
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
enum Backend {
    V2(ApiClient),
}

/// KoboToolbox client.
#[derive(Debug, Clone)]
pub struct KoboClient {
    backend: Backend,
}

impl KoboClient {
    /// Create a client that talks HTTP through reqwest.
    pub fn new(config: &ClientConfig) -> KoboResult<Self> {
        let resolved = config.validate()?;
        let transport = ReqwestTransport::new(&resolved)?;
        Self::from_resolved(&resolved, Arc::new(transport))
    }

    /// Create a client that sends requests through `transport`.
    pub fn with_transport(config: &ClientConfig, transport: Arc<dyn Transport>) -> KoboResult<Self> {
        let resolved = config.validate()?;
        Self::from_resolved(&resolved, transport)
    }

    fn from_resolved(resolved: &ResolvedConfig, transport: Arc<dyn Transport>) -> KoboResult<Self> {
        let backend = match resolved.api_version.parse::<ApiVersion>()? {
            ApiVersion::V2 => Backend::V2(ApiClient::new(resolved, transport)),
        };
        Ok(Self { backend })
    }

    pub fn api_version(&self) -> ApiVersion {
        match self.backend {
            Backend::V2(_) => ApiVersion::V2,
        }
    }

    /// The underlying resource client.
    pub fn api(&self) -> &ApiClient {
        match &self.backend {
            Backend::V2(client) => client,
        }
    }

    pub async fn list_assets(&self, limit: u32, offset: u32, asset_type: &str) -> KoboResult<Value> {
        self.api().list_assets(limit, offset, asset_type).await
    }

    /// First page of surveys with the default page size.
    pub async fn list_surveys(&self) -> KoboResult<Value> {
        self.api()
            .list_assets(constants::DEFAULT_ASSET_LIMIT, 0, constants::DEFAULT_ASSET_TYPE)
            .await
    }

    pub async fn get_asset(&self, asset_id: &str) -> KoboResult<Asset> {
        self.api().get_asset(asset_id).await
    }

    pub async fn get_asset_content(&self, asset_id: &str) -> KoboResult<Value> {
        self.api().get_asset_content(asset_id).await
    }

    pub async fn list_submissions(&self, asset_id: &str, filter: &SubmissionFilter) -> KoboResult<Value> {
        self.api().list_submissions(asset_id, filter).await
    }

    pub async fn get_submission_raw(&self, asset_id: &str, submission_id: &str) -> KoboResult<SubmissionRecord> {
        self.api().get_submission_raw(asset_id, submission_id).await
    }

    pub async fn get_submission(
        &self,
        asset_id: &str,
        submission_id: &str,
        keep_fields: &[&str],
    ) -> KoboResult<SubmissionRecord> {
        self.api().get_submission(asset_id, submission_id, keep_fields).await
    }

    pub async fn get_edit_link(&self, asset_id: &str, submission_id: &str) -> KoboResult<Value> {
        self.api().get_edit_link(asset_id, submission_id).await
    }

    pub async fn list_attachments(
        &self,
        asset_id: &str,
        submission_id: &str,
        xpath: &str,
    ) -> KoboResult<AttachmentEnvelope> {
        self.api().list_attachments(asset_id, submission_id, xpath).await
    }

    pub async fn get_attachment(
        &self,
        asset_id: &str,
        submission_id: &str,
        attachment_id: &str,
    ) -> KoboResult<AttachmentEnvelope> {
        self.api().get_attachment(asset_id, submission_id, attachment_id).await
    }

    pub async fn get_media(&self) -> KoboResult<Value> {
        self.api().get_media().await
    }

    pub async fn submit_json(&self, asset_id: &str, data: &SubmissionRecord) -> KoboResult<Value> {
        self.api().submit_json(asset_id, data).await
    }

    pub async fn submit_xml(&self, asset_id: &str, data: &SubmissionRecord) -> KoboResult<Value> {
        self.api().submit_xml(asset_id, data).await
    }
}
