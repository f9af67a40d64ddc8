//! Submission attachment endpoints. Responses are returned as raw bytes.

use kobo_core::error::KoboResult;

use crate::client::ApiClient;
use crate::query::QueryParams;
use crate::response::AttachmentEnvelope;

impl ApiClient {
    /// List the attachments of a submission field, selected by its xpath.
    pub async fn list_attachments(
        &self,
        asset_id: &str,
        submission_id: &str,
        xpath: &str,
    ) -> KoboResult<AttachmentEnvelope> {
        let query: QueryParams = vec![("xpath".into(), xpath.into())];
        self.get_binary(
            &["assets", asset_id, "data", submission_id, "attachments", ""],
            &query,
        )
        .await
    }

    /// Download a single attachment.
    pub async fn get_attachment(
        &self,
        asset_id: &str,
        submission_id: &str,
        attachment_id: &str,
    ) -> KoboResult<AttachmentEnvelope> {
        self.get_binary(
            &["assets", asset_id, "data", submission_id, "attachments", attachment_id, ""],
            &QueryParams::new(),
        )
        .await
    }
}
