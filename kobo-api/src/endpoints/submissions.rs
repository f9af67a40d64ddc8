//! Submission endpoints: listing, reading, edit links and submitting data.

use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};

use kobo_core::constants;
use kobo_core::error::{KoboError, KoboResult};

use crate::client::{ApiClient, ACCEPT_JSON};
use crate::models::{SubmissionFilter, SubmissionRecord};
use crate::payload::normalize_submission;
use crate::query::{encode_submission_query, QueryParams};
use crate::response;
use crate::transport::{MultipartPart, RequestBody};
use crate::xml::{to_xml, XmlElement};

impl ApiClient {
    /// List submissions of an asset. Returns one page (`count`, `next`, `previous`, `results`).
    pub async fn list_submissions(
        &self,
        asset_id: &str,
        filter: &SubmissionFilter,
    ) -> KoboResult<Value> {
        let query = encode_submission_query(filter)?;
        self.get_json(&["assets", asset_id, "data", ""], &query)
            .await
    }

    /// Get a submission exactly as the server stores it.
    pub async fn get_submission_raw(
        &self,
        asset_id: &str,
        submission_id: &str,
    ) -> KoboResult<SubmissionRecord> {
        let value = self
            .get_json(
                &["assets", asset_id, "data", submission_id, ""],
                &QueryParams::new(),
            )
            .await?;
        match value {
            Value::Object(record) => Ok(record),
            other => Err(KoboError::Serialization(format!(
                "expected a submission object, got {other}"
            ))),
        }
    }

    /// Get a submission without platform metadata and with flattened field names.
    ///
    /// Metadata fields named in `keep_fields` are retained.
    pub async fn get_submission(
        &self,
        asset_id: &str,
        submission_id: &str,
        keep_fields: &[&str],
    ) -> KoboResult<SubmissionRecord> {
        let raw = self.get_submission_raw(asset_id, submission_id).await?;
        Ok(normalize_submission(&raw, keep_fields))
    }

    /// Get the Enketo edit link of a submission (`url`, `version_uid`).
    pub async fn get_edit_link(&self, asset_id: &str, submission_id: &str) -> KoboResult<Value> {
        self.get_json(
            &["assets", asset_id, "data", submission_id, "enketo", "edit", ""],
            &QueryParams::new(),
        )
        .await
    }

    /// Submit data as JSON through the legacy API. Requires the legacy URL.
    pub async fn submit_json(&self, asset_id: &str, data: &SubmissionRecord) -> KoboResult<Value> {
        let url = self.legacy_url(&["submissions"], "submit")?;

        let mut submission = data.clone();
        let instance_id = inject_instance_id(&mut submission);
        debug!("submitting json for {asset_id} as {instance_id}");

        let body = serde_json::to_vec(&json!({
            "id": asset_id,
            "submission": submission,
        }))?;
        let request = self.build_request(Method::POST, url, ACCEPT_JSON, Some(RequestBody::Json(body)));
        let resp = self.send(request).await?;
        response::handle_json(resp, response::STATUS_CREATED)
    }

    /// Submit data as an XML instance through the legacy API. Requires the legacy URL.
    ///
    /// Fetches the asset first for its deployment uuid, then posts the
    /// document. The two calls are not atomic.
    pub async fn submit_xml(&self, asset_id: &str, data: &SubmissionRecord) -> KoboResult<Value> {
        let url = self.legacy_url(&["submissions"], "submit_xml")?;

        let asset = self.get_asset(asset_id).await?;
        let deployment_uuid = asset
            .deployment_uuid()
            .ok_or_else(|| KoboError::MissingDeploymentUuid(asset_id.to_string()))?;

        let mut submission = data.clone();
        let instance_id = inject_instance_id(&mut submission);

        let mut root = XmlElement::new(asset_id);
        root.add_attribute("id", asset_id);
        root.add_child("formhub").add_text_child("uuid", deployment_uuid);
        to_xml(&Value::Object(submission), &mut root);
        let document = root.to_document()?;

        // Removed when `file` drops, whichever way this function returns.
        let temp_dir = self.temp_dir().map(Path::to_path_buf);
        let (file, contents) =
            tokio::task::spawn_blocking(move || stage_transient_xml(temp_dir, &document))
                .await
                .map_err(|e| KoboError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))??;
        debug!(
            "submitting xml for {asset_id} as {instance_id} via {}",
            file.path().display()
        );

        let part = MultipartPart {
            name: constants::XML_SUBMISSION_FIELD.into(),
            file_name: Some(constants::XML_SUBMISSION_FILE_NAME.into()),
            content_type: "application/xml".into(),
            data: contents,
        };
        let request = self.build_request(
            Method::POST,
            url,
            ACCEPT_JSON,
            Some(RequestBody::Multipart(vec![part])),
        );
        let resp = self.send(request).await?;
        let result = response::handle_json(resp, response::STATUS_CREATED)?;
        info!("xml submission for {asset_id} accepted");
        Ok(result)
    }
}

/// Set `meta.instanceID` to a fresh `uuid:<v4>` and return it.
fn inject_instance_id(submission: &mut SubmissionRecord) -> String {
    let instance_id = format!("uuid:{}", uuid::Uuid::new_v4());
    match submission.get_mut("meta") {
        Some(Value::Object(meta)) => {
            meta.insert("instanceID".into(), Value::String(instance_id.clone()));
        }
        _ => {
            submission.insert("meta".into(), json!({ "instanceID": instance_id }));
        }
    }
    instance_id
}

/// Write the document to a fresh temp file and read back the bytes to upload.
fn stage_transient_xml(
    dir: Option<PathBuf>,
    document: &str,
) -> KoboResult<(tempfile::NamedTempFile, Vec<u8>)> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("kobo-submission-").suffix(".xml");
    let mut file = match dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };
    file.write_all(document.as_bytes())?;
    file.flush()?;

    let mut contents = Vec::with_capacity(document.len());
    file.seek(SeekFrom::Start(0))?;
    file.read_to_end(&mut contents)?;
    Ok((file, contents))
}
