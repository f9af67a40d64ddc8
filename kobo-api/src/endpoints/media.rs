//! Legacy media endpoint.

use reqwest::Method;
use serde_json::Value;

use kobo_core::error::KoboResult;

use crate::client::{ApiClient, ACCEPT_JSON};
use crate::response;

impl ApiClient {
    /// List media files known to the legacy API. Requires the legacy URL.
    pub async fn get_media(&self) -> KoboResult<Value> {
        let url = self.legacy_url(&["media"], "get_media")?;
        let request = self.build_request(Method::GET, url, ACCEPT_JSON, None);
        let resp = self.send(request).await?;
        response::handle_json(resp, response::STATUS_OK)
    }
}
