//! Asset endpoints.

use serde_json::Value;

use kobo_core::error::KoboResult;

use crate::client::ApiClient;
use crate::models::Asset;
use crate::query::{encode_asset_query, QueryParams};

impl ApiClient {
    /// List assets of one type. Returns one page (`count`, `next`, `previous`, `results`).
    pub async fn list_assets(&self, limit: u32, offset: u32, asset_type: &str) -> KoboResult<Value> {
        let query = encode_asset_query(limit, offset, asset_type);
        self.get_json(&["assets", ""], &query).await
    }

    /// Get the full form metadata of an asset.
    pub async fn get_asset(&self, asset_id: &str) -> KoboResult<Asset> {
        let data = self
            .get_json(&["assets", asset_id, ""], &QueryParams::new())
            .await?;
        Asset::from_value(asset_id, data)
    }

    /// Get the questions and labelled choices of an asset.
    pub async fn get_asset_content(&self, asset_id: &str) -> KoboResult<Value> {
        self.get_json(&["assets", asset_id, "content", ""], &QueryParams::new())
            .await
    }
}
