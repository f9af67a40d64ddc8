//! Resource client for the KoboToolbox REST API.
//!
//! Handles URL construction, authentication headers, the transport call and
//! response classification. The per-resource operations live in
//! `crate::endpoints` as further `impl ApiClient` blocks.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::{Method, Url};
use serde_json::Value;
use tracing::{debug, warn};

use kobo_core::config::ResolvedConfig;
use kobo_core::constants;
use kobo_core::error::{KoboError, KoboResult};

use crate::query::QueryParams;
use crate::response::{self, AttachmentEnvelope};
use crate::transport::{HttpRequest, HttpResponse, RequestBody, Transport};

/// Accept header for structured calls.
pub const ACCEPT_JSON: &str = "application/json";

/// Accept header for attachment calls.
pub const ACCEPT_ANY: &str = "*/*";

/// HTTP client for one KoboToolbox server.
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    /// Asset API root (e.g. "https://eu.kobotoolbox.org/api/v2").
    api_root: String,
    /// Legacy API root (e.g. "https://kc-eu.kobotoolbox.org/api/v1").
    legacy_root: Option<String>,
    api_key: String,
    /// Where transient submission files go; the system temp dir when unset.
    temp_dir: Option<PathBuf>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_root", &self.api_root)
            .field("legacy_root", &self.legacy_root)
            .field("temp_dir", &self.temp_dir)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client from validated configuration and a transport.
    pub fn new(config: &ResolvedConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            api_root: format!("{}{}", config.base_url, constants::API_V2_PREFIX),
            legacy_root: config
                .legacy_base_url
                .as_ref()
                .map(|u| format!("{u}{}", constants::API_V1_PREFIX)),
            api_key: config.api_key.clone(),
            temp_dir: config.temp_dir.clone(),
        }
    }

    /// Get the asset API root URL.
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// Get the legacy API root URL, if configured.
    pub fn legacy_root(&self) -> Option<&str> {
        self.legacy_root.as_deref()
    }

    /// Whether legacy operations are available.
    pub fn has_legacy(&self) -> bool {
        self.legacy_root.is_some()
    }

    pub(crate) fn temp_dir(&self) -> Option<&Path> {
        self.temp_dir.as_deref()
    }

    /// Full URL for path segments under the asset API.
    ///
    /// Each segment is percent-encoded; a trailing `""` yields a trailing slash.
    pub(crate) fn api_url(&self, segments: &[&str], query: &QueryParams) -> KoboResult<Url> {
        build_url(&self.api_root, segments, query)
    }

    /// Full URL for path segments under the legacy API.
    ///
    /// Fails with `Config` when no legacy URL was configured.
    pub(crate) fn legacy_url(&self, segments: &[&str], operation: &str) -> KoboResult<Url> {
        let root = self.legacy_root.as_deref().ok_or_else(|| {
            KoboError::Config(format!(
                "configuration must include a URL for API v1 to use {operation}()"
            ))
        })?;
        build_url(root, segments, &QueryParams::new())
    }

    /// Build a request carrying the token and accept headers.
    pub(crate) fn build_request(
        &self,
        method: Method,
        url: Url,
        accept: &str,
        body: Option<RequestBody>,
    ) -> HttpRequest {
        HttpRequest {
            method,
            url,
            headers: vec![
                ("Authorization".into(), format!("Token {}", self.api_key)),
                ("Accept".into(), accept.into()),
            ],
            body,
        }
    }

    /// Send a request, turning any transport failure into `Http` with status 0.
    pub(crate) async fn send(&self, request: HttpRequest) -> KoboResult<HttpResponse> {
        debug!("{} {}", request.method, request.url.path());
        self.transport.send(request).await.map_err(|e| {
            warn!("transport error: {e}");
            KoboError::transport(e)
        })
    }

    /// GET a JSON resource under the asset API.
    pub(crate) async fn get_json(&self, segments: &[&str], query: &QueryParams) -> KoboResult<Value> {
        let url = self.api_url(segments, query)?;
        let request = self.build_request(Method::GET, url, ACCEPT_JSON, None);
        let resp = self.send(request).await?;
        response::handle_json(resp, response::STATUS_OK)
    }

    /// GET a binary resource under the asset API.
    pub(crate) async fn get_binary(
        &self,
        segments: &[&str],
        query: &QueryParams,
    ) -> KoboResult<AttachmentEnvelope> {
        let url = self.api_url(segments, query)?;
        let request = self.build_request(Method::GET, url, ACCEPT_ANY, None);
        let resp = self.send(request).await?;
        response::handle_attachment(resp, response::STATUS_OK)
    }
}

fn build_url(root: &str, segments: &[&str], query: &QueryParams) -> KoboResult<Url> {
    let mut url = Url::parse(root)
        .map_err(|e| KoboError::Config(format!("invalid API root {root}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| KoboError::Config(format!("API root {root} cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    if !query.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::transport::TransportError;

    struct NoopTransport;

    #[async_trait]
    impl Transport for NoopTransport {
        async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse::new(200, "{}"))
        }
    }

    fn client(legacy: bool) -> ApiClient {
        let mut config = kobo_core::ClientConfig::new("https://eu.kobotoolbox.org/", "secret");
        if legacy {
            config = config.with_legacy_url("https://kc-eu.kobotoolbox.org");
        }
        ApiClient::new(&config.validate().unwrap(), Arc::new(NoopTransport))
    }

    #[test]
    fn test_roots() {
        let c = client(true);
        assert_eq!(c.api_root(), "https://eu.kobotoolbox.org/api/v2");
        assert_eq!(c.legacy_root(), Some("https://kc-eu.kobotoolbox.org/api/v1"));
        assert!(!client(false).has_legacy());
    }

    #[test]
    fn test_api_url_with_query() {
        let c = client(false);
        let query = vec![("q".to_string(), "asset_type:survey".to_string())];
        let url = c.api_url(&["assets", ""], &query).unwrap();
        assert_eq!(
            url.as_str(),
            "https://eu.kobotoolbox.org/api/v2/assets/?q=asset_type%3Asurvey"
        );
    }

    #[test]
    fn test_api_url_escapes_identifiers() {
        let c = client(false);
        let url = c.api_url(&["assets", "a/b?c#d", ""], &QueryParams::new()).unwrap();
        assert_eq!(url.path(), "/api/v2/assets/a%2Fb%3Fc%23d/");
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
    }

    #[test]
    fn test_legacy_url_without_trailing_slash() {
        let url = client(true).legacy_url(&["media"], "get_media").unwrap();
        assert_eq!(url.as_str(), "https://kc-eu.kobotoolbox.org/api/v1/media");
    }

    #[test]
    fn test_legacy_url_requires_config() {
        let err = client(false).legacy_url(&["submissions"], "submit").unwrap_err();
        assert!(matches!(err, KoboError::Config(_)));
        assert!(err.to_string().contains("submit()"));
    }

    #[test]
    fn test_build_request_headers() {
        let c = client(false);
        let url = c.api_url(&["assets", ""], &QueryParams::new()).unwrap();
        let req = c.build_request(Method::GET, url, ACCEPT_ANY, None);
        assert_eq!(req.header("authorization"), Some("Token secret"));
        assert_eq!(req.header("accept"), Some("*/*"));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let text = format!("{:?}", client(false));
        assert!(!text.contains("secret"));
    }
}
