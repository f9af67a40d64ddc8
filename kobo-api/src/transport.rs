//! Transport abstraction for sending HTTP requests.
//!
//! The client never talks to the network directly: it builds an
//! `HttpRequest`, hands it to a `Transport`, and classifies the
//! `HttpResponse` that comes back. `ReqwestTransport` is the production
//! implementation; tests substitute an in-memory one.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use tracing::debug;

use kobo_core::config::ResolvedConfig;
use kobo_core::constants;
use kobo_core::error::{BoxError, KoboError, KoboResult};

/// Error type returned by transports.
pub type TransportError = BoxError;

/// One part of a multipart/form-data body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartPart {
    /// Form field name.
    pub name: String,
    /// File name reported for the part.
    pub file_name: Option<String>,
    /// Content type of the part.
    pub content_type: String,
    /// Raw part content.
    pub data: Vec<u8>,
}

/// Request body variants the client produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Serialized JSON document, sent as `application/json`.
    Json(Vec<u8>),
    /// multipart/form-data parts.
    Multipart(Vec<MultipartPart>),
}

/// A fully built request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: reqwest::Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    /// Look up a request header (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A raw response as returned by the transport.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    /// Header name/value pairs in received order; repeated headers appear repeatedly.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a response with the given status and body and no headers.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Add a header (builder style).
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Canonical reason phrase for the status code, empty if unknown.
    pub fn reason(&self) -> &'static str {
        StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("")
    }

    /// Look up the first value of a header (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body decoded as UTF-8, lossy.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends requests and returns raw responses.
///
/// Implementations own connection handling, TLS, timeouts and cancellation.
/// Any failure to obtain a response is reported as `TransportError`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Production transport built on reqwest.
#[derive(Clone)]
pub struct ReqwestTransport {
    inner: Client,
}

impl ReqwestTransport {
    /// Build a transport using the timeout and certificate policy from configuration.
    pub fn new(config: &ResolvedConfig) -> KoboResult<Self> {
        let mut builder = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(15))
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(format!("{}/{}", constants::APP_NAME, constants::APP_VERSION));

        if config.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let inner = builder
            .build()
            .map_err(|e| KoboError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { inner })
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(inner: Client) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.inner.request(request.method, request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        builder = match request.body {
            Some(RequestBody::Json(bytes)) => builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(bytes),
            Some(RequestBody::Multipart(parts)) => {
                let mut form = reqwest::multipart::Form::new();
                for part in parts {
                    let mut p = reqwest::multipart::Part::bytes(part.data)
                        .mime_str(&part.content_type)?;
                    if let Some(file_name) = part.file_name {
                        p = p.file_name(file_name);
                    }
                    form = form.part(part.name, p);
                }
                builder.multipart(form)
            }
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect();
        let body = response.bytes().await?.to_vec();
        debug!("received {} bytes with status {}", body.len(), status);

        Ok(HttpResponse { status, headers, body })
    }
}
