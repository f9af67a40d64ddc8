//! Response classification.
//!
//! Every raw response goes through one of two paths: JSON mode decodes the
//! body into a `serde_json::Value`, binary mode wraps it in an
//! `AttachmentEnvelope` untouched. Both share the same status checks.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use kobo_core::error::{KoboError, KoboResult};

use crate::transport::HttpResponse;

/// Status accepted by read operations.
pub const STATUS_OK: &[u16] = &[200];

/// Status accepted by create operations.
pub const STATUS_CREATED: &[u16] = &[201];

/// Binary payload plus transport metadata. Never parsed as JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentEnvelope {
    /// Raw response body.
    pub content: Vec<u8>,
    /// Response headers keyed by lowercase name, values in received order.
    pub headers: BTreeMap<String, Vec<String>>,
    /// Content-Type header, `None` when absent or empty.
    pub content_type: Option<String>,
    /// HTTP status code.
    pub status: u16,
}

/// Fail with `Unauthorized` on 401 or `Http` on any status outside `expected`.
pub fn ensure_status(response: &HttpResponse, expected: &[u16]) -> KoboResult<()> {
    let status = response.status;

    if status == 401 {
        warn!("server rejected credentials");
        let reason = match response.reason() {
            "" => "Unauthorized",
            r => r,
        };
        return Err(KoboError::Unauthorized {
            reason: reason.to_string(),
            body: body_or_none(response),
        });
    }

    if !expected.contains(&status) {
        warn!("unexpected status {status}, expected one of {expected:?}");
        return Err(KoboError::Http {
            status,
            message: format!("{status} {}", response.reason()).trim_end().to_string(),
            body: body_or_none(response),
            source: None,
        });
    }

    Ok(())
}

/// Check the status and decode the body as JSON.
///
/// An empty body yields an empty mapping. A body that parses to something
/// other than an object or array is coerced to an empty mapping as well.
pub fn handle_json(response: HttpResponse, expected: &[u16]) -> KoboResult<Value> {
    ensure_status(&response, expected)?;

    if response.body.is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    match serde_json::from_slice::<Value>(&response.body) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => Ok(value),
        Ok(other) => {
            debug!("coercing non-container JSON body ({other}) to an empty mapping");
            Ok(Value::Object(Map::new()))
        }
        Err(e) => {
            warn!("failed to decode JSON response with status {}", response.status);
            Err(KoboError::Decode {
                status: response.status,
                message: format!("failed to decode JSON response: {e}"),
                body: response.text(),
            })
        }
    }
}

/// Check the status and return the raw body with its metadata.
pub fn handle_attachment(response: HttpResponse, expected: &[u16]) -> KoboResult<AttachmentEnvelope> {
    ensure_status(&response, expected)?;

    let content_type = response
        .header("content-type")
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in response.headers {
        headers.entry(name.to_ascii_lowercase()).or_default().push(value);
    }

    Ok(AttachmentEnvelope {
        content: response.body,
        headers,
        content_type,
        status: response.status,
    })
}

fn body_or_none(response: &HttpResponse) -> Option<String> {
    if response.body.is_empty() {
        None
    } else {
        Some(response.text())
    }
}
