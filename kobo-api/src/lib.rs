//! Kobo API - typed client for the KoboToolbox REST API.
//!
//! Builds authenticated requests for assets, submissions, attachments and
//! edit links, submits data as JSON or XML, and classifies every response
//! into decoded JSON, a binary envelope, or a typed `KoboError`. The HTTP
//! transport is pluggable; `ReqwestTransport` is the default.

pub mod client;
pub mod endpoints;
pub mod facade;
pub mod models;
pub mod payload;
pub mod query;
pub mod response;
pub mod transport;
pub mod xml;

// Re-export key types
pub use client::ApiClient;
pub use facade::{ApiVersion, KoboClient};
pub use models::{Asset, Page, PermissionAssignment, PermissionMap, SubmissionFilter, SubmissionRecord};
pub use response::AttachmentEnvelope;
pub use transport::{HttpRequest, HttpResponse, MultipartPart, RequestBody, ReqwestTransport, Transport, TransportError};
pub use xml::{to_xml, XmlElement};
