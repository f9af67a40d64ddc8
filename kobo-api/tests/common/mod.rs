//! Shared test utilities for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use kobo_api::{HttpRequest, HttpResponse, KoboClient, Transport, TransportError};
use kobo_core::ClientConfig;

pub const API_URL: &str = "https://eu.kobotoolbox.org";
pub const LEGACY_URL: &str = "https://kc-eu.kobotoolbox.org";
pub const API_KEY: &str = "6920790c1c2d39367f85475c9c7cfe87";
pub const ASSET_ID: &str = "arM7332BXdeYcKPj58Vnpx";

enum Scripted {
    Response(HttpResponse),
    Failure(String),
}

/// In-memory transport that replays scripted responses and records requests.
#[derive(Clone, Default)]
pub struct MockTransport {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response.
    pub fn respond(&self, response: HttpResponse) -> &Self {
        self.script.lock().unwrap().push_back(Scripted::Response(response));
        self
    }

    /// Queue a JSON response with the given status.
    pub fn respond_json(&self, status: u16, body: serde_json::Value) -> &Self {
        self.respond(
            HttpResponse::new(status, body.to_string()).with_header("Content-Type", "application/json"),
        )
    }

    /// Queue a transport failure (no response at all).
    pub fn fail(&self, message: &str) -> &Self {
        self.script.lock().unwrap().push_back(Scripted::Failure(message.to_string()));
        self
    }

    /// All requests sent so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::Failure(message)) => Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                message,
            ))),
            None => panic!("mock transport has no scripted response left"),
        }
    }
}

/// Configuration with both base URLs.
pub fn create_test_config() -> ClientConfig {
    ClientConfig::new(API_URL, API_KEY).with_legacy_url(LEGACY_URL)
}

/// Configuration without the legacy URL.
pub fn create_v2_only_config() -> ClientConfig {
    ClientConfig::new(API_URL, API_KEY)
}

/// Client wired to a fresh mock transport.
pub fn create_test_client(config: &ClientConfig) -> (KoboClient, MockTransport) {
    let transport = MockTransport::new();
    let client = KoboClient::with_transport(config, Arc::new(transport.clone()))
        .expect("failed to build test client");
    (client, transport)
}

/// Client whose transient submission files go to a fresh directory.
///
/// Keep the returned `TempDir` alive for the duration of the test.
pub fn create_temp_dir_client() -> (KoboClient, MockTransport, tempfile::TempDir) {
    let dir = tempfile::TempDir::new().expect("failed to create temp dir");
    let config = create_test_config().with_temp_dir(dir.path().to_string_lossy());
    let (client, transport) = create_test_client(&config);
    (client, transport, dir)
}

/// Number of entries left in a directory.
pub fn dir_entries(dir: &tempfile::TempDir) -> usize {
    std::fs::read_dir(dir.path()).expect("failed to read temp dir").count()
}

/// Asset detail body with a deployment uuid.
pub fn asset_body() -> serde_json::Value {
    serde_json::json!({
        "uid": ASSET_ID,
        "name": "kobo sdk test",
        "asset_type": "survey",
        "deployment__uuid": "0c1a2f33ab5e4e0f9c6a7b8d9e0f1a2b",
        "content": {"survey": [{"type": "text", "name": "name"}]},
        "permissions": [
            {
                "user": "https://eu.kobotoolbox.org/api/v2/users/AnonymousUser/",
                "permission": "https://eu.kobotoolbox.org/api/v2/permissions/add_submissions/"
            },
            {
                "user": "https://eu.kobotoolbox.org/api/v2/users/kobosdktest/",
                "permission": "https://eu.kobotoolbox.org/api/v2/permissions/add_submissions/"
            },
            {
                "user": "https://eu.kobotoolbox.org/api/v2/users/kobosdktest/",
                "permission": "https://eu.kobotoolbox.org/api/v2/permissions/change_asset/"
            }
        ]
    })
}

/// Body the legacy API returns on a successful submission.
pub fn submission_accepted_body() -> serde_json::Value {
    serde_json::json!({
        "message": "Successful submission.",
        "formid": ASSET_ID,
        "encrypted": false,
        "instanceID": "uuid:00000000-0000-4000-8000-000000000000",
        "submissionDate": "2024-05-01T10:00:00.000000+00:00",
        "markedAsCompleteDate": "2024-05-01T10:00:00.000000+00:00"
    })
}

/// A submission record with a nested group.
pub fn submission_data() -> kobo_api::SubmissionRecord {
    match serde_json::json!({
        "name": "anchal test",
        "are_you_available": "OK",
        "country": "germany france",
        "group_fields": {"notest": "This is a note & more"}
    }) {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    }
}
