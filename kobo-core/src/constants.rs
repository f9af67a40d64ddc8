//! Client-wide constants.

/// Client name, used in the user agent and log file name.
pub const APP_NAME: &str = "kobo-client";

/// Client version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// API version used when the configuration does not name one.
pub const DEFAULT_API_VERSION: &str = "v2";

/// Path prefix of the versioned asset API.
pub const API_V2_PREFIX: &str = "/api/v2";

/// Path prefix of the legacy submission/media API.
pub const API_V1_PREFIX: &str = "/api/v1";

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default page size for asset listings.
pub const DEFAULT_ASSET_LIMIT: u32 = 100;

/// Default asset type filter for asset listings.
pub const DEFAULT_ASSET_TYPE: &str = "survey";

/// Multipart field name expected by the legacy submission endpoint.
pub const XML_SUBMISSION_FIELD: &str = "xml_submission_file";

/// File name sent with XML submissions.
pub const XML_SUBMISSION_FILE_NAME: &str = "submission.xml";

/// Fields injected by the platform that are stripped from normalized submissions.
pub const METADATA_FIELDS: &[&str] = &[
    "formhub/uuid",
    "meta/instanceID",
    "meta/rootUuid",
    "_id",
    "__version__",
    "_xform_id_string",
    "_uuid",
    "_attachments",
    "_status",
    "_geolocation",
    "_submission_time",
    "_tags",
    "_notes",
    "_validation_status",
    "_submitted_by",
];
