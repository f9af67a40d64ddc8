//! Typed views over API payloads.

use chrono::{DateTime, FixedOffset, TimeZone};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use kobo_core::error::KoboResult;

use crate::payload::normalize_permissions;

/// A submission as returned by the server: field path to value, in server order.
pub type SubmissionRecord = serde_json::Map<String, Value>;

/// One entry of an asset's `permissions` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionAssignment {
    /// URL of the assignment itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// User URL, e.g. `https://eu.kobotoolbox.org/api/v2/users/AnonymousUser/`.
    pub user: String,
    /// Permission URL, e.g. `https://eu.kobotoolbox.org/api/v2/permissions/add_submissions/`.
    pub permission: String,
    /// Human-readable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Principal name to granted permission names, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionMap {
    entries: Vec<(String, Vec<String>)>,
}

impl PermissionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a permission to a principal, creating the principal on first use.
    pub fn grant(&mut self, principal: &str, permission: &str) {
        match self.entries.iter_mut().find(|(p, _)| p == principal) {
            Some((_, perms)) => perms.push(permission.to_string()),
            None => self
                .entries
                .push((principal.to_string(), vec![permission.to_string()])),
        }
    }

    /// Permissions granted to a principal.
    pub fn get(&self, principal: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(p, _)| p == principal)
            .map(|(_, perms)| perms.as_slice())
    }

    pub fn contains(&self, principal: &str) -> bool {
        self.get(principal).is_some()
    }

    /// Principal names in discovery order.
    pub fn principals(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(p, _)| p.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(p, perms)| (p.as_str(), perms.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for PermissionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (principal, perms) in &self.entries {
            map.serialize_entry(principal, perms)?;
        }
        map.end()
    }
}

#[derive(Debug, Deserialize)]
struct AssetRecord {
    #[serde(default)]
    uid: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    asset_type: String,
    #[serde(default)]
    content: Value,
    #[serde(default)]
    permissions: Vec<PermissionAssignment>,
    #[serde(default, rename = "deployment__uuid")]
    deployment_uuid: Option<String>,
}

/// A remote form definition, built once from the asset detail response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Asset {
    /// Asset uid (falls back to the requested id if the body has none).
    pub id: String,
    pub name: String,
    /// Asset type, e.g. "survey".
    pub kind: String,
    /// Question/answer schema, kept opaque.
    pub content: Value,
    pub permissions: PermissionMap,
    /// The full decoded response.
    pub data: Value,
    #[serde(skip)]
    deployment_uuid: Option<String>,
}

impl Asset {
    /// Build an asset from a decoded `/assets/<id>/` response.
    pub fn from_value(form_id: &str, data: Value) -> KoboResult<Self> {
        let record: AssetRecord = serde_json::from_value(data.clone())?;
        Ok(Self {
            id: record.uid.unwrap_or_else(|| form_id.to_string()),
            name: record.name,
            kind: record.asset_type,
            content: record.content,
            permissions: normalize_permissions(&record.permissions),
            data,
            deployment_uuid: record.deployment_uuid.filter(|u| !u.is_empty()),
        })
    }

    /// Deployment uuid tying the form to its submission schema.
    pub fn deployment_uuid(&self) -> Option<&str> {
        self.deployment_uuid.as_deref()
    }
}

/// Filters for submission listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionFilter {
    /// Only submissions at or after this time.
    pub start: Option<DateTime<FixedOffset>>,
    /// Only submissions at or before this time.
    pub end: Option<DateTime<FixedOffset>>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl SubmissionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start<Tz: TimeZone>(mut self, start: DateTime<Tz>) -> Self {
        self.start = Some(start.fixed_offset());
        self
    }

    pub fn end<Tz: TimeZone>(mut self, end: DateTime<Tz>) -> Self {
        self.end = Some(end.fixed_offset());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Whether a date-range predicate should be sent.
    pub fn has_date_range(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }
}

/// One page of a paginated listing.
///
/// Callers follow `next`/`previous` themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub results: Vec<Value>,
}

impl Page {
    /// Project a decoded listing response onto the page shape.
    pub fn from_value(value: Value) -> KoboResult<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn asset_json() -> Value {
        json!({
            "uid": "arM7332BXdeYcKPj58Vnpx",
            "name": "Household survey",
            "asset_type": "survey",
            "deployment__uuid": "b3b3c6d1a2f04f9c",
            "content": {"survey": [{"type": "text", "name": "q1"}]},
            "permissions": [
                {
                    "url": "https://eu.kobotoolbox.org/api/v2/assets/arM7332BXdeYcKPj58Vnpx/permission-assignments/p9Kp/",
                    "user": "https://eu.kobotoolbox.org/api/v2/users/AnonymousUser/",
                    "permission": "https://eu.kobotoolbox.org/api/v2/permissions/add_submissions/",
                    "label": "Add submissions"
                },
                {
                    "user": "https://eu.kobotoolbox.org/api/v2/users/owner/",
                    "permission": "https://eu.kobotoolbox.org/api/v2/permissions/change_asset/"
                }
            ]
        })
    }

    #[test]
    fn test_asset_from_value() {
        let asset = Asset::from_value("arM7332BXdeYcKPj58Vnpx", asset_json()).unwrap();
        assert_eq!(asset.id, "arM7332BXdeYcKPj58Vnpx");
        assert_eq!(asset.name, "Household survey");
        assert_eq!(asset.kind, "survey");
        assert_eq!(asset.deployment_uuid(), Some("b3b3c6d1a2f04f9c"));
        assert_eq!(asset.permissions.get("AnonymousUser").unwrap(), ["add_submissions"]);
        assert_eq!(asset.permissions.get("owner").unwrap(), ["change_asset"]);
        assert_eq!(asset.content["survey"][0]["name"], "q1");
    }

    #[test]
    fn test_asset_missing_optional_fields() {
        let asset = Asset::from_value("a1", json!({"name": "x"})).unwrap();
        assert_eq!(asset.id, "a1");
        assert!(asset.permissions.is_empty());
        assert!(asset.deployment_uuid().is_none());
        assert!(asset.content.is_null());
    }

    #[test]
    fn test_asset_malformed_permissions() {
        let err = Asset::from_value("a1", json!({"permissions": [{"user": 1}]})).unwrap_err();
        assert!(matches!(err, kobo_core::KoboError::Serialization(_)));
    }

    #[test]
    fn test_permission_map_serializes_in_order() {
        let mut map = PermissionMap::new();
        map.grant("zed", "view_asset");
        map.grant("amy", "add_submissions");
        map.grant("zed", "change_asset");
        let text = serde_json::to_string(&map).unwrap();
        assert_eq!(text, r#"{"zed":["view_asset","change_asset"],"amy":["add_submissions"]}"#);
        assert_eq!(map.principals().collect::<Vec<_>>(), vec!["zed", "amy"]);
    }

    #[test]
    fn test_page_from_value() {
        let page = Page::from_value(json!({
            "count": 2,
            "next": "https://eu.kobotoolbox.org/api/v2/assets/?limit=1&offset=1",
            "previous": null,
            "results": [{"uid": "a1"}]
        }))
        .unwrap();
        assert_eq!(page.count, 2);
        assert!(page.next.is_some());
        assert!(page.previous.is_none());
        assert_eq!(page.results.len(), 1);
    }

    #[test]
    fn test_submission_filter_builder() {
        let start = chrono::Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let filter = SubmissionFilter::new().start(start).limit(10);
        assert!(filter.has_date_range());
        assert_eq!(filter.limit, Some(10));
        assert!(filter.offset.is_none());
        assert!(!SubmissionFilter::new().offset(5).has_date_range());
    }
}
