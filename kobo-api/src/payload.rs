//! Payload transformations: permission normalization and submission flattening.

use std::collections::HashSet;

use kobo_core::constants::METADATA_FIELDS;

use crate::models::{PermissionAssignment, PermissionMap, SubmissionRecord};

/// Group permission assignments by principal.
///
/// The principal is the second-to-last path segment of the user URL, the
/// permission the second-to-last segment of the permission URL. Both orders
/// follow the input.
pub fn normalize_permissions(assignments: &[PermissionAssignment]) -> PermissionMap {
    let mut map = PermissionMap::new();
    for assignment in assignments {
        map.grant(
            penultimate_segment(&assignment.user),
            penultimate_segment(&assignment.permission),
        );
    }
    map
}

fn penultimate_segment(url: &str) -> &str {
    url.rsplit('/').nth(1).unwrap_or(url)
}

/// Strip platform metadata and collapse group paths to their last segment.
///
/// Metadata fields listed in `keep_fields` survive (and are collapsed like
/// any other key). A grouped value replaces a top-level key of the same name
/// wherever either appears; between grouped keys, the later one wins. Keys
/// keep the position of their first occurrence.
pub fn normalize_submission(raw: &SubmissionRecord, keep_fields: &[&str]) -> SubmissionRecord {
    let mut normalized = SubmissionRecord::new();
    let mut grouped: HashSet<&str> = HashSet::new();

    for (key, value) in raw {
        let key = key.as_str();
        if METADATA_FIELDS.contains(&key) && !keep_fields.contains(&key) {
            continue;
        }
        match key.rfind('/') {
            Some(idx) => {
                let field = &key[idx + 1..];
                grouped.insert(field);
                normalized.insert(field.to_string(), value.clone());
            }
            None if grouped.contains(key) => {}
            None => {
                normalized.insert(key.to_string(), value.clone());
            }
        }
    }

    normalized
}
