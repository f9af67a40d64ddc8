//! Query string encoding for listing endpoints.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::Serialize;

use kobo_core::error::{KoboError, KoboResult};

use crate::models::SubmissionFilter;

/// Ordered query parameters. Absent options are never emitted.
pub type QueryParams = Vec<(String, String)>;

/// Date bounds on `_submission_time`, serialized as a Mongo-style predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangePredicate {
    #[serde(rename = "_submission_time")]
    pub submission_time: TimeBounds,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeBounds {
    #[serde(rename = "$gte", skip_serializing_if = "Option::is_none")]
    pub gte: Option<String>,
    #[serde(rename = "$lte", skip_serializing_if = "Option::is_none")]
    pub lte: Option<String>,
}

/// Build the `_submission_time` predicate. At least one bound is required.
pub fn encode_date_range(
    start: Option<&DateTime<FixedOffset>>,
    end: Option<&DateTime<FixedOffset>>,
) -> KoboResult<RangePredicate> {
    if start.is_none() && end.is_none() {
        return Err(KoboError::InvalidFilter(
            "a date range needs at least a start or an end".into(),
        ));
    }

    Ok(RangePredicate {
        submission_time: TimeBounds {
            gte: start.map(format_timestamp),
            lte: end.map(format_timestamp),
        },
    })
}

/// Query for `/assets/`: always `limit`, `offset` and `q=asset_type:<type>`.
pub fn encode_asset_query(limit: u32, offset: u32, asset_type: &str) -> QueryParams {
    vec![
        ("limit".into(), limit.to_string()),
        ("offset".into(), offset.to_string()),
        ("q".into(), format!("asset_type:{asset_type}")),
    ]
}

/// Query for `/assets/<id>/data/`.
///
/// The server names the offset parameter `start`.
pub fn encode_submission_query(filter: &SubmissionFilter) -> KoboResult<QueryParams> {
    let mut params = QueryParams::new();

    if filter.has_date_range() {
        let predicate = encode_date_range(filter.start.as_ref(), filter.end.as_ref())?;
        params.push(("query".into(), serde_json::to_string(&predicate)?));
    }
    if let Some(limit) = filter.limit {
        params.push(("limit".into(), limit.to_string()));
    }
    if let Some(offset) = filter.offset {
        params.push(("start".into(), offset.to_string()));
    }

    Ok(params)
}

/// Offset-aware ISO-8601, e.g. `2020-01-01T00:00:00+00:00`.
fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, false)
}
