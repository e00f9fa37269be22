//! Request extractors whose rejections are reported as [`ApiError`] JSON
//! bodies, plus lenient timestamp parsing for request fields.

use axum::extract::{
  FromRequest, FromRequestParts,
  rejection::{JsonRejection, QueryRejection},
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::error::ApiError;

/// [`axum::Json`] with an `{"error": ...}` rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// [`axum::extract::Query`] with an `{"error": ...}` rejection.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    tracing::warn!(error = %rejection.body_text(), "rejected request body");
    ApiError::BadRequest("Invalid request body")
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    tracing::warn!(error = %rejection.body_text(), "rejected query string");
    ApiError::BadRequest("Invalid query parameters")
  }
}

/// Parse an RFC 3339 timestamp, or an ISO 8601 date-time without an offset,
/// which is taken as UTC.
pub fn parse_utc(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
  DateTime::parse_from_rfc3339(raw)
    .map(|dt| dt.with_timezone(&Utc))
    .or_else(|_| raw.parse::<NaiveDateTime>().map(|naive| naive.and_utc()))
}

/// `deserialize_with` helper for optional `createdAt` fields.
pub fn optional_utc<'de, D>(de: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
  D: Deserializer<'de>,
{
  Option::<String>::deserialize(de)?
    .map(|raw| parse_utc(&raw).map_err(serde::de::Error::custom))
    .transpose()
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn offset_free_timestamps_are_utc() {
    let expected = Utc.with_ymd_and_hms(2024, 9, 25, 8, 0, 0).unwrap()
      + chrono::Duration::microseconds(123_456);
    assert_eq!(parse_utc("2024-09-25T08:00:00.123456").unwrap(), expected);
    assert_eq!(parse_utc("2024-09-25T08:00:00.123456Z").unwrap(), expected);
    assert_eq!(parse_utc("2024-09-25T15:00:00.123456+07:00").unwrap(), expected);
  }

  #[test]
  fn garbage_timestamps_are_rejected() {
    assert!(parse_utc("yesterday").is_err());
    assert!(parse_utc("2024-09-25").is_err());
  }
}
