/// API route handlers
///
/// Successful responses wrap their payload as `{"body": ...}`.

pub mod auth;
pub mod entries;
pub mod friends;
pub mod goals;
pub mod health;
pub mod projects;
pub mod tags;
pub mod users;

use crate::error::{ApiError, ApiResult, ValidationErrorDetail};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Success payload wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub body: T,
}

pub fn envelope<T>(body: T) -> Json<Envelope<T>> {
    Json(Envelope { body })
}

/// Rejects intervals that end before they start
pub(crate) fn ensure_interval(start: DateTime<Utc>, end: DateTime<Utc>) -> ApiResult<()> {
    if end < start {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "time_end".to_string(),
            message: "time_end must not be earlier than time_start".to_string(),
        }]));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_envelope_shape() {
        let json = serde_json::to_value(Envelope { body: vec![1, 2] }).unwrap();
        assert_eq!(json, serde_json::json!({ "body": [1, 2] }));
    }

    #[test]
    fn test_ensure_interval() {
        let now = Utc::now();
        assert!(ensure_interval(now, now).is_ok());
        assert!(ensure_interval(now, now + Duration::hours(1)).is_ok());
        assert!(matches!(
            ensure_interval(now, now - Duration::seconds(1)),
            Err(ApiError::ValidationError(_))
        ));
    }
}
