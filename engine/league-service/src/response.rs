//! Response envelope: `{ "success": true, ...payload }` or `{ "success": false, "error": "..." }`

use crate::error::ServiceError;
use serde::Serialize;
use serde_json::{Map, Value};

/// A response body plus the status it should be sent with
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    /// Success envelope; the payload's fields sit beside `success`
    pub fn ok<T: Serialize>(payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(Value::Object(fields)) => {
                let mut body = Map::with_capacity(fields.len() + 1);
                body.insert("success".to_string(), Value::Bool(true));
                body.extend(fields);
                Self { status: 200, body: Value::Object(body) }
            }
            Ok(other) => {
                let mut body = Map::new();
                body.insert("success".to_string(), Value::Bool(true));
                body.insert("data".to_string(), other);
                Self { status: 200, body: Value::Object(body) }
            }
            Err(err) => Self::from_error(&ServiceError::Encoding(err)),
        }
    }

    /// Failure envelope carrying the error's status
    pub fn from_error(error: &ServiceError) -> Self {
        let mut body = Map::new();
        body.insert("success".to_string(), Value::Bool(false));
        body.insert("error".to_string(), Value::String(error.to_string()));
        Self { status: error.status_code(), body: Value::Object(body) }
    }

    pub fn from_result<T: Serialize>(result: &Result<T, ServiceError>) -> Self {
        match result {
            Ok(payload) => Self::ok(payload),
            Err(err) => {
                tracing::warn!(status = err.status_code(), "Request failed: {}", err);
                Self::from_error(err)
            }
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn to_json_pretty(&self) -> String {
        // Serializing a Value cannot fail
        serde_json::to_string_pretty(&self.body).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use league_analytics::AnalyticsError;
    use league_store::StoreError;
    use serde_json::json;

    #[derive(Serialize)]
    struct Payload {
        rows: Vec<u32>,
        no_data: bool,
    }

    #[test]
    fn test_success_envelope_flattens_payload() {
        let response = ApiResponse::ok(&Payload { rows: vec![1, 2], no_data: false });
        assert_eq!(response.status, 200);
        assert!(response.is_success());
        assert_eq!(response.body, json!({"success": true, "rows": [1, 2], "no_data": false}));
    }

    #[test]
    fn test_error_envelope() {
        let err = ServiceError::from(AnalyticsError::validation("season", "expected a numeric season"));
        let response = ApiResponse::from_error(&err);
        assert_eq!(response.status, 400);
        assert!(!response.is_success());
        assert_eq!(
            response.body,
            json!({"success": false, "error": "Validation error: season: expected a numeric season"})
        );
    }

    #[test]
    fn test_from_result_maps_upstream_status() {
        let result: Result<Payload, ServiceError> = Err(StoreError::league_not_found("abc").into());
        assert_eq!(ApiResponse::from_result(&result).status, 404);
    }

    #[test]
    fn test_non_object_payload_wrapped() {
        let response = ApiResponse::ok(&vec![1, 2, 3]);
        assert_eq!(response.body, json!({"success": true, "data": [1, 2, 3]}));
    }
}
