//! Uniform error contract for API handlers
//!
//! Every failure is rendered as `{ "detail": ... }`. The detail is a string,
//! except for field validation failures which carry a structured array.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::pipeline::PipelineError;

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    /// Required field is absent
    #[must_use]
    pub fn missing(field: &str) -> Self {
        Self {
            loc: vec![field.to_string()],
            msg: "Field required".to_string(),
            kind: "missing".to_string(),
        }
    }

    /// Field is present but not a string
    #[must_use]
    pub fn not_a_string(field: &str) -> Self {
        Self {
            loc: vec![field.to_string()],
            msg: "Input should be a valid string".to_string(),
            kind: "string_type".to_string(),
        }
    }
}

/// API errors
#[derive(Debug)]
pub enum ApiError {
    /// Malformed request or wrong content type (400)
    BadRequest(String),
    /// Field-level validation failure (422)
    Validation(Vec<FieldError>),
    /// Vendor failure or empty vendor answer (500)
    Internal(String),
}

impl ApiError {
    /// Status code this error is rendered with
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidContentType(_) => Self::BadRequest(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<crate::Error> for ApiError {
    fn from(err: crate::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse<T: Serialize> {
            detail: T,
        }

        let status = self.status();
        match self {
            Self::BadRequest(detail) | Self::Internal(detail) => {
                (status, Json(ErrorResponse { detail })).into_response()
            }
            Self::Validation(errors) => {
                (status, Json(ErrorResponse { detail: errors })).into_response()
            }
        }
    }
}

/// Parse a request body as a JSON object
///
/// # Errors
///
/// Returns [`ApiError::BadRequest`] when the body is empty, not JSON, or not an object
pub fn json_object(body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(ApiError::BadRequest("Invalid or missing JSON body".to_string())),
    }
}

/// Read a string field from a JSON object
///
/// `Ok(None)` means the field is absent; a present non-string value is an error.
///
/// # Errors
///
/// Returns [`FieldError`] when the field exists but is not a string
pub fn string_field(map: &Map<String, Value>, field: &str) -> Result<Option<String>, FieldError> {
    match map.get(field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(FieldError::not_a_string(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_mapping() {
        let err: ApiError = PipelineError::InvalidContentType("text/plain".to_string()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err: ApiError = PipelineError::NoAudio.into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(err, ApiError::Internal(ref m) if m == "No audio returned from TTS"));
    }

    #[test]
    fn test_json_object() {
        assert!(json_object(br#"{"request":"hi"}"#).is_ok());
        assert!(json_object(b"").is_err());
        assert!(json_object(b"[1,2]").is_err());
        assert!(json_object(b"nope").is_err());
    }

    #[test]
    fn test_string_field() {
        let map = json_object(br#"{"a":"x","b":3}"#).unwrap();
        assert_eq!(string_field(&map, "a").unwrap(), Some("x".to_string()));
        assert_eq!(string_field(&map, "c").unwrap(), None);
        assert_eq!(string_field(&map, "b").unwrap_err(), FieldError::not_a_string("b"));
    }

    #[test]
    fn test_field_error_shape() {
        let json = serde_json::to_value(FieldError::missing("request")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"loc": ["request"], "msg": "Field required", "type": "missing"})
        );
    }
}
