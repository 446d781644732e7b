//! # V1 API Response Envelope & Error Contract
//!
//! Every v1 endpoint returns an [`ApiResponse<T>`] envelope with three
//! optional top-level fields:
//!
//! ```json
//! {
//!   "data": { ... },                                   // present on success
//!   "meta": { "total": 42 },                           // optional
//!   "error": { "code": "not_trained", "message": "..." } // present on error
//! }
//! ```
//!
//! Review, chat message and lead ids are nanoids (21 characters). Business
//! ids are caller-supplied strings of 1 to 128 characters.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::TourismError;

/// Machine-readable error code included in every error response.
///
/// Serialized as a snake_case string on the wire. Each variant maps to a
/// fixed HTTP status via [`ErrorCode::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed body, bad parameters or failed validation. HTTP 400.
    InvalidRequest,
    /// Missing or unknown bearer token. HTTP 401.
    Unauthorized,
    /// HTTP 404.
    NotFound,
    /// The forecaster has no trained bundle yet. HTTP 409.
    NotTrained,
    /// The operation is not available for the selected model. HTTP 422.
    Unsupported,
    /// An upstream model endpoint could not be reached. HTTP 503.
    DependencyUnavailable,
    /// Internal details are never leaked to the client. HTTP 500.
    InternalError,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::NotTrained => StatusCode::CONFLICT,
            Self::Unsupported => StatusCode::UNPROCESSABLE_ENTITY,
            Self::DependencyUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequest => write!(f, "invalid_request"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::NotFound => write!(f, "not_found"),
            Self::NotTrained => write!(f, "not_trained"),
            Self::Unsupported => write!(f, "unsupported"),
            Self::DependencyUnavailable => write!(f, "dependency_unavailable"),
            Self::InternalError => write!(f, "internal_error"),
        }
    }
}

/// Structured error payload within the envelope.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApiError {
    pub code: ErrorCode,
    /// Safe to show to end users.
    pub message: String,
}

/// Result-set metadata for list responses.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

impl ResponseMeta {
    pub fn total(total: usize) -> Self {
        Self {
            total: Some(total as u64),
        }
    }
}

/// Canonical v1 API response envelope.
///
/// On success `data` is present and `error` is absent, and the reverse on
/// error. The HTTP status comes from the error code or from the constructor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,

    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// HTTP 200.
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            meta: None,
            error: None,
            status: StatusCode::OK,
        }
    }

    pub fn success_with_meta(data: T, meta: ResponseMeta) -> Self {
        Self {
            data: Some(data),
            meta: Some(meta),
            error: None,
            status: StatusCode::OK,
        }
    }

    /// HTTP 201.
    pub fn created(data: T) -> Self {
        Self {
            data: Some(data),
            meta: None,
            error: None,
            status: StatusCode::CREATED,
        }
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        let status = code.status();
        Self {
            data: None,
            meta: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
            status,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        match serde_json::to_value(&self) {
            Ok(body) => (status, Json(body)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize v1 response");
                let body = serde_json::json!({
                    "error": {
                        "code": "internal_error",
                        "message": "An internal error occurred"
                    }
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

impl<T: Serialize> From<TourismError> for ApiResponse<T> {
    /// Internal error details are logged and replaced with a generic message.
    fn from(err: TourismError) -> Self {
        match err {
            TourismError::NotFound(msg) => {
                ApiResponse::error(ErrorCode::NotFound, format!("{msg} not found"))
            }

            TourismError::Validation(msg) => ApiResponse::error(ErrorCode::InvalidRequest, msg),

            TourismError::Json(e) => {
                ApiResponse::error(ErrorCode::InvalidRequest, format!("Invalid JSON: {e}"))
            }

            TourismError::NotTrained(msg) => ApiResponse::error(ErrorCode::NotTrained, msg),

            TourismError::Unsupported(msg) => ApiResponse::error(ErrorCode::Unsupported, msg),

            TourismError::DependencyUnavailable(msg) => {
                tracing::warn!(error = %msg, "Dependency unavailable");
                ApiResponse::error(
                    ErrorCode::DependencyUnavailable,
                    "A required model service is unavailable",
                )
            }

            ref internal @ (TourismError::Database(_)
            | TourismError::Persistence(_)
            | TourismError::Forecasting(_)
            | TourismError::Cache(_)
            | TourismError::Http(_)
            | TourismError::Io(_)
            | TourismError::Internal(_)) => {
                tracing::error!(error = %internal, "Internal error mapped to v1 response");
                ApiResponse::error(ErrorCode::InternalError, "An internal error occurred")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_response_serializes_without_error() {
        let resp = ApiResponse::success("hello");
        let json = serde_json::to_value(&resp).expect("serialize");
        assert_eq!(json["data"], "hello");
        assert!(json.get("error").is_none());
        assert!(json.get("meta").is_none());
    }

    #[test]
    fn error_response_serializes_without_data() {
        let resp = ApiResponse::<()>::error(ErrorCode::NotTrained, "train first");
        let json = serde_json::to_value(&resp).expect("serialize");
        assert!(json.get("data").is_none());
        assert_eq!(json["error"]["code"], "not_trained");
        assert_eq!(json["error"]["message"], "train first");
    }

    #[test]
    fn meta_total_serializes() {
        let resp = ApiResponse::success_with_meta(vec![1, 2, 3], ResponseMeta::total(3));
        let json = serde_json::to_value(&resp).expect("serialize");
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
        assert_eq!(json["meta"]["total"], 3);
    }

    #[test]
    fn error_code_status_mapping() {
        assert_eq!(ErrorCode::InvalidRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::NotTrained.status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::Unsupported.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ErrorCode::DependencyUnavailable.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ErrorCode::InternalError.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_code_display_matches_wire_format() {
        for code in [
            ErrorCode::InvalidRequest,
            ErrorCode::NotTrained,
            ErrorCode::Unsupported,
            ErrorCode::DependencyUnavailable,
        ] {
            let json = serde_json::to_value(&code).expect("serialize");
            assert_eq!(json, code.to_string());
        }
    }

    #[test]
    fn domain_errors_map_to_codes() {
        let resp: ApiResponse<()> = TourismError::not_trained().into();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp: ApiResponse<()> = TourismError::Validation("days must be positive".into()).into();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            resp.error.as_ref().map(|e| e.message.as_str()),
            Some("days must be positive")
        );

        let resp: ApiResponse<()> =
            TourismError::Unsupported("linear_regression has no importances".into()).into();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let resp: ApiResponse<()> = TourismError::NotFound("Review abc".into()).into();
        assert_eq!(
            resp.error.as_ref().map(|e| e.message.as_str()),
            Some("Review abc not found")
        );
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let resp: ApiResponse<()> =
            TourismError::Persistence("disk quota exceeded on /var/lib".into()).into();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let err = resp.error.expect("error payload");
        assert_eq!(err.code, ErrorCode::InternalError);
        assert_eq!(err.message, "An internal error occurred");
    }
}
