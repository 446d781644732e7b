use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};

use crate::error::TourismError;

/// JSON body extractor whose rejections use the v1 error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(TourismError))]
pub struct AppJson<T>(pub T);

/// Query string extractor whose rejections use the v1 error envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(TourismError))]
pub struct AppQuery<T>(pub T);

impl From<JsonRejection> for TourismError {
    fn from(rejection: JsonRejection) -> Self {
        map_json_rejection(rejection)
    }
}

impl From<QueryRejection> for TourismError {
    fn from(rejection: QueryRejection) -> Self {
        TourismError::Validation(format!("Invalid query parameters: {}", rejection.body_text()))
    }
}

fn map_json_rejection(rejection: JsonRejection) -> TourismError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            let message = err.body_text();
            if let Some(field) = extract_missing_field(&message) {
                TourismError::Validation(format!("Missing required field: {field}"))
            } else {
                TourismError::Validation(format!("Invalid JSON: {message}"))
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            TourismError::Validation(format!("JSON syntax error: {}", err.body_text()))
        }
        JsonRejection::MissingJsonContentType(_) => {
            TourismError::Validation("Missing `Content-Type: application/json` header".to_string())
        }
        JsonRejection::BytesRejection(_) => {
            TourismError::Validation("Failed to read request body".to_string())
        }
        _ => TourismError::Validation(rejection.body_text()),
    }
}

fn extract_missing_field(message: &str) -> Option<&str> {
    let prefix = "missing field `";
    let start = message.find(prefix)? + prefix.len();
    let remaining = message.get(start..)?;
    let end = remaining.find('`')?;
    remaining.get(..end)
}
