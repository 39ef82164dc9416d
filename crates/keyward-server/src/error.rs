use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use keyward_core::KeywardError;
use serde_json::json;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error_name: String,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, error_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error_name: error_name.into(),
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.error_name,
            "message": self.message,
        });
        (self.status, axum::Json(body)).into_response()
    }
}

impl From<KeywardError> for ApiError {
    fn from(err: KeywardError) -> Self {
        match &err {
            KeywardError::Storage(_) => ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "StoreUnavailable",
                err.to_string(),
            ),
            KeywardError::Crypto(_) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalServerError",
                err.to_string(),
            ),
            KeywardError::Auth(_) => ApiError::new(
                StatusCode::UNAUTHORIZED,
                "AuthenticationRequired",
                err.to_string(),
            ),
            KeywardError::InvalidRequest(_) => ApiError::new(
                StatusCode::BAD_REQUEST,
                "InvalidRequest",
                err.to_string(),
            ),
            KeywardError::UnknownCode => ApiError::new(
                StatusCode::NOT_FOUND,
                "UnknownCode",
                err.to_string(),
            ),
            KeywardError::DuplicateCode => ApiError::new(
                StatusCode::CONFLICT,
                "DuplicateCode",
                err.to_string(),
            ),
            KeywardError::DeviceConflict => ApiError::new(
                StatusCode::FORBIDDEN,
                "DeviceConflict",
                err.to_string(),
            ),
            KeywardError::InvalidCredential => ApiError::new(
                StatusCode::UNAUTHORIZED,
                "InvalidCredential",
                err.to_string(),
            ),
            KeywardError::AccountLocked { .. } => ApiError::new(
                StatusCode::LOCKED,
                "AccountLocked",
                err.to_string(),
            ),
            KeywardError::SamePassword => ApiError::new(
                StatusCode::BAD_REQUEST,
                "SamePassword",
                err.to_string(),
            ),
            KeywardError::WeakCredential(_) => ApiError::new(
                StatusCode::BAD_REQUEST,
                "WeakCredential",
                err.to_string(),
            ),
            KeywardError::SessionExpired => ApiError::new(
                StatusCode::UNAUTHORIZED,
                "SessionExpired",
                err.to_string(),
            ),
            KeywardError::InternalError(_) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalServerError",
                err.to_string(),
            ),
        }
    }
}
