use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

/// Errors returned by the HTTP handlers, rendered as `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Webhook delivery without the shared secret
    InvalidSecret(String),
    /// Missing or wrong Basic credentials; asks the client to authenticate
    Unauthorized(String),
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, challenge) = match self {
            ApiError::InvalidSecret(msg) => (StatusCode::UNAUTHORIZED, msg, false),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, true),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, false),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, false),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        if challenge {
            (status, [(header::WWW_AUTHENTICATE, "Basic realm=\"analytics\"")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
