// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use crate::auth::AuthError;
use crate::database::indexes::{CITIES, HOSTEL_PROFILES, ORGANISATIONS};
use crate::database::DatabaseError;
use crate::media::MediaError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    Validation(String),

    // 400 Bad Request, deletion refused while children exist
    DependencyBlocked {
        message: String,
        /// Legacy single-count key, e.g. `hostelCount`
        count_key: String,
        count: u64,
        blocking_counts: BTreeMap<String, u64>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 413 Payload Too Large
    PayloadTooLarge(String),

    // 500 Internal Server Error
    Internal(String),

    // 502 Bad Gateway (image host failures)
    BadGateway(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::DependencyBlocked { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation(msg) => msg,
            ApiError::DependencyBlocked { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::PayloadTooLarge(msg) => msg,
            ApiError::Internal(msg) => msg,
            ApiError::BadGateway(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::DependencyBlocked { .. } => "DEPENDENCY_BLOCKED",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::Internal(_) => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to the `{ success: false, error, code }` envelope
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code()
        });

        if let ApiError::DependencyBlocked {
            count_key,
            count,
            blocking_counts,
            ..
        } = self
        {
            body[count_key.as_str()] = json!(count);
            body["blockingCounts"] = json!(blocking_counts);
        }

        body
    }
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

/// Client-facing message for a unique key violation
fn duplicate_message(collection: &str, field: &str) -> String {
    match (collection, field) {
        (CITIES, "slug") => "A city with this name already exists".to_string(),
        (ORGANISATIONS, "joinCode") => "Join code collision. Please try again.".to_string(),
        (HOSTEL_PROFILES, "slug") => "This slug is already taken".to_string(),
        (_, "organisationId") | (_, "hostelId") | (_, "blockId") => {
            "Profile already exists. Use PUT to update.".to_string()
        }
        _ => format!("Duplicate value for {}", field),
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::Duplicate { collection, field } => {
                ApiError::conflict(duplicate_message(&collection, &field))
            }
            DatabaseError::Filter(e) => ApiError::validation(e.to_string()),
            DatabaseError::ConfigMissing(_) | DatabaseError::InvalidDatabaseUrl => {
                tracing::error!("Database misconfigured: {}", err);
                ApiError::service_unavailable("Database is not configured")
            }
            DatabaseError::ConnectionError(msg) => {
                tracing::error!("Database connection error: {}", msg);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::Sqlx(sqlx::Error::PoolTimedOut) => {
                tracing::error!("Database pool timed out");
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            other => {
                tracing::error!("Database error: {}", other);
                ApiError::internal(other.to_string())
            }
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::NotConfigured => ApiError::service_unavailable(err.to_string()),
            MediaError::InvalidInput(msg) => ApiError::validation(msg),
            other => {
                tracing::error!("Media host error: {}", other);
                ApiError::bad_gateway(other.to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingPassword => ApiError::validation("Password is required"),
            AuthError::InvalidPassword => ApiError::unauthorized("Invalid password"),
            AuthError::NotConfigured => {
                ApiError::internal("Server configuration error - APP_PASSWORD_HASH not found")
            }
            AuthError::InvalidSession | AuthError::MissingSession => {
                ApiError::unauthorized("Authentication required")
            }
            other => {
                tracing::error!("Authentication error: {}", other);
                ApiError::internal("Internal server error")
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::internal(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

/// Extra top-level keys merged into an error body
pub fn merge_fields(mut body: Value, extra: Map<String, Value>) -> Value {
    if let Value::Object(map) = &mut body {
        map.extend(extra);
    }
    body
}
