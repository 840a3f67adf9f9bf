use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::auth::{issue_session, removal_cookie, session_cookie, verify_password, AuthError};
use crate::error::ApiError;
use crate::middleware::{principal_from_jar, ApiJson};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub password: Option<String>,
}

/// POST /api/auth/verify - check the shared password and start a session
pub async fn verify(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(body): ApiJson<VerifyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let password = body.password.unwrap_or_default();
    let security = &state.config.security;

    if let Err(err) = verify_password(&password, security.password_hash.as_deref()) {
        match &err {
            AuthError::InvalidPassword => warn!("Rejected dashboard login"),
            AuthError::NotConfigured => warn!("Login attempted without APP_PASSWORD_HASH configured"),
            _ => {}
        }
        return Err(err.into());
    }

    let token = issue_session(security)?;
    info!("Dashboard session started");
    Ok((
        StatusCode::OK,
        jar.add(session_cookie(security, token)),
        Json(json!({ "success": true })),
    ))
}

/// GET /api/auth/check
pub async fn check(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let authenticated = principal_from_jar(&state, &jar).is_ok();
    Json(json!({ "authenticated": authenticated }))
}

/// POST /api/auth/logout
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (jar.add(removal_cookie()), Json(json!({ "success": true })))
}
