use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::auth::{decode_session, AuthError, SESSION_COOKIE};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated operator, inserted as a request extension
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Principal {
    pub owner_id: Uuid,
}

/// Require a valid session cookie on every wrapped route
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let principal = match principal_from_jar(&state, &jar) {
        Ok(principal) => principal,
        Err(err) => return ApiError::from(err).into_response(),
    };

    request.extensions_mut().insert(principal);
    next.run(request).await
}

pub fn principal_from_jar(state: &AppState, jar: &CookieJar) -> Result<Principal, AuthError> {
    let cookie = jar.get(SESSION_COOKIE).ok_or(AuthError::MissingSession)?;
    let claims = decode_session(&state.config.security, cookie.value())?;
    Ok(Principal { owner_id: claims.sub })
}
