use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

/// Name of the dashboard session cookie
pub const SESSION_COOKIE: &str = "app_authenticated";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Password is required")]
    MissingPassword,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("APP_PASSWORD_HASH is not configured")]
    NotConfigured,

    #[error("Session cookie missing")]
    MissingSession,

    #[error("Session cookie invalid or expired")]
    InvalidSession,

    #[error("Password hash error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Session token error: {0}")]
    Token(String),
}

/// Session token payload; `sub` is the operator that owns dashboard data
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(owner_id: Uuid, max_age_secs: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: owner_id,
            exp: (now + Duration::seconds(max_age_secs)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// Check `password` against the configured bcrypt hash
pub fn verify_password(password: &str, hash: Option<&str>) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::MissingPassword);
    }
    let hash = hash.ok_or(AuthError::NotConfigured)?;
    if bcrypt::verify(password, hash)? {
        Ok(())
    } else {
        Err(AuthError::InvalidPassword)
    }
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    if password.is_empty() {
        return Err(AuthError::MissingPassword);
    }
    Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
}

pub fn issue_session(security: &SecurityConfig) -> Result<String, AuthError> {
    if security.session_secret.is_empty() {
        return Err(AuthError::Token("session secret is empty".to_string()));
    }
    let claims = Claims::new(security.owner_id, security.session_max_age_secs);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(security.session_secret.as_bytes()),
    )
    .map_err(|e| AuthError::Token(e.to_string()))
}

pub fn decode_session(security: &SecurityConfig, token: &str) -> Result<Claims, AuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(security.session_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AuthError::InvalidSession)
}

/// httpOnly, SameSite=Strict, path `/`; `secure` follows the environment
pub fn session_cookie(security: &SecurityConfig, token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(security.secure_cookies)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(security.session_max_age_secs))
        .path("/")
        .build()
}

/// Expired session cookie; sent even when the request carried none
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn verifies_bcrypt_hashes() {
        let hash = bcrypt::hash("letmein", 4).unwrap();
        assert!(verify_password("letmein", Some(&hash)).is_ok());
        assert!(matches!(verify_password("wrong", Some(&hash)), Err(AuthError::InvalidPassword)));
        assert!(matches!(verify_password("", Some(&hash)), Err(AuthError::MissingPassword)));
        assert!(matches!(verify_password("letmein", None), Err(AuthError::NotConfigured)));
    }

    #[test]
    fn session_round_trip_carries_owner() {
        let security = AppConfig::development().security;
        let token = issue_session(&security).unwrap();
        let claims = decode_session(&security, &token).unwrap();
        assert_eq!(claims.sub, security.owner_id);

        let mut other = security.clone();
        other.session_secret = "another-secret".to_string();
        assert!(matches!(decode_session(&other, &token), Err(AuthError::InvalidSession)));
    }

    #[test]
    fn cookie_flags() {
        let mut security = AppConfig::development().security;
        security.secure_cookies = true;
        let cookie = session_cookie(&security, "token".to_string());
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(86_400)));
    }
}
