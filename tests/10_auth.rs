mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;

use common::{TestApp, PASSWORD};

#[tokio::test]
async fn health_and_root_are_public() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.anonymous(Method::GET, "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["database"], "ok");

    let (status, body) = app.anonymous(Method::GET, "/", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Hostel Admin API");
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_session() -> Result<()> {
    let app = TestApp::new();

    for uri in ["/api/organisations", "/api/cities", "/api/hostels"] {
        let (status, body) = app.anonymous(Method::GET, uri, None).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Authentication required");
    }

    let request = Request::builder()
        .uri("/api/organisations")
        .header(header::COOKIE, "app_authenticated=true")
        .body(Body::empty())?;
    assert_eq!(app.raw(request).await?.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn verify_rejects_missing_and_wrong_passwords() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.anonymous(Method::POST, "/api/auth/verify", Some(json!({}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Password is required");

    let (status, body) = app
        .anonymous(Method::POST, "/api/auth/verify", Some(json!({ "password": "nope" })))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid password");
    Ok(())
}

#[tokio::test]
async fn verify_sets_session_cookie_that_unlocks_api() -> Result<()> {
    let app = TestApp::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/verify")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "password": PASSWORD }).to_string()))?;
    let response = app.raw(request).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(set_cookie.starts_with("app_authenticated="), "{}", set_cookie);
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Strict"));
    assert!(set_cookie.contains("Max-Age=86400"));
    assert!(set_cookie.contains("Path=/"));

    let cookie = set_cookie.split(';').next().unwrap_or_default().to_string();

    let check = Request::builder()
        .uri("/api/auth/check")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())?;
    let response = app.raw(check).await?;
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body: serde_json::Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["authenticated"], true);

    let list = Request::builder()
        .uri("/api/organisations")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())?;
    assert_eq!(app.raw(list).await?.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn check_and_logout_without_session() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.anonymous(Method::GET, "/api/auth/check", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["authenticated"], false);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/logout")
        .body(Body::empty())?;
    let response = app.raw(request).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(cleared.starts_with("app_authenticated="), "{}", cleared);
    Ok(())
}
