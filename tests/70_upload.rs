mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{test_config, TestApp};

#[tokio::test]
async fn upload_uses_default_folder() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app
        .post("/api/upload", json!({ "image": "data:image/png;base64,iVBORw0KGgo=" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["publicId"], "hostels/1");
    assert_eq!(body["data"]["url"], "https://media.test/hostels/1.jpg");
    assert_eq!(body["data"]["width"], 800);

    let (status, body) = app
        .post("/api/upload", json!({ "image": "https://example.com/a.jpg", "folder": "banners" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["publicId"], "banners/2");

    let uploads = app.media.uploads.lock().expect("lock").clone();
    assert_eq!(uploads[1], ("https://example.com/a.jpg".to_string(), "banners".to_string()));
    Ok(())
}

#[tokio::test]
async fn upload_errors() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.post("/api/upload", json!({})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Image data is required");

    let (status, body) = app.post("/api/upload", json!({ "image": "reject" })).await?;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .anonymous(Method::POST, "/api/upload", Some(json!({ "image": "x" })))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn delete_by_public_id() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.delete("/api/upload").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Public ID is required");

    let (status, body) = app.delete("/api/upload?publicId=hostels%2Fabc").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(*app.media.deleted.lock().expect("lock"), vec!["hostels/abc".to_string()]);
    Ok(())
}

fn jpeg_data_uri(encoded_len: usize) -> String {
    format!("data:image/jpeg;base64,{}", "A".repeat(encoded_len))
}

#[tokio::test]
async fn phone_sized_photo_reaches_image_host() -> Result<()> {
    let app = TestApp::new();
    let image = jpeg_data_uri(6 * 1024 * 1024);

    let (status, body) = app.post("/api/upload", json!({ "image": image })).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body["error"]);
    let uploads = app.media.uploads.lock().expect("lock").clone();
    assert_eq!(uploads[0].0.len(), image.len());
    Ok(())
}

#[tokio::test]
async fn upload_over_configured_limit_is_rejected() -> Result<()> {
    let mut config = test_config();
    config.media.max_upload_bytes = 1024 * 1024;
    let app = TestApp::with_config(config);

    let (status, body) = app
        .post("/api/upload", json!({ "image": jpeg_data_uri(2 * 1024 * 1024) }))
        .await?;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    assert!(app.media.uploads.lock().expect("lock").is_empty());

    // Under the limit still goes through
    let (status, _) = app.post("/api/upload", json!({ "image": jpeg_data_uri(512 * 1024) })).await?;
    assert_eq!(status, StatusCode::CREATED);
    Ok(())
}
