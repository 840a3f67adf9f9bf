mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{id_of, TestApp};

#[tokio::test]
async fn create_generates_slug_and_rejects_duplicates() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.post("/api/cities", json!({ "name": "Pune" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name and state are required");

    let (status, body) = app
        .post(
            "/api/cities",
            json!({ "name": "New Delhi", "state": "Delhi", "metaTitle": "Hostels in New Delhi" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["slug"], "new-delhi");
    assert_eq!(body["data"]["metaTitle"], "Hostels in New Delhi");

    let (status, body) = app
        .post("/api/cities", json!({ "name": "new  delhi!", "state": "Delhi" }))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "A city with this name already exists");

    let (status, _) = app.post("/api/cities", json!({ "name": "!!!", "state": "Delhi" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn list_is_alphabetical() -> Result<()> {
    let app = TestApp::new();
    for name in ["Pune", "Ahmedabad", "Mumbai"] {
        let (status, _) = app.post("/api/cities", json!({ "name": name, "state": "X" })).await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app.get("/api/cities").await?;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .map(|items| items.iter().filter_map(|c| c["name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names, vec!["Ahmedabad", "Mumbai", "Pune"]);
    Ok(())
}

#[tokio::test]
async fn rename_regenerates_slug() -> Result<()> {
    let app = TestApp::new();
    let (_, pune) = app.post("/api/cities", json!({ "name": "Pune", "state": "MH" })).await?;
    let (_, mumbai) = app.post("/api/cities", json!({ "name": "Mumbai", "state": "MH" })).await?;
    let pune = id_of(&pune);

    let (status, body) = app
        .put(&format!("/api/cities/{}", pune), json!({ "name": "Pune City", "introContent": "Oxford of the East" }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["slug"], "pune-city");
    assert_eq!(body["data"]["introContent"], "Oxford of the East");

    // Same name as itself is fine
    let (status, _) = app
        .put(&format!("/api/cities/{}", pune), json!({ "name": "Pune City" }))
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .put(&format!("/api/cities/{}", pune), json!({ "name": "Mumbai" }))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "A city with this name already exists");

    let (status, body) = app.get(&format!("/api/cities/{}", id_of(&mumbai))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["slug"], "mumbai");
    Ok(())
}

#[tokio::test]
async fn delete_guarded_by_hostels() -> Result<()> {
    let app = TestApp::new();
    let org = app.organisation("Acme").await?;
    let (_, city) = app.post("/api/cities", json!({ "name": "Pune", "state": "MH" })).await?;
    let city = id_of(&city);
    let (status, hostel) = app
        .post("/api/hostels", json!({ "name": "Sunrise", "organisationId": org, "cityId": city }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.delete(&format!("/api/cities/{}", city)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["hostelCount"], 1);
    assert_eq!(
        body["error"],
        "Cannot delete city. There are 1 hostel(s) associated with this city. Please delete all hostels first."
    );

    let (status, _) = app
        .put(&format!("/api/hostels/{}", id_of(&hostel)), json!({ "cityId": "" }))
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.delete(&format!("/api/cities/{}", city)).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.get(&format!("/api/cities/{}", city)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "City not found");
    Ok(())
}
