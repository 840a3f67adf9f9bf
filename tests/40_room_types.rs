mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

use common::{id_of, TestApp};

struct Fixture {
    app: TestApp,
    hostel: String,
    block: String,
    hostel_components: Vec<String>,
    block_components: Vec<String>,
}

fn ids(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

async fn fixture() -> Result<Fixture> {
    let app = TestApp::new();
    let org = app.organisation("Acme").await?;
    let hostel = app.hostel(&org, "Sunrise").await?;
    let block = app.block(&hostel, "A").await?;
    let (_, hostel_components) = app.get(&format!("/api/hostels/{}/components", hostel)).await?;
    let (_, block_components) = app.get(&format!("/api/blocks/{}/components", block)).await?;
    Ok(Fixture {
        hostel_components: ids(&hostel_components),
        block_components: ids(&block_components),
        app,
        hostel,
        block,
    })
}

#[tokio::test]
async fn create_validates_payload() -> Result<()> {
    let f = fixture().await?;
    let uri = format!("/api/hostels/{}/room-types", f.hostel);

    let (status, body) = f.app.post(&uri, json!({ "name": "Deluxe" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name, description, components, and rent are required");

    let (status, body) = f
        .app
        .post(&uri, json!({ "name": "Deluxe", "description": "d", "components": [], "rent": 100 }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "At least one component is required");

    let (status, _) = f
        .app
        .post(
            &uri,
            json!({ "name": "Deluxe", "description": "d", "components": [f.hostel_components[0]], "rent": "-5" }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = f
        .app
        .post(
            &uri,
            json!({ "name": "Deluxe", "description": "d", "components": [f.hostel_components[0]], "rent": "abc" }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn components_must_share_the_container() -> Result<()> {
    let f = fixture().await?;

    let (status, body) = f
        .app
        .post(
            &format!("/api/hostels/{}/room-types", f.hostel),
            json!({
                "name": "Deluxe",
                "description": "Two sharing",
                "components": [f.hostel_components[0], f.block_components[0]],
                "rent": 4000
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

    let (status, _) = f
        .app
        .post(
            &format!("/api/blocks/{}/room-types", f.block),
            json!({
                "name": "Deluxe",
                "description": "Two sharing",
                "components": [Uuid::new_v4()],
                "rent": 4000
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn create_populates_components_and_normalises_cover() -> Result<()> {
    let f = fixture().await?;

    let (status, body) = f
        .app
        .post(
            &format!("/api/blocks/{}/room-types", f.block),
            json!({
                "name": "Deluxe",
                "description": "Two sharing",
                "components": [f.block_components[0], f.block_components[1]],
                "rent": "4500",
                "images": [
                    { "url": "https://img/1.jpg", "title": "One", "isCover": true },
                    { "url": "https://img/2.jpg", "title": "Two", "isCover": true }
                ]
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    let room_type = &body["data"];
    assert_eq!(room_type["rent"], 4500.0);
    assert_eq!(room_type["blockId"], json!(f.block));
    assert_eq!(room_type["hostelId"], json!(f.hostel));
    assert_eq!(room_type["components"].as_array().map(Vec::len), Some(2));
    assert!(room_type["components"][0]["name"].is_string());
    assert!(room_type["components"][0]["description"].is_string());
    assert_eq!(room_type["images"][0]["isCover"], true);
    assert_eq!(room_type["images"][1]["isCover"], false);

    let (_, listed) = f.app.get(&format!("/api/room-types?blockId={}", f.block)).await?;
    assert_eq!(ids(&listed), vec![id_of(&body)]);

    // Block room types are not hostel-level ones
    let (_, listed) = f.app.get(&format!("/api/hostels/{}/room-types", f.hostel)).await?;
    assert!(ids(&listed).is_empty());
    Ok(())
}

#[tokio::test]
async fn update_keeps_images_unless_given() -> Result<()> {
    let f = fixture().await?;
    let (_, created) = f
        .app
        .post(
            "/api/room-types",
            json!({
                "hostelId": f.hostel,
                "name": "Dorm",
                "description": "Six sharing",
                "components": [f.hostel_components[0]],
                "rent": 1500,
                "images": [{ "url": "https://img/1.jpg", "title": "One" }]
            }),
        )
        .await?;
    let id = id_of(&created);
    assert_eq!(created["data"]["images"][0]["isCover"], true);

    let uri = format!("/api/hostels/{}/room-types/{}", f.hostel, id);
    let (status, body) = f
        .app
        .put(
            &uri,
            json!({
                "name": "Dorm XL",
                "description": "Eight sharing",
                "components": [f.hostel_components[0], f.hostel_components[2]],
                "rent": 0
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["name"], "Dorm XL");
    assert_eq!(body["data"]["rent"], 0.0);
    assert_eq!(body["data"]["components"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["data"]["images"].as_array().map(Vec::len), Some(1));

    // Addressed through the wrong container
    let (status, _) = f
        .app
        .get(&format!("/api/blocks/{}/room-types/{}", f.block, id))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn component_in_use_cannot_be_deleted() -> Result<()> {
    let f = fixture().await?;
    let component = f.hostel_components[0].clone();
    let (_, created) = f
        .app
        .post(
            &format!("/api/hostels/{}/room-types", f.hostel),
            json!({ "name": "Dorm", "description": "d", "components": [component], "rent": 1000 }),
        )
        .await?;
    let room_type = id_of(&created);

    let (status, body) = f
        .app
        .delete(&format!("/api/hostels/{}/components/{}", f.hostel, component))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Cannot delete component. It is used by 1 room type(s). Remove it from those room types first."
    );
    assert_eq!(body["roomTypesUsingComponent"], 1);

    let (status, _) = f.app.delete(&format!("/api/room-types/{}", room_type)).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = f.app.get(&format!("/api/room-types/{}", room_type)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Room type not found");

    let (status, body) = f
        .app
        .delete(&format!("/api/hostels/{}/components/{}", f.hostel, component))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], json!(component));
    Ok(())
}

#[tokio::test]
async fn component_crud_through_nested_routes() -> Result<()> {
    let f = fixture().await?;
    let uri = format!("/api/blocks/{}/components", f.block);

    let (status, body) = f.app.post(&uri, json!({ "name": "Geyser" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name and description are required");

    let (status, created) = f
        .app
        .post(&uri, json!({ "name": "Geyser", "description": "15L water heater" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = id_of(&created);
    assert_eq!(created["data"]["blockId"], json!(f.block));

    let (status, body) = f
        .app
        .put(
            &format!("{}/{}", uri, id),
            json!({ "name": "Geyser", "description": "25L water heater" }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["description"], "25L water heater");

    // A block component is not reachable through the hostel
    let (status, body) = f
        .app
        .put(
            &format!("/api/hostels/{}/components/{}", f.hostel, id),
            json!({ "name": "Geyser", "description": "x" }),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Component not found");

    let (_, listed) = f.app.get(&uri).await?;
    assert_eq!(ids(&listed).len(), 15);

    let (status, body) = f.app.get("/api/room-components").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Block ID or hostel ID is required");
    Ok(())
}
