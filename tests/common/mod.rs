#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use hostel_admin_api::auth::{issue_session, SESSION_COOKIE};
use hostel_admin_api::config::AppConfig;
use hostel_admin_api::database::indexes::ROOM_COMPONENTS;
use hostel_admin_api::database::{DatabaseError, Document, DocumentStore, MemoryDocumentStore};
use hostel_admin_api::filter::Filter;
use hostel_admin_api::media::{MediaError, MediaStore, UploadedImage};
use hostel_admin_api::{app, AppState};

pub const PASSWORD: &str = "letmein";

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.password_hash = Some(bcrypt::hash(PASSWORD, 4).expect("bcrypt hash"));
    config.security.session_secret = "integration-test-secret".to_string();
    config
}

/// Image host double that records what it was asked to do
#[derive(Default)]
pub struct RecordingMedia {
    pub uploads: Mutex<Vec<(String, String)>>,
    pub deleted: Mutex<Vec<String>>,
}

#[async_trait]
impl MediaStore for RecordingMedia {
    async fn upload(&self, image: &str, folder: &str) -> Result<UploadedImage, MediaError> {
        if image == "reject" {
            return Err(MediaError::Upstream {
                status: 400,
                message: "Invalid image file".to_string(),
            });
        }
        let mut uploads = self.uploads.lock().expect("uploads lock");
        uploads.push((image.to_string(), folder.to_string()));
        let n = uploads.len();
        Ok(UploadedImage {
            url: format!("https://media.test/{}/{}.jpg", folder, n),
            public_id: format!("{}/{}", folder, n),
            width: Some(800),
            height: Some(600),
            format: Some("jpg".to_string()),
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), MediaError> {
        self.deleted.lock().expect("deleted lock").push(public_id.to_string());
        Ok(())
    }
}

/// Memory store whose batch insert of room components always fails
pub struct FailingSeedStore {
    pub inner: MemoryDocumentStore,
}

#[async_trait]
impl DocumentStore for FailingSeedStore {
    async fn insert(&self, collection: &str, doc: Document) -> Result<Document, DatabaseError> {
        self.inner.insert(collection, doc).await
    }

    async fn insert_many(&self, collection: &str, docs: Vec<Document>) -> Result<Vec<Document>, DatabaseError> {
        if collection == ROOM_COMPONENTS {
            return Err(DatabaseError::ConnectionError("seed batch rejected".to_string()));
        }
        self.inner.insert_many(collection, docs).await
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, DatabaseError> {
        self.inner.find(collection, filter).await
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, DatabaseError> {
        self.inner.find_one(collection, filter).await
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, DatabaseError> {
        self.inner.count(collection, filter).await
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        changes: Document,
    ) -> Result<Option<Document>, DatabaseError> {
        self.inner.update_one(collection, filter, changes).await
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, DatabaseError> {
        self.inner.delete_one(collection, filter).await
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, DatabaseError> {
        self.inner.delete_many(collection, filter).await
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        self.inner.ping().await
    }
}

pub struct TestApp {
    pub state: AppState,
    pub media: Arc<RecordingMedia>,
    cookie: String,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryDocumentStore::new()))
    }

    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_parts(store, test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self::with_parts(Arc::new(MemoryDocumentStore::new()), config)
    }

    fn with_parts(store: Arc<dyn DocumentStore>, config: AppConfig) -> Self {
        let token = issue_session(&config.security).expect("session token");
        let media = Arc::new(RecordingMedia::default());
        let state = AppState::new(store, media.clone(), config);
        Self {
            state,
            media,
            cookie: format!("{}={}", SESSION_COOKIE, token),
        }
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.state.store.as_ref()
    }

    async fn send(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = app(self.state.clone()).oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, body))
    }

    fn build(&self, method: Method, uri: &str, body: Option<Value>, cookie: Option<&str>) -> Result<Request<Body>> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };
        Ok(request)
    }

    /// Signed-in request
    pub async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let request = self.build(method, uri, body, Some(&self.cookie))?;
        self.send(request).await
    }

    /// Request without a session cookie
    pub async fn anonymous(&self, method: Method, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let request = self.build(method, uri, body, None)?;
        self.send(request).await
    }

    /// Raw response, for header assertions
    pub async fn raw(&self, request: Request<Body>) -> Result<axum::response::Response> {
        Ok(app(self.state.clone()).oneshot(request).await?)
    }

    pub async fn get(&self, uri: &str) -> Result<(StatusCode, Value)> {
        self.call(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.call(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.call(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> Result<(StatusCode, Value)> {
        self.call(Method::DELETE, uri, None).await
    }

    /// Create an organisation and return its id
    pub async fn organisation(&self, name: &str) -> Result<String> {
        let (status, body) = self
            .post("/api/organisations", json!({ "name": name, "ownerName": "Asha" }))
            .await?;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        Ok(id_of(&body))
    }

    /// Create a hostel (with its seeded components) and return its id
    pub async fn hostel(&self, organisation_id: &str, name: &str) -> Result<String> {
        let (status, body) = self
            .post("/api/hostels", json!({ "name": name, "organisationId": organisation_id }))
            .await?;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        Ok(id_of(&body))
    }

    pub async fn block(&self, hostel_id: &str, name: &str) -> Result<String> {
        let (status, body) = self
            .post("/api/blocks", json!({ "name": name, "hostelId": hostel_id }))
            .await?;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        Ok(id_of(&body))
    }

    /// Remove every component in a container so its parent can be deleted
    pub async fn clear_components(&self, list_uri: &str) -> Result<()> {
        let (_, body) = self.get(list_uri).await?;
        for component in body["data"].as_array().cloned().unwrap_or_default() {
            let (status, body) = self
                .delete(&format!("/api/room-components/{}", component["id"].as_str().unwrap_or_default()))
                .await?;
            assert_eq!(status, StatusCode::OK, "{}", body);
        }
        Ok(())
    }
}

pub fn id_of(body: &Value) -> String {
    body["data"]["id"].as_str().unwrap_or_default().to_string()
}
