use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::database::DatabaseManager;
use crate::state::AppState;

/// GET / - service banner
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "data": {
            "name": "Hostel Admin API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "auth": "/api/auth/verify, /api/auth/check, /api/auth/logout (public)",
                "organisations": "/api/organisations[/:id]",
                "hostels": "/api/hostels[/:id][/components|/room-types|/profile]",
                "blocks": "/api/blocks[/:id][/components|/room-types|/profile]",
                "room_components": "/api/room-components[/:id]",
                "room_types": "/api/room-types[/:id]",
                "cities": "/api/cities[/:id]",
                "profiles": "/api/{organisation,hostel,block}-profile/:id",
                "upload": "/api/upload"
            }
        }
    }))
}

/// GET /health - pings the document store
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(state.store.as_ref()).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": { "status": "degraded", "timestamp": now, "database_error": e.to_string() }
                })),
            )
        }
    }
}
