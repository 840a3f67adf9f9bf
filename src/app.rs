use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
use crate::middleware::session_middleware;
use crate::state::AppState;

/// Full application router with shared state applied
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security);

    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/api/auth/verify", post(public::auth_verify))
        .route("/api/auth/check", get(public::auth_check))
        .route("/api/auth/logout", post(public::auth_logout))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    let upload_limit = DefaultBodyLimit::max(state.config.media.max_upload_bytes);

    Router::new()
        .merge(organisation_routes())
        .merge(hostel_routes())
        .merge(block_routes())
        .merge(room_routes())
        .merge(profile_routes())
        .merge(city_routes())
        .route(
            "/api/upload",
            post(protected::upload_post)
                .delete(protected::upload_delete)
                .layer(upload_limit),
        )
        .route_layer(middleware::from_fn_with_state(state, session_middleware))
}

fn organisation_routes() -> Router<AppState> {
    use protected::organisations;

    Router::new()
        .route("/api/organisations", get(organisations::list).post(organisations::create))
        .route(
            "/api/organisations/:id",
            get(organisations::get)
                .put(organisations::update)
                .delete(organisations::delete),
        )
}

fn hostel_routes() -> Router<AppState> {
    use protected::{hostels, profiles, room_components, room_types};

    Router::new()
        .route("/api/hostels", get(hostels::list).post(hostels::create))
        .route(
            "/api/hostels/:id",
            get(hostels::get).put(hostels::update).delete(hostels::delete),
        )
        .route(
            "/api/hostels/:id/components",
            get(room_components::hostel_list).post(room_components::hostel_create),
        )
        .route(
            "/api/hostels/:id/components/:component_id",
            put(room_components::hostel_update).delete(room_components::hostel_delete),
        )
        .route(
            "/api/hostels/:id/room-types",
            get(room_types::hostel_list).post(room_types::hostel_create),
        )
        .route(
            "/api/hostels/:id/room-types/:room_type_id",
            get(room_types::hostel_get)
                .put(room_types::hostel_update)
                .delete(room_types::hostel_delete),
        )
        .route(
            "/api/hostels/:id/profile",
            get(profiles::hostel_get)
                .post(profiles::hostel_create)
                .put(profiles::hostel_upsert)
                .delete(profiles::hostel_delete),
        )
        .route("/api/hostels/:id/profile/banner", delete(profiles::hostel_delete_banner))
}

fn block_routes() -> Router<AppState> {
    use protected::{blocks, profiles, room_components, room_types};

    Router::new()
        .route("/api/blocks", get(blocks::list).post(blocks::create))
        .route(
            "/api/blocks/:id",
            get(blocks::get).put(blocks::update).delete(blocks::delete),
        )
        .route(
            "/api/blocks/:id/components",
            get(room_components::block_list).post(room_components::block_create),
        )
        .route(
            "/api/blocks/:id/components/:component_id",
            put(room_components::block_update).delete(room_components::block_delete),
        )
        .route(
            "/api/blocks/:id/room-types",
            get(room_types::block_list).post(room_types::block_create),
        )
        .route(
            "/api/blocks/:id/room-types/:room_type_id",
            get(room_types::block_get)
                .put(room_types::block_update)
                .delete(room_types::block_delete),
        )
        .route(
            "/api/blocks/:id/profile",
            get(profiles::block_get)
                .post(profiles::block_create)
                .put(profiles::block_upsert)
                .delete(profiles::block_delete),
        )
}

fn room_routes() -> Router<AppState> {
    use protected::{room_components, room_types};

    Router::new()
        .route(
            "/api/room-components",
            get(room_components::list).post(room_components::create),
        )
        .route(
            "/api/room-components/:id",
            get(room_components::get)
                .put(room_components::update)
                .delete(room_components::delete),
        )
        .route("/api/room-types", get(room_types::list).post(room_types::create))
        .route(
            "/api/room-types/:id",
            get(room_types::get).put(room_types::update).delete(room_types::delete),
        )
}

fn profile_routes() -> Router<AppState> {
    use protected::profiles;

    Router::new()
        .route(
            "/api/organisation-profile/:id",
            get(profiles::organisation_get)
                .post(profiles::organisation_create)
                .put(profiles::organisation_upsert)
                .delete(profiles::organisation_delete),
        )
        .route("/api/hostel-profile/check-slug", post(profiles::check_slug))
        .route(
            "/api/hostel-profile/:id",
            get(profiles::hostel_get)
                .post(profiles::hostel_create)
                .put(profiles::hostel_upsert)
                .delete(profiles::hostel_delete),
        )
        .route("/api/hostel-profile/:id/banner", delete(profiles::hostel_delete_banner))
        .route(
            "/api/block-profile/:id",
            get(profiles::block_get)
                .post(profiles::block_create)
                .put(profiles::block_upsert)
                .delete(profiles::block_delete),
        )
}

fn city_routes() -> Router<AppState> {
    use protected::cities;

    Router::new()
        .route("/api/cities", get(cities::list).post(cities::create))
        .route(
            "/api/cities/:id",
            get(cities::get).put(cities::update).delete(cities::delete),
        )
}

/// Credentialed CORS for the configured dashboard origins only
fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::new();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}
