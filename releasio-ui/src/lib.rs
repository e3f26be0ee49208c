//! releasio-ui library - dashboard service
//!
//! Hosts the dashboard's store for the browser sessions that connect to it:
//! cells are read and written over JSON, every write is gated by the
//! authorization model, and changes stream back to all open tabs over SSE.

use axum::Router;
use releasio_common::events::EventBus;
use releasio_common::{Navigator, Store};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// This service's store context
    pub store: Store,
    /// Cross-context hub; also feeds `GET /api/events`
    pub events: EventBus,
    pub navigator: Navigator,
}

impl AppState {
    pub fn new(store: Store, events: EventBus) -> Self {
        let navigator = Navigator::new(store.clone(), events.clone());
        Self {
            store,
            events,
            navigator,
        }
    }
}

/// Build application router
///
/// Routes under `/api` other than registration and sign-in act on behalf of
/// the member named by the `x-member-id` header (or the `member` query
/// parameter, for EventSource clients).
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, post, put};

    let member_routes = Router::new()
        .route("/api/me", get(api::whoami))
        .route("/api/permissions", get(api::permission_catalog))
        .route("/api/plan", get(api::current_plan))
        .route(
            "/api/cells/:key",
            get(api::get_cell).put(api::put_cell).delete(api::clear_cell),
        )
        .route("/api/navigate", post(api::navigate))
        .route("/api/select-artist", post(api::select_artist))
        .route("/api/releases/:release_id/open", post(api::open_release))
        .route("/api/team", get(api::list_team).post(api::invite))
        .route("/api/team/:id", delete(api::remove))
        .route("/api/team/:id/role", put(api::change_role))
        .route(
            "/api/team/:id/permissions/:permission/toggle",
            post(api::toggle_permission),
        )
        .route(
            "/api/team/:id/artists/:artist_id/toggle",
            post(api::toggle_artist),
        )
        .route("/api/artists", get(api::list_artists).post(api::add_artist))
        .route(
            "/api/artists/:artist_id/releases",
            get(api::list_releases).post(api::add_release),
        )
        .route("/api/activity", get(api::activity))
        .route("/api/events", get(api::event_stream))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::member_middleware,
        ));

    let public = Router::new()
        .route("/api/register", post(api::register))
        .route("/api/sign-in", post(api::sign_in))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes());

    Router::new()
        .merge(member_routes)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
