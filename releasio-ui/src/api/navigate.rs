//! View navigation and artist selection

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use releasio_common::access::ViewId;
use releasio_common::tenancy::ArtistId;
use releasio_common::NavigationOutcome;
use serde::Deserialize;

use super::Acting;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub view: ViewId,
}

/// POST /api/navigate
///
/// 403 (and an `AccessDenied` event) when the gate refuses; a detail view
/// whose entity is gone answers with its list view instead.
pub async fn navigate(
    State(state): State<AppState>,
    Extension(Acting(member)): Extension<Acting>,
    Json(body): Json<NavigateRequest>,
) -> ApiResult<Json<NavigationOutcome>> {
    Ok(Json(state.navigator.navigate(&member, body.view)?))
}

#[derive(Debug, Deserialize)]
pub struct SelectArtistRequest {
    pub artist_id: ArtistId,
}

/// POST /api/select-artist
pub async fn select_artist(
    State(state): State<AppState>,
    Extension(Acting(member)): Extension<Acting>,
    Json(body): Json<SelectArtistRequest>,
) -> ApiResult<StatusCode> {
    state.navigator.select_artist(&member, body.artist_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/releases/:release_id/open
pub async fn open_release(
    State(state): State<AppState>,
    Extension(Acting(member)): Extension<Acting>,
    Path(release_id): Path<i64>,
) -> ApiResult<Json<NavigationOutcome>> {
    Ok(Json(state.navigator.open_release(&member, release_id)?))
}
