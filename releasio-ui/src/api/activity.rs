//! Team activity feed

use axum::{extract::State, Extension, Json};
use releasio_common::actions::{self, ActivityItem};

use super::Acting;
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/activity - newest first, removed members shown as "Unknown member"
pub async fn activity(
    State(state): State<AppState>,
    Extension(Acting(member)): Extension<Acting>,
) -> ApiResult<Json<Vec<ActivityItem>>> {
    Ok(Json(actions::activity_feed(&state.store, &member)?))
}
