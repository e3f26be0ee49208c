//! Generic cell access
//!
//! Reads and writes go through the member-aware helpers of
//! `releasio_common::cells`, so tenant collections are narrowed on read and
//! writes are checked before anything changes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use releasio_common::access::authorize;
use releasio_common::cells;
use serde_json::Value;

use super::Acting;
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/cells/:key
pub async fn get_cell(
    State(state): State<AppState>,
    Extension(Acting(member)): Extension<Acting>,
    Path(key): Path<String>,
) -> Json<Value> {
    Json(cells::read_as(&state.store, &member, &key))
}

/// PUT /api/cells/:key
pub async fn put_cell(
    State(state): State<AppState>,
    Extension(Acting(member)): Extension<Acting>,
    Path(key): Path<String>,
    Json(value): Json<Value>,
) -> ApiResult<Json<Value>> {
    cells::write_as(&state.store, &member, &key, value)?;
    Ok(Json(cells::read_as(&state.store, &member, &key)))
}

/// DELETE /api/cells/:key - reset to the default
pub async fn clear_cell(
    State(state): State<AppState>,
    Extension(Acting(member)): Extension<Acting>,
    Path(key): Path<String>,
) -> ApiResult<StatusCode> {
    if let Some(capability) = cells::write_capability(&key) {
        authorize(&member, capability, None)?;
    }
    if cells::is_tenant_collection(&key) && !member.role.is_admin() {
        // would discard other artists' records
        return Err(releasio_common::Error::InvalidInput(format!(
            "only an admin can clear {}",
            key
        ))
        .into());
    }
    state.store.clear(&key);
    Ok(StatusCode::NO_CONTENT)
}
