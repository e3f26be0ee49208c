//! Team management

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use releasio_common::access::{
    authorize, Invitation, MemberId, Permission, Role, TeamMember,
};
use releasio_common::actions;
use releasio_common::cells;
use releasio_common::tenancy::ArtistId;
use serde::Deserialize;

use super::Acting;
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/team
pub async fn list_team(
    State(state): State<AppState>,
    Extension(Acting(member)): Extension<Acting>,
) -> ApiResult<Json<Vec<TeamMember>>> {
    authorize(&member, Permission::TeamManagement, None)?;
    Ok(Json(cells::team_members(&state.store).get()))
}

/// POST /api/team
pub async fn invite(
    State(state): State<AppState>,
    Extension(Acting(member)): Extension<Acting>,
    Json(invitation): Json<Invitation>,
) -> ApiResult<Json<TeamMember>> {
    Ok(Json(actions::invite_member(&state.store, &member, invitation)?))
}

/// DELETE /api/team/:id
pub async fn remove(
    State(state): State<AppState>,
    Extension(Acting(member)): Extension<Acting>,
    Path(id): Path<i64>,
) -> ApiResult<Json<TeamMember>> {
    Ok(Json(actions::remove_member(&state.store, &member, MemberId(id))?))
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: Role,
}

/// PUT /api/team/:id/role - permissions reset to the role's preset
pub async fn change_role(
    State(state): State<AppState>,
    Extension(Acting(member)): Extension<Acting>,
    Path(id): Path<i64>,
    Json(body): Json<RoleRequest>,
) -> ApiResult<Json<TeamMember>> {
    Ok(Json(actions::change_member_role(
        &state.store,
        &member,
        MemberId(id),
        body.role,
    )?))
}

/// POST /api/team/:id/permissions/:permission/toggle
pub async fn toggle_permission(
    State(state): State<AppState>,
    Extension(Acting(member)): Extension<Acting>,
    Path((id, permission)): Path<(i64, String)>,
) -> ApiResult<Json<TeamMember>> {
    let permission: Permission = permission.parse()?;
    Ok(Json(actions::toggle_member_permission(
        &state.store,
        &member,
        MemberId(id),
        permission,
    )?))
}

/// POST /api/team/:id/artists/:artist_id/toggle
pub async fn toggle_artist(
    State(state): State<AppState>,
    Extension(Acting(member)): Extension<Acting>,
    Path((id, artist_id)): Path<(i64, i64)>,
) -> ApiResult<Json<TeamMember>> {
    Ok(Json(actions::toggle_member_artist(
        &state.store,
        &member,
        MemberId(id),
        ArtistId(artist_id),
    )?))
}
