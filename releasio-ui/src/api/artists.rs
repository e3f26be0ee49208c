//! Artists and their releases

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::NaiveDate;
use releasio_common::access::Permission;
use releasio_common::actions;
use releasio_common::cells;
use releasio_common::tenancy::{Artist, ArtistId, Release, ReleaseType, ScopedCollection};
use serde::Deserialize;

use super::Acting;
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/artists - the artists the member is assigned to
pub async fn list_artists(
    State(state): State<AppState>,
    Extension(Acting(member)): Extension<Acting>,
) -> Json<Vec<Artist>> {
    let artists = cells::artists(&state.store)
        .get()
        .into_iter()
        .filter(|a| member.role.is_admin() || member.artist_ids.contains(&a.id))
        .collect();
    Json(artists)
}

#[derive(Debug, Deserialize)]
pub struct NewArtist {
    pub name: String,
}

/// POST /api/artists
pub async fn add_artist(
    State(state): State<AppState>,
    Extension(Acting(member)): Extension<Acting>,
    Json(body): Json<NewArtist>,
) -> ApiResult<Json<Artist>> {
    Ok(Json(actions::add_artist(&state.store, &member, &body.name)?))
}

/// GET /api/artists/:artist_id/releases
pub async fn list_releases(
    State(state): State<AppState>,
    Extension(Acting(member)): Extension<Acting>,
    Path(artist_id): Path<i64>,
) -> ApiResult<Json<Vec<Release>>> {
    let releases = cells::releases(&state.store).get();
    let scoped = ScopedCollection::for_member(
        &member,
        Permission::Releases,
        ArtistId(artist_id),
        &releases,
    )?;
    Ok(Json(scoped.into_items()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRelease {
    pub title: String,
    #[serde(rename = "type")]
    pub release_type: ReleaseType,
    pub release_date: NaiveDate,
    #[serde(default)]
    pub cover_art_url: String,
    #[serde(default)]
    pub genre: String,
}

/// POST /api/artists/:artist_id/releases
pub async fn add_release(
    State(state): State<AppState>,
    Extension(Acting(member)): Extension<Acting>,
    Path(artist_id): Path<i64>,
    Json(body): Json<NewRelease>,
) -> ApiResult<Json<Release>> {
    let release = Release {
        id: 0,
        artist_id: ArtistId(artist_id),
        title: body.title,
        release_type: body.release_type,
        release_date: body.release_date,
        cover_art_url: body.cover_art_url,
        genre: body.genre,
        is_favorite: false,
    };
    Ok(Json(actions::add_release(&state.store, &member, release)?))
}
