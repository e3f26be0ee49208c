//! Acting member resolution, registration and sign-in
//!
//! The acting member is named by the `x-member-id` header, or by a `member`
//! query parameter for clients that cannot set headers (the browser's
//! `EventSource`). This identifies, it does not authenticate: the gate decides what the member may do, but
//! nothing proves the caller is that member.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    Extension, Json,
};
use releasio_common::access::{MemberId, TeamMember, CATEGORIES};
use releasio_common::actions;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub const MEMBER_HEADER: &str = "x-member-id";

/// The team member a request acts for
#[derive(Debug, Clone)]
pub struct Acting(pub TeamMember);

pub const MEMBER_QUERY: &str = "member";

fn member_from_query(request: &Request) -> Option<&str> {
    let query = request.uri().query().unwrap_or("");
    query.split('&').find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        (name == MEMBER_QUERY).then_some(value)
    })
}

/// Resolve `x-member-id` (or `?member=`) to a current team member
///
/// Returns 401 when neither is given, the id is malformed, or names nobody.
pub async fn member_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let raw = match request.headers().get(MEMBER_HEADER) {
        Some(header) => header.to_str().ok(),
        None => Some(member_from_query(&request).ok_or_else(|| {
            ApiError::Unauthorized(format!("{} header required", MEMBER_HEADER))
        })?),
    };
    let id = raw
        .and_then(|v| v.trim().parse::<i64>().ok())
        .ok_or_else(|| ApiError::Unauthorized(format!("{} must be a number", MEMBER_HEADER)))?;

    let member = actions::member(&state.store, MemberId(id))
        .map_err(|_| ApiError::Unauthorized(format!("no team member {}", id)))?;

    debug!(member = %member.id, "{} {}", request.method(), request.uri().path());
    request.extensions_mut().insert(Acting(member));
    Ok(next.run(request).await)
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
}

/// POST /api/register - create the account owner (an Admin)
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<Json<TeamMember>> {
    Ok(Json(actions::register_owner(&state.store, &body.name, &body.email)?))
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
}

/// POST /api/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    Json(body): Json<SignInRequest>,
) -> ApiResult<Json<TeamMember>> {
    Ok(Json(actions::sign_in(&state.store, &body.email)?))
}

/// GET /api/me
pub async fn whoami(Extension(Acting(member)): Extension<Acting>) -> Json<TeamMember> {
    Json(member)
}

/// GET /api/permissions - the catalog grouped by category
pub async fn permission_catalog() -> Json<Value> {
    let categories: Vec<Value> = CATEGORIES
        .iter()
        .map(|category| {
            json!({
                "category": category,
                "label": category.label(),
                "permissions": category
                    .permissions()
                    .iter()
                    .map(|p| json!({ "id": p, "label": p.label() }))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();
    Json(Value::Array(categories))
}
