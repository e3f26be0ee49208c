//! Subscription plan and what it unlocks

use axum::{extract::State, Json};
use releasio_common::access::{PlanFeatures, PlanName};
use releasio_common::cells;
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub plan: PlanName,
    pub features: PlanFeatures,
}

/// GET /api/plan
pub async fn current_plan(State(state): State<AppState>) -> Json<PlanResponse> {
    let plan = cells::plan(&state.store).get();
    Json(PlanResponse {
        plan,
        features: plan.features(),
    })
}
