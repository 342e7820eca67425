use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use crate::{error::Result, services::dashboard_service::DashboardStats, AppState};

#[utoipa::path(
    get,
    path = "/dashboard/stats",
    responses((status = 200, description = "Funnel counts", body = DashboardStats))
)]
pub async fn get_dashboard_stats(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let stats: DashboardStats = state.dashboard.stats().await?;
    Ok(Json(stats))
}
