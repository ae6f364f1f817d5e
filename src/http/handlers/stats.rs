use axum::extract::State;
use axum::Json;

use crate::domain::stats::PlatformStats;
use crate::http::{ApiError, AppState};

pub async fn platform(State(state): State<AppState>) -> Result<Json<PlatformStats>, ApiError> {
    Ok(Json(state.stats.platform().await?))
}
