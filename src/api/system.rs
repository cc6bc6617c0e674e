use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, PingResponse};

/// Store liveness.
///
/// # Endpoint
/// `GET /ping`
pub async fn ping(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<PingResponse>>, ApiError> {
    state.user_service().ping().await?;
    Ok(Json(ApiResponse::success(PingResponse { status: "pong" })))
}
