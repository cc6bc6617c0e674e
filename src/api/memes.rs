//! Metered meme endpoint.

use axum::{
    Json,
    extract::{Query, State},
};
use std::sync::Arc;

use super::auth::Credential;
use crate::api::{ApiError, ApiResponse, AppState};
use crate::models::meme::{Meme, MemeQuery};
use crate::services::{MemeError, MeterError};

impl From<MeterError> for ApiError {
    fn from(err: MeterError) -> Self {
        match err {
            MeterError::InsufficientTokens { .. } => Self::PaymentRequired(err.to_string()),
            MeterError::Store(e) => Self::from(e),
            MeterError::OperationFailed(msg) => Self::internal(msg),
        }
    }
}

impl From<MemeError> for ApiError {
    fn from(err: MemeError) -> Self {
        match err {
            MemeError::Auth(e) => Self::from(e),
            MemeError::InvalidParams(e) => Self::validation(e.to_string()),
            MemeError::Metering(e) => Self::from(e),
        }
    }
}

/// Builds a meme for the caller and charges one meme's cost.
///
/// # Endpoint
/// `GET /memes?lat=&lon=&query=`
pub async fn get_meme(
    State(state): State<Arc<AppState>>,
    credential: Credential,
    Query(query): Query<MemeQuery>,
) -> Result<Json<ApiResponse<Meme>>, ApiError> {
    let meme = state
        .meme_service()
        .generate(credential.as_str(), &query)
        .await?;
    Ok(Json(ApiResponse::success(meme)))
}
