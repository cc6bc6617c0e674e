//! User administration endpoints.
//!
//! Handlers only translate between HTTP and [`UserService`]; every permission
//! decision happens in the service.
//!
//! [`UserService`]: crate::services::UserService

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::auth::Credential;
use crate::api::{
    ApiError, ApiResponse, AppState, CreateUserRequest, CreatedUserResponse, ResetResponse,
    UpdateUserRequest, UserDto,
};
use crate::domain::User;
use crate::services::UserError;

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Auth(e) => Self::from(e),
            UserError::NotFound(id) => Self::not_found("User", id),
            UserError::CredentialTaken => Self::Conflict(err.to_string()),
            UserError::EnvironmentNotAllowed(_) | UserError::Validation(_) => {
                Self::validation(err.to_string())
            }
            UserError::Store(e) => Self::from(e),
        }
    }
}

/// `GET /users` (admin)
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    credential: Credential,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    let users = state.user_service().list(credential.as_str()).await?;
    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserDto::from).collect(),
    )))
}

/// `GET /users/debug`
///
/// Unauthenticated full dump, credentials included. Refused outside the local
/// environment.
pub async fn list_users_debug(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    let users = state.user_service().list_debug().await?;
    Ok(Json(ApiResponse::success(users)))
}

/// `GET /users/{id}` (the user themself or an admin)
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    credential: Credential,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state.user_service().get(credential.as_str(), &id).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

/// `POST /users` (admin)
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    credential: Credential,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedUserResponse>>), ApiError> {
    let id = state
        .user_service()
        .create(credential.as_str(), request.into())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreatedUserResponse { id })),
    ))
}

/// `PATCH /users/{id}` (admin)
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    credential: Credential,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state
        .user_service()
        .update(credential.as_str(), &id, request.into())
        .await?;
    Ok(Json(ApiResponse::success(user.into())))
}

/// `POST /users/reset`
///
/// Drops every user and writes the seed set. Only the local environment
/// allows it.
pub async fn reset_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<ResetResponse>>, ApiError> {
    let ids = state.user_service().reset().await?;
    Ok(Json(ApiResponse::success(ResetResponse { ids })))
}
