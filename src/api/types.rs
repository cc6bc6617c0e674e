use serde::{Deserialize, Serialize};

use crate::domain::{NewUser, User, UserId, UserPatch};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// A user as returned by the admin endpoints. The credential is never echoed.
#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: UserId,
    pub display_name: String,
    pub is_admin: bool,
    pub tokens_remaining: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            display_name: user.display_name,
            is_admin: user.is_admin,
            tokens_remaining: user.tokens_remaining,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub display_name: String,
    pub credential: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub tokens_remaining: i64,
}

impl From<CreateUserRequest> for NewUser {
    fn from(req: CreateUserRequest) -> Self {
        Self {
            display_name: req.display_name,
            credential: req.credential,
            is_admin: req.is_admin,
            tokens_remaining: req.tokens_remaining,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateUserRequest {
    pub display_name: Option<String>,
    pub credential: Option<String>,
    pub is_admin: Option<bool>,
    pub tokens_remaining: Option<i64>,
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            display_name: req.display_name,
            credential: req.credential,
            is_admin: req.is_admin,
            tokens_remaining: req.tokens_remaining,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedUserResponse {
    pub id: UserId,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub ids: Vec<UserId>,
}

#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub status: &'static str,
}
