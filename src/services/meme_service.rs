//! Domain service for metered meme generation.
//!
//! Order of a request: identify the caller, parse the query, charge one
//! token, build the meme. Bad parameters are rejected before any charge.

use thiserror::Error;

use crate::models::meme::{Meme, MemeQuery, ParamError};
use crate::services::auth_service::AuthError;
use crate::services::token_meter::MeterError;

#[derive(Debug, Error)]
pub enum MemeError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    InvalidParams(#[from] ParamError),

    #[error(transparent)]
    Metering(#[from] MeterError),
}

#[async_trait::async_trait]
pub trait MemeService: Send + Sync {
    /// Generates a meme for the caller holding `credential`, charging them.
    ///
    /// # Errors
    ///
    /// Authorization failures pass through as [`MemeError::Auth`]; a charge
    /// that cannot be made, or a build that fails after the charge, is
    /// [`MemeError::Metering`].
    async fn generate(&self, credential: &str, query: &MemeQuery) -> Result<Meme, MemeError>;
}
