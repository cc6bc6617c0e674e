//! Credential extraction for every gated route.
//!
//! The caller's opaque credential travels in a single request header (`auth`
//! unless `server.credential_header` says otherwise). Only a missing or empty
//! header yields an empty credential, which the authorization service turns
//! into `NoCredential`.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use std::convert::Infallible;
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::services::AuthError;

/// The raw credential presented by the caller.
#[derive(Debug, Clone, Default)]
pub struct Credential(pub String);

impl Credential {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Reads the credential header byte-for-byte; non-ASCII bytes are decoded
/// as UTF-8 so a present header never collapses into an empty credential.
fn header_credential(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .unwrap_or_default()
}

impl FromRequestParts<Arc<AppState>> for Credential {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(header_credential(
            &parts.headers,
            &state.credential_header,
        )))
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        if !matches!(err, AuthError::Store(_)) {
            metrics::counter!("maas_auth_denied_total", "reason" => err.reason()).increment(1);
        }

        match err {
            AuthError::NoCredential => Self::Unauthorized(err.to_string()),
            AuthError::CallerUnknown | AuthError::NotAdmin | AuthError::NotCallerOrAdmin => {
                Self::Forbidden(err.to_string())
            }
            AuthError::Store(e) => Self::from(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};
    use axum::response::IntoResponse;

    fn status_of(err: AuthError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn missing_header_is_empty_credential() {
        assert_eq!(header_credential(&HeaderMap::new(), "auth"), "");
    }

    #[test]
    fn non_ascii_credential_is_kept() {
        let mut headers = HeaderMap::new();
        headers.insert("auth", HeaderValue::from_bytes("café".as_bytes()).unwrap());
        assert_eq!(header_credential(&headers, "auth"), "café");
    }

    #[test]
    fn auth_failures_map_to_distinct_statuses() {
        assert_eq!(status_of(AuthError::NoCredential), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::CallerUnknown), StatusCode::FORBIDDEN);
        assert_eq!(status_of(AuthError::NotAdmin), StatusCode::FORBIDDEN);
        assert_eq!(status_of(AuthError::NotCallerOrAdmin), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(AuthError::Store(crate::db::StoreError::Database(
                sea_orm::DbErr::Custom("down".to_string())
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
