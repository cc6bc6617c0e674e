//! Token-metered implementation of the `MemeService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{Span, info, info_span};

use crate::models::meme::{Meme, MemeParams, MemeQuery};
use crate::services::auth_service::AuthService;
use crate::services::meme_maker::MemeProvider;
use crate::services::meme_service::{MemeError, MemeService};
use crate::services::token_meter::TokenMeter;

pub struct MeteredMemeService {
    auth: Arc<dyn AuthService>,
    meter: TokenMeter,
    provider: Arc<dyn MemeProvider>,
    span: Span,
}

impl MeteredMemeService {
    #[must_use]
    pub fn new(
        auth: Arc<dyn AuthService>,
        meter: TokenMeter,
        provider: Arc<dyn MemeProvider>,
    ) -> Self {
        Self::with_span(auth, meter, provider, info_span!("memes"))
    }

    #[must_use]
    pub const fn with_span(
        auth: Arc<dyn AuthService>,
        meter: TokenMeter,
        provider: Arc<dyn MemeProvider>,
        span: Span,
    ) -> Self {
        Self {
            auth,
            meter,
            provider,
            span,
        }
    }
}

#[async_trait]
impl MemeService for MeteredMemeService {
    async fn generate(&self, credential: &str, query: &MemeQuery) -> Result<Meme, MemeError> {
        let user = self.auth.resolve(credential).await?;
        let params = MemeParams::try_from(query)?;

        let provider = Arc::clone(&self.provider);
        let meme = self
            .meter
            .run(&user, move || provider.build_meme(&params))
            .await?;

        info!(parent: &self.span, user_id = %user.id, "Meme generated");
        Ok(meme)
    }
}
