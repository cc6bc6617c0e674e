//! Per-user token metering.
//!
//! A metered operation is paid for before it runs: the balance check and the
//! decrement happen in one conditional store write, and only after that write
//! succeeds is the protected operation invoked. A failing operation keeps its
//! token.

use std::fmt::Display;
use std::sync::Arc;
use thiserror::Error;
use tracing::{Span, debug, error, info_span, warn};

use crate::db::{StoreError, TokenLedger};
use crate::domain::{User, UserId};

#[derive(Debug, Error)]
pub enum MeterError {
    #[error("User {user_id} has {remaining} tokens, {cost} needed")]
    InsufficientTokens {
        user_id: UserId,
        remaining: i64,
        cost: u32,
    },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The operation ran after the charge and failed; the charge stands.
    #[error("Metered operation failed: {0}")]
    OperationFailed(String),
}

pub struct TokenMeter {
    ledger: Arc<dyn TokenLedger>,
    cost: u32,
    span: Span,
}

impl TokenMeter {
    #[must_use]
    pub fn new(ledger: Arc<dyn TokenLedger>, cost: u32) -> Self {
        Self::with_span(ledger, cost, info_span!("token_meter"))
    }

    #[must_use]
    pub fn with_span(ledger: Arc<dyn TokenLedger>, cost: u32, span: Span) -> Self {
        Self {
            ledger,
            cost,
            span,
        }
    }

    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Charges `user` one unit cost.
    ///
    /// The in-hand balance is only a fast rejection; the authoritative check is
    /// the store's conditional decrement, which loses cleanly to a concurrent
    /// charge that took the last tokens.
    pub async fn charge(&self, user: &User) -> Result<(), MeterError> {
        if user.tokens_remaining < i64::from(self.cost) {
            debug!(
                parent: &self.span,
                user_id = %user.id,
                remaining = user.tokens_remaining,
                "Not enough tokens"
            );
            return Err(self.insufficient(user));
        }

        let consumed = self
            .ledger
            .consume_tokens(user.id, i64::from(self.cost))
            .await
            .map_err(|e| {
                error!(parent: &self.span, user_id = %user.id, error = %e, "Failed to persist token charge");
                MeterError::Store(e)
            })?;

        if !consumed {
            warn!(
                parent: &self.span,
                user_id = %user.id,
                "Token charge lost to a concurrent request"
            );
            return Err(self.insufficient(user));
        }

        metrics::counter!("maas_tokens_consumed_total").increment(u64::from(self.cost));
        debug!(parent: &self.span, user_id = %user.id, cost = self.cost, "Tokens consumed");
        Ok(())
    }

    /// Charges `user`, then runs `operation` exactly once.
    ///
    /// `operation` never runs when the charge fails.
    pub async fn run<T, E, F>(&self, user: &User, operation: F) -> Result<T, MeterError>
    where
        F: FnOnce() -> Result<T, E> + Send,
        E: Display,
    {
        self.charge(user).await?;

        operation().map_err(|e| {
            error!(parent: &self.span, user_id = %user.id, error = %e, "Metered operation failed after charge");
            MeterError::OperationFailed(e.to_string())
        })
    }

    fn insufficient(&self, user: &User) -> MeterError {
        MeterError::InsufficientTokens {
            user_id: user.id,
            remaining: user.tokens_remaining.max(0),
            cost: self.cost,
        }
    }
}
