use std::sync::Arc;

use crate::application::ports::{CreditLedger, LedgerError};
use crate::domain::UserId;

/// Wraps the expensive pipeline with a balance pre-check and a post-success
/// deduction. The pre-check/deduct split is deliberately non-atomic; the
/// ledger's atomic procedures are the final arbiter.
pub struct CreditGate {
    ledger: Arc<dyn CreditLedger>,
    recipe_cost: i64,
    default_credits: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum CreditGateError {
    #[error("insufficient credits: {current_balance} available, {required} required")]
    Insufficient { current_balance: i64, required: i64 },
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl CreditGate {
    pub fn new(ledger: Arc<dyn CreditLedger>, recipe_cost: i64, default_credits: i64) -> Self {
        Self {
            ledger,
            recipe_cost,
            default_credits,
        }
    }

    pub fn recipe_cost(&self) -> i64 {
        self.recipe_cost
    }

    /// Current balance, with the configured default for users who have no
    /// balance row yet.
    pub async fn balance(&self, user: &UserId) -> Result<i64, LedgerError> {
        Ok(self
            .ledger
            .balance(user)
            .await?
            .unwrap_or(self.default_credits))
    }

    /// Rejects the request before any provider call when the balance cannot
    /// cover one generation.
    pub async fn pre_check(&self, user: &UserId) -> Result<i64, CreditGateError> {
        let balance = self.balance(user).await?;
        if balance < self.recipe_cost {
            return Err(CreditGateError::Insufficient {
                current_balance: balance,
                required: self.recipe_cost,
            });
        }
        Ok(balance)
    }

    /// Deducts after a successful generation. A refused or failed deduction
    /// is logged and swallowed: the generated recipe is delivered either
    /// way. Returns the remaining balance when the deduction went through.
    pub async fn settle(&self, user: &UserId) -> Option<i64> {
        match self.ledger.deduct(user, self.recipe_cost).await {
            Ok(Some(remaining)) => Some(remaining),
            Ok(None) => {
                tracing::warn!(
                    user_id = %user,
                    "Credit deduction refused after generation; delivering recipe anyway"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    user_id = %user,
                    error = %e,
                    "Credit deduction failed after generation; delivering recipe anyway"
                );
                None
            }
        }
    }

    /// Credits a verified purchase. Returns the new balance.
    pub async fn grant(&self, user: &UserId, credits: i64) -> Result<i64, LedgerError> {
        self.ledger.add(user, credits).await
    }
}
