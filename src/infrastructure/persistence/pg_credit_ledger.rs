use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::application::ports::{CreditLedger, LedgerError};
use crate::domain::UserId;

/// Credits live in a single balance row per user; every mutation goes
/// through the `deduct_credits` / `add_credits` SQL functions, which are
/// atomic and balance-checked (see migrations). The service layer never
/// reads-then-writes a balance.
pub struct PgCreditLedger {
    pool: PgPool,
}

impl PgCreditLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CreditLedger for PgCreditLedger {
    #[instrument(skip(self), fields(user_id = %user))]
    async fn balance(&self, user: &UserId) -> Result<Option<i64>, LedgerError> {
        let row = sqlx::query("SELECT credits FROM user_credits WHERE user_id = $1")
            .bind(user.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| LedgerError::QueryFailed(e.to_string()))?;

        row.map(|r| r.try_get::<i64, _>("credits"))
            .transpose()
            .map_err(|e| LedgerError::QueryFailed(e.to_string()))
    }

    #[instrument(skip(self), fields(user_id = %user, amount = amount))]
    async fn deduct(&self, user: &UserId, amount: i64) -> Result<Option<i64>, LedgerError> {
        let row = sqlx::query("SELECT deduct_credits($1, $2) AS balance")
            .bind(user.as_str())
            .bind(amount)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| LedgerError::QueryFailed(e.to_string()))?;

        // NULL balance means the deduction was refused for insufficient funds.
        row.try_get::<Option<i64>, _>("balance")
            .map_err(|e| LedgerError::QueryFailed(e.to_string()))
    }

    #[instrument(skip(self), fields(user_id = %user, amount = amount))]
    async fn add(&self, user: &UserId, amount: i64) -> Result<i64, LedgerError> {
        let row = sqlx::query("SELECT add_credits($1, $2) AS balance")
            .bind(user.as_str())
            .bind(amount)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| LedgerError::QueryFailed(e.to_string()))?;

        row.try_get::<i64, _>("balance")
            .map_err(|e| LedgerError::QueryFailed(e.to_string()))
    }
}
