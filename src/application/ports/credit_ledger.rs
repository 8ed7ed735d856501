use async_trait::async_trait;

use crate::domain::UserId;

/// Prepaid credit balance, mutated only through the store's atomic
/// procedures. The service never reads-then-writes a balance.
#[async_trait]
pub trait CreditLedger: Send + Sync {
    /// `None` when the user has no balance row yet.
    async fn balance(&self, user: &UserId) -> Result<Option<i64>, LedgerError>;

    /// Atomic, balance-checked deduction. Returns the new balance, or
    /// `None` when the balance was insufficient at commit time.
    async fn deduct(&self, user: &UserId, amount: i64) -> Result<Option<i64>, LedgerError>;

    /// Atomic addition. Returns the new balance.
    async fn add(&self, user: &UserId, amount: i64) -> Result<i64, LedgerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("query failed: {0}")]
    QueryFailed(String),
}
