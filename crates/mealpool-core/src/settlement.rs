use crate::types::AccountId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Failure from an outbound value transfer.
#[derive(Debug, Clone, Error)]
#[error("settlement via '{rail}' failed: {message}")]
pub struct SettlementError {
    pub rail: String,
    pub message: String,
}

impl SettlementError {
    pub fn new(rail: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rail: rail.into(),
            message: message.into(),
        }
    }
}

/// Proof that value left the pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementReceipt {
    pub settlement_id: String,
    pub rail: String,
    pub account: AccountId,
    pub amount: u64,
    pub settled_at: DateTime<Utc>,
}

impl SettlementReceipt {
    pub fn new(rail: impl Into<String>, account: AccountId, amount: u64) -> Self {
        Self {
            settlement_id: Uuid::new_v4().to_string(),
            rail: rail.into(),
            account,
            amount,
            settled_at: Utc::now(),
        }
    }
}

/// Pluggable outbound transfer rail.
///
/// The pool treats every implementation as untrusted: all bookkeeping is
/// committed before `credit` runs, and a returned error rolls the ledger
/// back to its pre-call state. Implementations must not assume they can
/// observe or re-enter the pool mid-call.
pub trait Settlement: Send + Sync {
    fn rail(&self) -> &'static str;

    fn credit(&self, account: &AccountId, amount: u64) -> Result<SettlementReceipt, SettlementError>;
}
