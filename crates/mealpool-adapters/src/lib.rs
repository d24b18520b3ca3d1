//! Settlement adapters for the meal funding pool.

#![deny(unsafe_code)]

use mealpool_core::settlement::{Settlement, SettlementError, SettlementReceipt};
use mealpool_core::types::AccountId;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// In-memory settlement rail.
///
/// Credits land in a per-account map, so a test or local simulation can
/// assert exactly how much value left the pool and where it went. Shared
/// handles see the same balances.
#[derive(Debug, Default)]
pub struct MemorySettlement {
    accounts: Mutex<BTreeMap<AccountId, u64>>,
}

impl MemorySettlement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total value credited to `account` so far.
    pub fn credited(&self, account: &AccountId) -> u64 {
        self.accounts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(account)
            .copied()
            .unwrap_or(0)
    }

    /// Sum of all credits across accounts.
    pub fn total_credited(&self) -> u64 {
        self.accounts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .values()
            .sum()
    }
}

impl Settlement for MemorySettlement {
    fn rail(&self) -> &'static str {
        "memory"
    }

    fn credit(
        &self,
        account: &AccountId,
        amount: u64,
    ) -> Result<SettlementReceipt, SettlementError> {
        let mut accounts = self
            .accounts
            .lock()
            .map_err(|_| SettlementError::new("memory", "account map poisoned"))?;
        let balance = accounts.entry(account.clone()).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| SettlementError::new("memory", "account balance overflow"))?;

        Ok(SettlementReceipt::new("memory", account.clone(), amount))
    }
}

/// Rail that rejects every credit. Useful for rollback testing.
#[derive(Debug, Clone)]
pub struct AlwaysFailSettlement {
    reason: String,
}

impl AlwaysFailSettlement {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Settlement for AlwaysFailSettlement {
    fn rail(&self) -> &'static str {
        "always-fail"
    }

    fn credit(
        &self,
        _account: &AccountId,
        _amount: u64,
    ) -> Result<SettlementReceipt, SettlementError> {
        Err(SettlementError::new("always-fail", self.reason.clone()))
    }
}
