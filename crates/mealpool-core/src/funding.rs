use crate::error::PoolError;
use crate::types::AccountId;
use std::collections::BTreeMap;

/// Contribution accounting for the pool.
///
/// Tracks each depositor's cumulative contribution, the undisbursed total,
/// and the value actually held. The two aggregates are updated together and
/// must agree at every externally observable point; contributions are
/// append-only and never individually withdrawable.
#[derive(Debug, Clone, Default)]
pub struct FundingLedger {
    balances: BTreeMap<AccountId, u64>,
    total_funds: u64,
    contract_balance: u64,
}

impl FundingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_funds(&self) -> u64 {
        self.total_funds
    }

    pub fn contract_balance(&self) -> u64 {
        self.contract_balance
    }

    pub fn balance_of(&self, depositor: &AccountId) -> u64 {
        self.balances.get(depositor).copied().unwrap_or(0)
    }

    /// Record a contribution. Returns the depositor's new cumulative balance.
    ///
    /// The deposited value arrives with the call, so the held balance and the
    /// undisbursed total move in the same step.
    pub fn deposit(&mut self, depositor: &AccountId, amount: u64) -> Result<u64, PoolError> {
        if amount == 0 {
            return Err(PoolError::InvalidAmount);
        }

        let current = self.balance_of(depositor);
        let new_balance = current
            .checked_add(amount)
            .ok_or(PoolError::ArithmeticOverflow)?;
        let new_total = self
            .total_funds
            .checked_add(amount)
            .ok_or(PoolError::ArithmeticOverflow)?;
        let new_held = self
            .contract_balance
            .checked_add(amount)
            .ok_or(PoolError::ArithmeticOverflow)?;

        self.balances.insert(depositor.clone(), new_balance);
        self.total_funds = new_total;
        self.contract_balance = new_held;
        Ok(new_balance)
    }

    /// Remove `amount` from both aggregates ahead of an outbound transfer.
    ///
    /// Fails InsufficientBalance before InsufficientFunds, matching the
    /// disbursement validation order. Depositor records are untouched.
    pub fn debit(&mut self, amount: u64) -> Result<(), PoolError> {
        if self.contract_balance < amount {
            return Err(PoolError::InsufficientBalance);
        }
        if self.total_funds < amount {
            return Err(PoolError::InsufficientFunds);
        }
        self.contract_balance -= amount;
        self.total_funds -= amount;
        Ok(())
    }

    /// Reverse a debit after a failed outbound transfer.
    pub fn restore(&mut self, amount: u64) -> Result<(), PoolError> {
        self.total_funds = self
            .total_funds
            .checked_add(amount)
            .ok_or(PoolError::ArithmeticOverflow)?;
        self.contract_balance = self
            .contract_balance
            .checked_add(amount)
            .ok_or(PoolError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Zero both aggregates, returning the value that was held.
    pub fn drain(&mut self) -> u64 {
        let drained = self.contract_balance;
        self.contract_balance = 0;
        self.total_funds = 0;
        drained
    }

    /// Value conservation check: the held balance must equal the undisbursed
    /// total.
    pub fn is_conserved(&self) -> bool {
        self.total_funds == self.contract_balance
    }
}
