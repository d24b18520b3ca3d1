use crate::types::{AccountId, SECONDS_PER_DAY};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Source of the current epoch day index.
///
/// Wall-clock-to-day mapping is the environment's concern; the limiter only
/// consumes the integer index.
pub trait DayClock: Send + Sync {
    fn current_day(&self) -> u64;
}

/// Day index derived from UTC time: floor(unix_seconds / day_length).
#[derive(Debug, Clone)]
pub struct UtcDayClock {
    day_length_secs: u64,
}

impl UtcDayClock {
    pub fn new(day_length_secs: u64) -> Self {
        Self {
            day_length_secs: day_length_secs.max(1),
        }
    }
}

impl Default for UtcDayClock {
    fn default() -> Self {
        Self::new(SECONDS_PER_DAY)
    }
}

impl DayClock for UtcDayClock {
    fn current_day(&self) -> u64 {
        let now = Utc::now().timestamp().max(0) as u64;
        now / self.day_length_secs
    }
}

/// Manually advanced clock for tests and simulations.
///
/// Clones share the same underlying day, so a handle kept outside the pool
/// can roll the day over mid-scenario.
#[derive(Debug, Clone, Default)]
pub struct ManualDayClock {
    day: Arc<AtomicU64>,
}

impl ManualDayClock {
    pub fn new(day: u64) -> Self {
        Self {
            day: Arc::new(AtomicU64::new(day)),
        }
    }

    pub fn set_day(&self, day: u64) {
        self.day.store(day, Ordering::SeqCst);
    }

    pub fn advance_days(&self, days: u64) {
        self.day.fetch_add(days, Ordering::SeqCst);
    }
}

impl DayClock for ManualDayClock {
    fn current_day(&self) -> u64 {
        self.day.load(Ordering::SeqCst)
    }
}

/// Per-recipient spend for one epoch day.
///
/// Valid only while `last_day` equals the current day; any older record
/// counts as zero. Reset happens lazily on the next recorded spend, never by
/// a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySpendRecord {
    pub spent_today: u64,
    pub last_day: u64,
}

/// Rolling per-recipient daily spend accounting.
#[derive(Debug, Clone, Default)]
pub struct DailyLimiter {
    records: BTreeMap<AccountId, DailySpendRecord>,
}

impl DailyLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Amount the recipient has drawn so far today.
    pub fn effective_spent(&self, recipient: &AccountId, today: u64) -> u64 {
        match self.records.get(recipient) {
            Some(record) if record.last_day == today => record.spent_today,
            _ => 0,
        }
    }

    /// Allowance left today under `daily_limit`. Never negative: enforcement
    /// precedes every increment.
    pub fn remaining_allowance(&self, recipient: &AccountId, today: u64, daily_limit: u64) -> u64 {
        daily_limit.saturating_sub(self.effective_spent(recipient, today))
    }

    /// Commit a spend the caller has already validated against the limit.
    ///
    /// A record from an earlier day is reset to zero before the add.
    pub fn record_spend(&mut self, recipient: &AccountId, today: u64, amount: u64) {
        let record = self
            .records
            .entry(recipient.clone())
            .or_insert(DailySpendRecord {
                spent_today: 0,
                last_day: today,
            });
        if record.last_day < today {
            record.spent_today = 0;
            record.last_day = today;
        }
        record.spent_today += amount;
    }

    /// Reverse the most recent `record_spend` after a failed transfer.
    pub fn unrecord_spend(&mut self, recipient: &AccountId, today: u64, amount: u64) {
        if let Some(record) = self.records.get_mut(recipient) {
            if record.last_day == today {
                record.spent_today = record.spent_today.saturating_sub(amount);
            }
        }
    }

    /// Raw record, if one was ever created. Revocation never clears these.
    pub fn record(&self, recipient: &AccountId) -> Option<DailySpendRecord> {
        self.records.get(recipient).copied()
    }
}
