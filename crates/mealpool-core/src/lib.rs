//! Shared meal-funding pool ledger.
//!
//! This crate is the ledger state machine: contribution accounting, recipient
//! authorization, per-recipient daily spend caps, the pause switch, and the
//! admin safety valve, composed into one explicitly owned aggregate with a
//! hash-chained event journal. Identity management, wall-clock mapping, and
//! transport live outside and reach the pool only through its public
//! operations.

#![deny(unsafe_code)]

pub mod access;
pub mod error;
pub mod funding;
pub mod journal;
pub mod limiter;
pub mod pause;
pub mod pool;
pub mod registry;
pub mod settlement;
pub mod types;

pub use access::AccessController;
pub use error::{ErrorCategory, PoolError};
pub use funding::FundingLedger;
pub use journal::{EventJournal, JournalEntry};
pub use limiter::{DailyLimiter, DailySpendRecord, DayClock, ManualDayClock, UtcDayClock};
pub use pause::PauseSwitch;
pub use pool::FundingPool;
pub use registry::RecipientRegistry;
pub use settlement::{Settlement, SettlementError, SettlementReceipt};
pub use types::{
    AccountId, PoolConfig, PoolEvent, DEFAULT_DAILY_LIMIT, SECONDS_PER_DAY, UNIT,
};
