use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest accounting unit per whole pool token.
pub const UNIT: u64 = 1_000_000_000;

/// Daily limit a freshly created pool starts with: 10 whole units.
pub const DEFAULT_DAILY_LIMIT: u64 = 10 * UNIT;

/// Seconds in one epoch day.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Opaque caller identity.
///
/// Identity and key management live outside the pool; the ledger only
/// compares ids. The empty id is the null identity and is never a valid
/// recipient.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn null() -> Self {
        Self(String::new())
    }

    pub fn is_null(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// State transitions the pool announces on success.
///
/// Events are journaled in order of occurrence; a failed operation emits
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PoolEvent {
    FundsDeposited {
        depositor: AccountId,
        amount: u64,
        new_balance: u64,
    },
    RecipientApproved {
        recipient: AccountId,
    },
    RecipientRevoked {
        recipient: AccountId,
    },
    MealRequested {
        recipient: AccountId,
        amount: u64,
        new_total_funds: u64,
    },
    PoolPaused,
    PoolUnpaused,
    DailyLimitUpdated {
        new_limit: u64,
    },
    EmergencyWithdrawn {
        owner: AccountId,
        amount: u64,
    },
}

impl PoolEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FundsDeposited { .. } => "funds_deposited",
            Self::RecipientApproved { .. } => "recipient_approved",
            Self::RecipientRevoked { .. } => "recipient_revoked",
            Self::MealRequested { .. } => "meal_requested",
            Self::PoolPaused => "pool_paused",
            Self::PoolUnpaused => "pool_unpaused",
            Self::DailyLimitUpdated { .. } => "daily_limit_updated",
            Self::EmergencyWithdrawn { .. } => "emergency_withdrawn",
        }
    }
}

/// Construction-time pool configuration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Per-recipient cap for one epoch day, in minor units. Must be > 0.
    pub daily_limit: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            daily_limit: DEFAULT_DAILY_LIMIT,
        }
    }
}
