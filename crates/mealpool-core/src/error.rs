use thiserror::Error;

/// Funding pool errors.
///
/// Every rejected operation leaves the pool state exactly as it was before
/// the call. Each variant carries a stable reason code for callers that key
/// off machine-readable outcomes rather than display text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("only the pool owner can call this operation")]
    Unauthorized,

    #[error("amount must be greater than 0")]
    InvalidAmount,

    #[error("invalid recipient address")]
    InvalidAddress,

    #[error("daily limit must be greater than 0")]
    InvalidLimit,

    #[error("pool is already paused")]
    AlreadyPaused,

    #[error("pool is not paused")]
    NotPaused,

    #[error("recipient already approved")]
    AlreadyApproved,

    #[error("not an approved recipient")]
    NotApproved,

    #[error("pool must be paused for emergency withdrawal")]
    MustBePausedFirst,

    #[error("pool is paused")]
    PoolPaused,

    #[error("insufficient pool balance")]
    InsufficientBalance,

    #[error("insufficient undisbursed funds")]
    InsufficientFunds,

    #[error("daily limit exceeded")]
    DailyLimitExceeded,

    #[error("arithmetic overflow in balance accounting")]
    ArithmeticOverflow,

    #[error("outbound transfer failed: {0}")]
    TransferFailed(String),
}

impl PoolError {
    /// Stable machine-readable reason code for this error.
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::InvalidAddress => "INVALID_ADDRESS",
            Self::InvalidLimit => "INVALID_LIMIT",
            Self::AlreadyPaused => "ALREADY_PAUSED",
            Self::NotPaused => "NOT_PAUSED",
            Self::AlreadyApproved => "ALREADY_APPROVED",
            Self::NotApproved => "NOT_APPROVED",
            Self::MustBePausedFirst => "MUST_BE_PAUSED_FIRST",
            Self::PoolPaused => "POOL_PAUSED",
            Self::InsufficientBalance => "INSUFFICIENT_BALANCE",
            Self::InsufficientFunds => "INSUFFICIENT_FUNDS",
            Self::DailyLimitExceeded => "DAILY_LIMIT_EXCEEDED",
            Self::ArithmeticOverflow => "ARITHMETIC_OVERFLOW",
            Self::TransferFailed(_) => "TRANSFER_FAILED",
        }
    }

    /// Coarse taxonomy bucket: role violations, malformed input, state
    /// conflicts, or exhausted resources.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Unauthorized => ErrorCategory::Unauthorized,
            Self::InvalidAmount | Self::InvalidAddress | Self::InvalidLimit => {
                ErrorCategory::InvalidInput
            }
            Self::AlreadyPaused
            | Self::NotPaused
            | Self::AlreadyApproved
            | Self::NotApproved
            | Self::MustBePausedFirst
            | Self::PoolPaused => ErrorCategory::StateConflict,
            Self::InsufficientBalance | Self::InsufficientFunds | Self::DailyLimitExceeded => {
                ErrorCategory::ResourceExhausted
            }
            Self::ArithmeticOverflow | Self::TransferFailed(_) => ErrorCategory::Internal,
        }
    }
}

/// Error taxonomy buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Unauthorized,
    InvalidInput,
    StateConflict,
    ResourceExhausted,
    Internal,
}
