use crate::error::PoolError;

/// Global circuit breaker for value-moving operations.
#[derive(Debug, Clone, Default)]
pub struct PauseSwitch {
    paused: bool,
}

impl PauseSwitch {
    pub fn new() -> Self {
        Self { paused: false }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) -> Result<(), PoolError> {
        if self.paused {
            return Err(PoolError::AlreadyPaused);
        }
        self.paused = true;
        Ok(())
    }

    pub fn unpause(&mut self) -> Result<(), PoolError> {
        if !self.paused {
            return Err(PoolError::NotPaused);
        }
        self.paused = false;
        Ok(())
    }

    /// Fails while paused. Deposits and disbursements call this first.
    pub fn ensure_active(&self) -> Result<(), PoolError> {
        if self.paused {
            Err(PoolError::PoolPaused)
        } else {
            Ok(())
        }
    }

    /// Fails unless paused. Emergency withdrawal calls this first.
    pub fn ensure_paused(&self) -> Result<(), PoolError> {
        if self.paused {
            Ok(())
        } else {
            Err(PoolError::MustBePausedFirst)
        }
    }
}
