use crate::error::PoolError;
use crate::types::AccountId;

/// Gate for owner-only operations.
///
/// The owner is fixed at construction. There is deliberately no rotation or
/// recovery path; the admin surface is pause plus emergency withdrawal.
#[derive(Debug, Clone)]
pub struct AccessController {
    owner: AccountId,
}

impl AccessController {
    pub fn new(owner: AccountId) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    pub fn require_owner(&self, caller: &AccountId) -> Result<(), PoolError> {
        if caller == &self.owner {
            Ok(())
        } else {
            Err(PoolError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_passes_gate() {
        let access = AccessController::new(AccountId::new("owner"));
        assert!(access.require_owner(&AccountId::new("owner")).is_ok());
    }

    #[test]
    fn non_owner_is_rejected() {
        let access = AccessController::new(AccountId::new("owner"));
        let err = access.require_owner(&AccountId::new("mallory")).unwrap_err();
        assert_eq!(err, PoolError::Unauthorized);
    }
}
