use crate::error::PoolError;
use crate::types::AccountId;
use std::collections::BTreeSet;

/// Set of identities authorized to draw from the pool.
///
/// Pure membership: revoking an approval removes the id from the set and
/// nothing else. Daily-spend history lives in the limiter and survives
/// revocation.
#[derive(Debug, Clone, Default)]
pub struct RecipientRegistry {
    approved: BTreeSet<AccountId>,
}

impl RecipientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_approved(&self, recipient: &AccountId) -> bool {
        self.approved.contains(recipient)
    }

    pub fn approve(&mut self, recipient: &AccountId) -> Result<(), PoolError> {
        if recipient.is_null() {
            return Err(PoolError::InvalidAddress);
        }
        if self.approved.contains(recipient) {
            return Err(PoolError::AlreadyApproved);
        }
        self.approved.insert(recipient.clone());
        Ok(())
    }

    pub fn revoke(&mut self, recipient: &AccountId) -> Result<(), PoolError> {
        if !self.approved.remove(recipient) {
            return Err(PoolError::NotApproved);
        }
        Ok(())
    }

    pub fn ensure_approved(&self, recipient: &AccountId) -> Result<(), PoolError> {
        if self.is_approved(recipient) {
            Ok(())
        } else {
            Err(PoolError::NotApproved)
        }
    }
}
