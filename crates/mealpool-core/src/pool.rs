use crate::access::AccessController;
use crate::error::PoolError;
use crate::funding::FundingLedger;
use crate::journal::{EventJournal, JournalEntry};
use crate::limiter::{DailyLimiter, DailySpendRecord, DayClock};
use crate::pause::PauseSwitch;
use crate::registry::RecipientRegistry;
use crate::settlement::{Settlement, SettlementReceipt};
use crate::types::{AccountId, PoolConfig, PoolEvent};
use std::sync::Arc;

/// The funding pool ledger state machine.
///
/// One explicitly owned aggregate: contribution accounting, recipient
/// authorization, daily-spend limiting, the pause switch, and the event
/// journal all live here, and every mutating operation takes `&mut self`,
/// so calls are serialized by construction. The only outbound effect is the
/// settlement rail, which runs strictly after bookkeeping is committed.
pub struct FundingPool {
    access: AccessController,
    pause: PauseSwitch,
    funding: FundingLedger,
    registry: RecipientRegistry,
    limiter: DailyLimiter,
    daily_limit: u64,
    clock: Arc<dyn DayClock>,
    settlement: Arc<dyn Settlement>,
    journal: EventJournal,
}

// Manual impl because `clock` and `settlement` are trait objects without Debug.
impl std::fmt::Debug for FundingPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FundingPool")
            .field("daily_limit", &self.daily_limit)
            .finish_non_exhaustive()
    }
}

impl FundingPool {
    /// Create a pool owned by `owner`, unpaused, with zero funds.
    pub fn new(
        owner: AccountId,
        config: PoolConfig,
        clock: Arc<dyn DayClock>,
        settlement: Arc<dyn Settlement>,
    ) -> Result<Self, PoolError> {
        if config.daily_limit == 0 {
            return Err(PoolError::InvalidLimit);
        }

        Ok(Self {
            access: AccessController::new(owner),
            pause: PauseSwitch::new(),
            funding: FundingLedger::new(),
            registry: RecipientRegistry::new(),
            limiter: DailyLimiter::new(),
            daily_limit: config.daily_limit,
            clock,
            settlement,
            journal: EventJournal::new(),
        })
    }

    // ---- mutating operations ----

    /// Contribute value to the pool. Returns the depositor's new cumulative
    /// balance.
    pub fn fund(&mut self, caller: &AccountId, amount: u64) -> Result<u64, PoolError> {
        if amount == 0 {
            return Err(PoolError::InvalidAmount);
        }
        self.pause.ensure_active()?;

        let new_balance = self.funding.deposit(caller, amount)?;
        self.journal.append(PoolEvent::FundsDeposited {
            depositor: caller.clone(),
            amount,
            new_balance,
        });
        Ok(new_balance)
    }

    /// Authorize `recipient` to draw from the pool. Owner only.
    pub fn approve_recipient(
        &mut self,
        caller: &AccountId,
        recipient: &AccountId,
    ) -> Result<(), PoolError> {
        self.access.require_owner(caller)?;
        self.registry.approve(recipient)?;
        self.journal.append(PoolEvent::RecipientApproved {
            recipient: recipient.clone(),
        });
        Ok(())
    }

    /// Remove `recipient` from the approved set. Owner only. Daily-spend
    /// history is left in place.
    pub fn revoke_recipient(
        &mut self,
        caller: &AccountId,
        recipient: &AccountId,
    ) -> Result<(), PoolError> {
        self.access.require_owner(caller)?;
        self.registry.revoke(recipient)?;
        self.journal.append(PoolEvent::RecipientRevoked {
            recipient: recipient.clone(),
        });
        Ok(())
    }

    /// Draw `amount` from the pool as an approved recipient.
    ///
    /// Validation is ordered and fail-fast; nothing is touched until every
    /// check passes. The ledger and spend record are committed before the
    /// settlement rail runs, and a rail failure restores the exact pre-call
    /// state.
    pub fn request_disbursement(
        &mut self,
        caller: &AccountId,
        amount: u64,
    ) -> Result<SettlementReceipt, PoolError> {
        self.pause.ensure_active()?;
        self.registry.ensure_approved(caller)?;
        if amount == 0 {
            return Err(PoolError::InvalidAmount);
        }
        if self.funding.contract_balance() < amount {
            return Err(PoolError::InsufficientBalance);
        }
        if self.funding.total_funds() < amount {
            return Err(PoolError::InsufficientFunds);
        }

        let today = self.clock.current_day();
        let spent = self.limiter.effective_spent(caller, today);
        match spent.checked_add(amount) {
            Some(total) if total <= self.daily_limit => {}
            _ => return Err(PoolError::DailyLimitExceeded),
        }

        // Commit bookkeeping, then move value. The rail never observes
        // pre-debit balances.
        self.limiter.record_spend(caller, today, amount);
        self.funding.debit(amount)?;

        match self.settlement.credit(caller, amount) {
            Ok(receipt) => {
                self.journal.append(PoolEvent::MealRequested {
                    recipient: caller.clone(),
                    amount,
                    new_total_funds: self.funding.total_funds(),
                });
                Ok(receipt)
            }
            Err(err) => {
                self.funding.restore(amount)?;
                self.limiter.unrecord_spend(caller, today, amount);
                Err(PoolError::TransferFailed(err.to_string()))
            }
        }
    }

    /// Halt all value-moving operations. Owner only.
    pub fn pause(&mut self, caller: &AccountId) -> Result<(), PoolError> {
        self.access.require_owner(caller)?;
        self.pause.pause()?;
        self.journal.append(PoolEvent::PoolPaused);
        Ok(())
    }

    /// Resume value-moving operations. Owner only.
    pub fn unpause(&mut self, caller: &AccountId) -> Result<(), PoolError> {
        self.access.require_owner(caller)?;
        self.pause.unpause()?;
        self.journal.append(PoolEvent::PoolUnpaused);
        Ok(())
    }

    /// Change the per-recipient daily cap. Owner only, must stay positive.
    pub fn update_daily_limit(
        &mut self,
        caller: &AccountId,
        new_limit: u64,
    ) -> Result<(), PoolError> {
        self.access.require_owner(caller)?;
        if new_limit == 0 {
            return Err(PoolError::InvalidLimit);
        }
        self.daily_limit = new_limit;
        self.journal
            .append(PoolEvent::DailyLimitUpdated { new_limit });
        Ok(())
    }

    /// Drain the entire held balance to the owner. Owner only, and only
    /// while paused. Depositor and recipient records are untouched.
    pub fn emergency_withdraw(
        &mut self,
        caller: &AccountId,
    ) -> Result<SettlementReceipt, PoolError> {
        self.access.require_owner(caller)?;
        self.pause.ensure_paused()?;

        let amount = self.funding.drain();
        let owner = self.access.owner().clone();

        match self.settlement.credit(&owner, amount) {
            Ok(receipt) => {
                self.journal
                    .append(PoolEvent::EmergencyWithdrawn { owner, amount });
                Ok(receipt)
            }
            Err(err) => {
                self.funding.restore(amount)?;
                Err(PoolError::TransferFailed(err.to_string()))
            }
        }
    }

    // ---- read surface ----

    pub fn owner(&self) -> &AccountId {
        self.access.owner()
    }

    pub fn is_paused(&self) -> bool {
        self.pause.is_paused()
    }

    pub fn daily_limit(&self) -> u64 {
        self.daily_limit
    }

    pub fn total_funds(&self) -> u64 {
        self.funding.total_funds()
    }

    /// Value actually held by the pool. Tracks `total_funds` exactly.
    pub fn get_contract_balance(&self) -> u64 {
        self.funding.contract_balance()
    }

    pub fn funder_balance(&self, depositor: &AccountId) -> u64 {
        self.funding.balance_of(depositor)
    }

    pub fn is_approved(&self, recipient: &AccountId) -> bool {
        self.registry.is_approved(recipient)
    }

    /// Allowance `recipient` can still draw today.
    pub fn get_remaining_daily_allowance(&self, recipient: &AccountId) -> u64 {
        let today = self.clock.current_day();
        self.limiter
            .remaining_allowance(recipient, today, self.daily_limit)
    }

    /// Raw daily-spend record, if the recipient ever drew funds.
    pub fn daily_spend_record(&self, recipient: &AccountId) -> Option<DailySpendRecord> {
        self.limiter.record(recipient)
    }

    pub fn events(&self) -> &[JournalEntry] {
        self.journal.entries()
    }

    pub fn verify_journal(&self) -> bool {
        self.journal.verify_chain()
    }

    /// Conservation invariant: held value equals undisbursed total.
    pub fn is_conserved(&self) -> bool {
        self.funding.is_conserved()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limiter::ManualDayClock;
    use crate::settlement::SettlementError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct RecordingRail {
        credits: Mutex<Vec<(AccountId, u64)>>,
    }

    impl RecordingRail {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                credits: Mutex::new(Vec::new()),
            })
        }

        fn credits(&self) -> Vec<(AccountId, u64)> {
            self.credits.lock().unwrap().clone()
        }
    }

    impl Settlement for RecordingRail {
        fn rail(&self) -> &'static str {
            "recording"
        }

        fn credit(
            &self,
            account: &AccountId,
            amount: u64,
        ) -> Result<SettlementReceipt, SettlementError> {
            self.credits.lock().unwrap().push((account.clone(), amount));
            Ok(SettlementReceipt::new("recording", account.clone(), amount))
        }
    }

    struct FailingRail {
        attempts: AtomicUsize,
    }

    impl Settlement for FailingRail {
        fn rail(&self) -> &'static str {
            "failing"
        }

        fn credit(
            &self,
            _account: &AccountId,
            _amount: u64,
        ) -> Result<SettlementReceipt, SettlementError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(SettlementError::new("failing", "rail offline"))
        }
    }

    fn owner() -> AccountId {
        AccountId::new("owner")
    }

    fn alice() -> AccountId {
        AccountId::new("alice")
    }

    fn bob() -> AccountId {
        AccountId::new("bob")
    }

    fn charlie() -> AccountId {
        AccountId::new("charlie")
    }

    fn pool_with_limit(limit: u64) -> (FundingPool, ManualDayClock, Arc<RecordingRail>) {
        let clock = ManualDayClock::new(100);
        let rail = RecordingRail::new();
        let pool = FundingPool::new(
            owner(),
            PoolConfig { daily_limit: limit },
            Arc::new(clock.clone()),
            rail.clone(),
        )
        .unwrap();
        (pool, clock, rail)
    }

    #[derive(Debug, PartialEq, Eq)]
    struct Observation {
        total_funds: u64,
        contract_balance: u64,
        paused: bool,
        daily_limit: u64,
        alice_balance: u64,
        bob_approved: bool,
        bob_record: Option<DailySpendRecord>,
        journal_len: usize,
    }

    fn observe(pool: &FundingPool) -> Observation {
        Observation {
            total_funds: pool.total_funds(),
            contract_balance: pool.get_contract_balance(),
            paused: pool.is_paused(),
            daily_limit: pool.daily_limit(),
            alice_balance: pool.funder_balance(&alice()),
            bob_approved: pool.is_approved(&bob()),
            bob_record: pool.daily_spend_record(&bob()),
            journal_len: pool.events().len(),
        }
    }

    #[test]
    fn new_pool_starts_empty_and_active() {
        let (pool, _, _) = pool_with_limit(10);
        assert_eq!(pool.owner(), &owner());
        assert!(!pool.is_paused());
        assert_eq!(pool.total_funds(), 0);
        assert_eq!(pool.get_contract_balance(), 0);
        assert_eq!(pool.daily_limit(), 10);
    }

    #[test]
    fn zero_daily_limit_rejected_at_construction() {
        let clock = Arc::new(ManualDayClock::new(0));
        let rail = RecordingRail::new();
        let err = FundingPool::new(owner(), PoolConfig { daily_limit: 0 }, clock, rail)
            .unwrap_err();
        assert_eq!(err, PoolError::InvalidLimit);
    }

    #[test]
    fn disbursement_beyond_balance_fails_without_effect() {
        // Scenario: limit 10, alice funds 5, bob approved, bob asks for 7.
        let (mut pool, _, rail) = pool_with_limit(10);

        assert_eq!(pool.fund(&alice(), 5).unwrap(), 5);
        assert_eq!(pool.funder_balance(&alice()), 5);
        assert_eq!(pool.total_funds(), 5);

        pool.approve_recipient(&owner(), &bob()).unwrap();
        assert!(pool.is_approved(&bob()));

        let before = observe(&pool);
        let err = pool.request_disbursement(&bob(), 7).unwrap_err();
        assert_eq!(err, PoolError::InsufficientBalance);
        assert_eq!(observe(&pool), before);
        assert!(rail.credits().is_empty());
    }

    #[test]
    fn daily_limit_is_enforced_across_same_day_requests() {
        // Scenario: fund 20, approve bob, draw 5, then 6 (fails), then 3.
        let (mut pool, _, rail) = pool_with_limit(10);
        pool.fund(&alice(), 20).unwrap();
        pool.approve_recipient(&owner(), &bob()).unwrap();

        pool.request_disbursement(&bob(), 5).unwrap();
        assert_eq!(pool.total_funds(), 15);
        assert_eq!(pool.daily_spend_record(&bob()).unwrap().spent_today, 5);

        let err = pool.request_disbursement(&bob(), 6).unwrap_err();
        assert_eq!(err, PoolError::DailyLimitExceeded);
        assert_eq!(pool.total_funds(), 15);

        pool.request_disbursement(&bob(), 3).unwrap();
        assert_eq!(pool.total_funds(), 12);
        assert_eq!(pool.daily_spend_record(&bob()).unwrap().spent_today, 8);

        assert_eq!(rail.credits(), vec![(bob(), 5), (bob(), 3)]);
        assert!(pool.is_conserved());
    }

    #[test]
    fn paused_pool_rejects_value_movement() {
        let (mut pool, _, _) = pool_with_limit(10);
        pool.fund(&alice(), 5).unwrap();
        pool.approve_recipient(&owner(), &bob()).unwrap();
        pool.pause(&owner()).unwrap();

        assert_eq!(pool.fund(&alice(), 1).unwrap_err(), PoolError::PoolPaused);
        assert_eq!(
            pool.request_disbursement(&bob(), 1).unwrap_err(),
            PoolError::PoolPaused
        );

        pool.unpause(&owner()).unwrap();
        assert_eq!(
            pool.request_disbursement(&charlie(), 1).unwrap_err(),
            PoolError::NotApproved
        );
    }

    #[test]
    fn emergency_withdraw_drains_everything_to_owner() {
        let (mut pool, _, rail) = pool_with_limit(10);
        pool.fund(&alice(), 10).unwrap();
        pool.approve_recipient(&owner(), &bob()).unwrap();

        assert_eq!(
            pool.emergency_withdraw(&owner()).unwrap_err(),
            PoolError::MustBePausedFirst
        );

        pool.pause(&owner()).unwrap();
        let receipt = pool.emergency_withdraw(&owner()).unwrap();
        assert_eq!(receipt.amount, 10);
        assert_eq!(receipt.account, owner());
        assert_eq!(pool.total_funds(), 0);
        assert_eq!(pool.get_contract_balance(), 0);
        // Depositor and recipient records survive the drain.
        assert_eq!(pool.funder_balance(&alice()), 10);
        assert!(pool.is_approved(&bob()));
        assert_eq!(rail.credits(), vec![(owner(), 10)]);
    }

    #[test]
    fn zero_limit_update_rejected_and_limit_unchanged() {
        let (mut pool, _, _) = pool_with_limit(10);
        assert_eq!(
            pool.update_daily_limit(&owner(), 0).unwrap_err(),
            PoolError::InvalidLimit
        );
        assert_eq!(pool.daily_limit(), 10);

        pool.update_daily_limit(&owner(), 15).unwrap();
        assert_eq!(pool.daily_limit(), 15);
    }

    #[test]
    fn only_owner_touches_admin_surface() {
        let (mut pool, _, _) = pool_with_limit(10);
        let intruder = alice();

        assert_eq!(
            pool.approve_recipient(&intruder, &bob()).unwrap_err(),
            PoolError::Unauthorized
        );
        assert_eq!(pool.pause(&intruder).unwrap_err(), PoolError::Unauthorized);
        assert_eq!(
            pool.update_daily_limit(&intruder, 5).unwrap_err(),
            PoolError::Unauthorized
        );
        pool.pause(&owner()).unwrap();
        assert_eq!(
            pool.emergency_withdraw(&intruder).unwrap_err(),
            PoolError::Unauthorized
        );
    }

    #[test]
    fn exact_limit_spend_resets_on_day_rollover() {
        let (mut pool, clock, _) = pool_with_limit(10);
        pool.fund(&alice(), 30).unwrap();
        pool.approve_recipient(&owner(), &bob()).unwrap();

        pool.request_disbursement(&bob(), 10).unwrap();
        assert_eq!(pool.get_remaining_daily_allowance(&bob()), 0);
        assert_eq!(
            pool.request_disbursement(&bob(), 1).unwrap_err(),
            PoolError::DailyLimitExceeded
        );

        clock.advance_days(1);
        assert_eq!(pool.get_remaining_daily_allowance(&bob()), 10);
        pool.request_disbursement(&bob(), 10).unwrap();
        assert_eq!(pool.total_funds(), 10);
    }

    #[test]
    fn revocation_preserves_spend_history() {
        let (mut pool, _, _) = pool_with_limit(10);
        pool.fund(&alice(), 20).unwrap();
        pool.approve_recipient(&owner(), &bob()).unwrap();
        pool.request_disbursement(&bob(), 4).unwrap();

        let record_before = pool.daily_spend_record(&bob());
        pool.revoke_recipient(&owner(), &bob()).unwrap();
        assert!(!pool.is_approved(&bob()));
        assert_eq!(pool.daily_spend_record(&bob()), record_before);

        // Re-approval on the same day picks up the existing spend.
        pool.approve_recipient(&owner(), &bob()).unwrap();
        assert_eq!(pool.get_remaining_daily_allowance(&bob()), 6);
    }

    #[test]
    fn failed_settlement_rolls_back_everything() {
        let clock = ManualDayClock::new(100);
        let rail = Arc::new(FailingRail {
            attempts: AtomicUsize::new(0),
        });
        let mut pool = FundingPool::new(
            owner(),
            PoolConfig { daily_limit: 10 },
            Arc::new(clock.clone()),
            rail.clone(),
        )
        .unwrap();
        pool.fund(&alice(), 20).unwrap();
        pool.approve_recipient(&owner(), &bob()).unwrap();

        let before = observe(&pool);
        let err = pool.request_disbursement(&bob(), 5).unwrap_err();
        assert!(matches!(err, PoolError::TransferFailed(_)));
        assert_eq!(rail.attempts.load(Ordering::SeqCst), 1);
        assert_eq!(observe(&pool), before);
        assert_eq!(pool.get_remaining_daily_allowance(&bob()), 10);
        assert!(pool.is_conserved());

        pool.pause(&owner()).unwrap();
        let before = observe(&pool);
        let err = pool.emergency_withdraw(&owner()).unwrap_err();
        assert!(matches!(err, PoolError::TransferFailed(_)));
        assert_eq!(observe(&pool), before);
    }

    #[test]
    fn conservation_holds_across_mixed_sequences() {
        let (mut pool, clock, _) = pool_with_limit(10);
        let mut deposited = 0_u64;
        let mut disbursed = 0_u64;

        for (day_offset, amount) in [(0, 7_u64), (0, 9), (1, 4), (2, 12)] {
            clock.set_day(100 + day_offset);
            pool.fund(&alice(), amount).unwrap();
            deposited += amount;
            assert!(pool.is_conserved());
        }

        pool.approve_recipient(&owner(), &bob()).unwrap();
        for (day, amount) in [(102_u64, 6_u64), (102, 4), (103, 10), (104, 3)] {
            clock.set_day(day);
            if pool.request_disbursement(&bob(), amount).is_ok() {
                disbursed += amount;
            }
            assert!(pool.is_conserved());
            assert_eq!(pool.total_funds(), deposited - disbursed);
        }
    }

    #[test]
    fn journal_records_every_transition_in_order() {
        let (mut pool, _, _) = pool_with_limit(10);
        pool.fund(&alice(), 20).unwrap();
        pool.approve_recipient(&owner(), &bob()).unwrap();
        pool.request_disbursement(&bob(), 5).unwrap();
        pool.update_daily_limit(&owner(), 15).unwrap();
        pool.revoke_recipient(&owner(), &bob()).unwrap();
        pool.pause(&owner()).unwrap();
        pool.emergency_withdraw(&owner()).unwrap();
        pool.unpause(&owner()).unwrap();

        let names: Vec<&str> = pool.events().iter().map(|e| e.event.name()).collect();
        assert_eq!(
            names,
            vec![
                "funds_deposited",
                "recipient_approved",
                "meal_requested",
                "daily_limit_updated",
                "recipient_revoked",
                "pool_paused",
                "emergency_withdrawn",
                "pool_unpaused",
            ]
        );
        assert!(pool.verify_journal());

        // Rejected calls never reach the journal.
        let len = pool.events().len();
        assert!(pool.fund(&alice(), 0).is_err());
        assert_eq!(pool.events().len(), len);
    }

    #[test]
    fn disbursement_validation_order_is_stable() {
        let (mut pool, _, _) = pool_with_limit(10);
        pool.pause(&owner()).unwrap();
        // Paused outranks every later check, even for unapproved callers.
        assert_eq!(
            pool.request_disbursement(&charlie(), 0).unwrap_err(),
            PoolError::PoolPaused
        );
        pool.unpause(&owner()).unwrap();

        // Approval outranks amount validation.
        assert_eq!(
            pool.request_disbursement(&charlie(), 0).unwrap_err(),
            PoolError::NotApproved
        );

        pool.approve_recipient(&owner(), &bob()).unwrap();
        assert_eq!(
            pool.request_disbursement(&bob(), 0).unwrap_err(),
            PoolError::InvalidAmount
        );
        // Empty pool: balance check fires before the daily limit.
        assert_eq!(
            pool.request_disbursement(&bob(), 1).unwrap_err(),
            PoolError::InsufficientBalance
        );
    }
}
