//! Custody Pool: the unified entry point for one pool
//!
//! A pool owns its ledger, action registry and audit journal, and lends
//! them to a [`GovernanceEngine`] for each governance call. Queries read
//! the owned state directly.

use crate::config::PoolSettings;
use crate::engine::GovernanceEngine;
use crate::error::{ServiceError, ServiceResult};
use crate::escrow_store::EscrowStore;
use crate::ledger::PoolLedger;
use crate::registry::ActionRegistry;
use chrono::Utc;
use custody_types::{
    ActionId, ActionInfo, ActionStep, Amount, AuditJournal, CustodyError, CustodyResult,
    MemberId, MembershipSet, PoolId, PoolReceipt, PoolSnapshot, ReceiptKind,
};
use tracing::info;

/// A member-governed pooled custody account
#[derive(Clone, Debug)]
pub struct CustodyPool {
    id: PoolId,
    ledger: PoolLedger,
    registry: ActionRegistry,
    journal: AuditJournal,
    /// Sequence of the last snapshot taken
    sequence: u64,
    settings: PoolSettings,
}

impl CustodyPool {
    /// Create a pool whose genesis members are the creator and `co_members`
    pub fn create(creator: MemberId, co_members: impl IntoIterator<Item = MemberId>) -> Self {
        Self::with_settings(creator, co_members, PoolSettings::default())
    }

    pub fn with_settings(
        creator: MemberId,
        co_members: impl IntoIterator<Item = MemberId>,
        settings: PoolSettings,
    ) -> Self {
        let id = PoolId::generate();
        let members = MembershipSet::genesis(creator.clone(), co_members);

        info!(pool = %id, creator = %creator, members = members.count(), "Custody pool created");

        let mut journal = AuditJournal::new(id.clone());
        journal.log_receipt(
            PoolReceipt::new(
                id.clone(),
                ReceiptKind::PoolCreated,
                creator,
                format!("Pool created with {} members", members.count()),
            )
            .with_metadata(
                "members",
                members
                    .iter()
                    .map(MemberId::as_str)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
        );

        Self {
            id,
            ledger: PoolLedger::new(members),
            registry: ActionRegistry::new(),
            journal,
            sequence: 0,
            settings,
        }
    }

    pub fn pool_id(&self) -> &PoolId {
        &self.id
    }

    pub fn settings(&self) -> &PoolSettings {
        &self.settings
    }

    fn engine(&mut self) -> GovernanceEngine<'_> {
        GovernanceEngine::new(
            &self.id,
            &mut self.ledger,
            &mut self.registry,
            &mut self.journal,
            &self.settings,
        )
    }

    // --- Governance ---

    pub fn create_action(
        &mut self,
        caller: &MemberId,
        steps: Vec<ActionStep>,
    ) -> CustodyResult<ActionId> {
        self.engine().create_action(caller, steps)
    }

    /// Create an action from parallel selector/payload arrays
    pub fn create_action_encoded<S, P>(
        &mut self,
        caller: &MemberId,
        selectors: &[S],
        payloads: &[P],
    ) -> CustodyResult<ActionId>
    where
        S: AsRef<str>,
        P: AsRef<[u8]>,
    {
        self.engine()
            .create_action_encoded(caller, selectors, payloads)
    }

    pub fn approve_action(
        &mut self,
        caller: &MemberId,
        id: ActionId,
        vote: bool,
    ) -> CustodyResult<()> {
        self.engine().approve_action(caller, id, vote)
    }

    pub fn execute_action(&mut self, caller: &MemberId, id: ActionId) -> CustodyResult<()> {
        self.engine().execute_action(caller, id)
    }

    // --- Value in ---

    /// Escrow `amount` for `depositor`; open to anyone
    pub fn deposit(&mut self, depositor: &MemberId, amount: Amount) -> CustodyResult<Amount> {
        let balance = self.ledger.escrow.deposit(depositor, amount)?;
        self.journal.log_receipt(
            PoolReceipt::new(
                self.id.clone(),
                ReceiptKind::EscrowDeposited,
                depositor.clone(),
                format!("Escrow deposit: {}", amount),
            )
            .with_amount(amount),
        );
        Ok(balance)
    }

    /// Credit `amount` directly to the pool balance; open to anyone
    pub fn receive(&mut self, from: &MemberId, amount: Amount) -> CustodyResult<Amount> {
        if amount.is_zero() {
            return Err(CustodyError::ZeroAmount);
        }
        self.ledger.balance = self
            .ledger
            .balance
            .checked_add(amount)
            .ok_or(CustodyError::AmountOverflow)?;

        info!(pool = %self.id.short(), from = %from, amount = amount.0, "Value received");
        self.journal.log_receipt(
            PoolReceipt::new(
                self.id.clone(),
                ReceiptKind::ValueReceived,
                from.clone(),
                format!("Value received: {}", amount),
            )
            .with_amount(amount),
        );
        Ok(self.ledger.balance)
    }

    // --- Queries ---

    pub fn total_members(&self) -> usize {
        self.ledger.members.count()
    }

    pub fn is_member(&self, identity: &MemberId) -> bool {
        self.ledger.members.contains(identity)
    }

    pub fn members(&self) -> &[MemberId] {
        self.ledger.members.as_slice()
    }

    pub fn get_action_info(&self, id: ActionId) -> CustodyResult<ActionInfo> {
        self.registry
            .get(id)
            .map(|a| a.info())
            .ok_or(CustodyError::UnknownAction(id))
    }

    /// Unanimity against the membership as it stands now
    pub fn is_action_approved(&self, id: ActionId) -> bool {
        self.registry.is_approved(id, &self.ledger.members)
    }

    pub fn is_action_approved_by_user(&self, id: ActionId, member: &MemberId) -> bool {
        self.registry.is_approved_by(id, member)
    }

    /// Yes-votes from current members
    pub fn approval_count(&self, id: ActionId) -> usize {
        self.registry.approval_count(id, &self.ledger.members)
    }

    pub fn pending_actions(&self) -> Vec<ActionId> {
        self.registry.pending()
    }

    pub fn action_count(&self) -> usize {
        self.registry.len()
    }

    pub fn deposits_of(&self, depositor: &MemberId) -> Amount {
        self.ledger.escrow.deposits_of(depositor)
    }

    pub fn escrow(&self) -> &EscrowStore {
        &self.ledger.escrow
    }

    /// Sum of all escrowed value
    pub fn escrow_total(&self) -> CustodyResult<Amount> {
        self.ledger.escrow.total()
    }

    pub fn pool_balance(&self) -> Amount {
        self.ledger.balance
    }

    pub fn paid_to(&self, recipient: &MemberId) -> Amount {
        self.ledger.paid_to(recipient)
    }

    pub fn ledger(&self) -> &PoolLedger {
        &self.ledger
    }

    pub fn receipts(&self) -> &[PoolReceipt] {
        &self.journal.receipts
    }

    pub fn journal(&self) -> &AuditJournal {
        &self.journal
    }

    pub fn receipts_for_action(&self, id: ActionId) -> Vec<&PoolReceipt> {
        self.journal.receipts_for_action(id)
    }

    // --- Persistence ---

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Snapshot of the current state at the current sequence
    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            pool_id: self.id.clone(),
            sequence: self.sequence,
            saved_at: Utc::now(),
            members: self.ledger.members.clone(),
            actions: self.registry.actions().to_vec(),
            escrow: self.ledger.escrow.ledger().clone(),
            pool_balance: self.ledger.balance,
            payouts: self.ledger.payouts.clone(),
            journal: self.journal.clone(),
        }
    }

    /// Advance the sequence and snapshot the result
    pub fn next_snapshot(&mut self) -> PoolSnapshot {
        self.sequence += 1;
        self.snapshot()
    }

    /// Rebuild a pool from a persisted snapshot
    ///
    /// The snapshot must satisfy the same invariants a live pool keeps:
    /// at least one member, no duplicate members, a representable escrow
    /// total and a gap-free action log.
    pub fn restore(snapshot: PoolSnapshot, settings: PoolSettings) -> ServiceResult<Self> {
        let (first, rest) = snapshot.members.as_slice().split_first().ok_or_else(|| {
            ServiceError::CorruptSnapshot(format!("pool {} has no members", snapshot.pool_id))
        })?;
        let deduplicated = MembershipSet::genesis(first.clone(), rest.iter().cloned());
        if deduplicated.count() != snapshot.members.count() {
            return Err(ServiceError::CorruptSnapshot(format!(
                "pool {} lists a member more than once",
                snapshot.pool_id
            )));
        }
        if snapshot.escrow.total().is_err() {
            return Err(ServiceError::CorruptSnapshot(format!(
                "pool {} escrow total overflows",
                snapshot.pool_id
            )));
        }
        if snapshot.journal.pool_id != snapshot.pool_id {
            return Err(ServiceError::CorruptSnapshot(format!(
                "journal belongs to pool {}, not {}",
                snapshot.journal.pool_id, snapshot.pool_id
            )));
        }
        let registry = ActionRegistry::from_log(snapshot.actions).map_err(|id| {
            ServiceError::CorruptSnapshot(format!("action log out of order at {}", id))
        })?;

        info!(pool = %snapshot.pool_id, sequence = snapshot.sequence, "Custody pool restored");

        Ok(Self {
            ledger: PoolLedger::from_parts(
                snapshot.members,
                EscrowStore::from_ledger(snapshot.escrow),
                snapshot.pool_balance,
                snapshot.payouts,
            ),
            id: snapshot.pool_id,
            registry,
            journal: snapshot.journal,
            sequence: snapshot.sequence,
            settings,
        })
    }
}
