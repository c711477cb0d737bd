//! Governance Engine: create, approve and execute actions
//!
//! The engine borrows the pool's state for the duration of one call. Every
//! entry point runs the authorization gate first; execution then checks
//! existence, state and unanimity (in that order) before handing the batch
//! to a [`Transaction`].

use crate::config::PoolSettings;
use crate::gate::{AuthorizationGate, GatedOperation};
use crate::ledger::PoolLedger;
use crate::registry::ActionRegistry;
use crate::transaction::Transaction;
use custody_types::{
    codec, ActionId, ActionStep, AuditJournal, CustodyError, CustodyResult, MemberId, PoolId,
    PoolReceipt, ReceiptKind, StepDescriptor,
};
use tracing::{info, warn};

/// Orchestrates the action lifecycle over borrowed pool state
pub struct GovernanceEngine<'a> {
    pool_id: &'a PoolId,
    ledger: &'a mut PoolLedger,
    registry: &'a mut ActionRegistry,
    journal: &'a mut AuditJournal,
    settings: &'a PoolSettings,
}

impl<'a> GovernanceEngine<'a> {
    pub fn new(
        pool_id: &'a PoolId,
        ledger: &'a mut PoolLedger,
        registry: &'a mut ActionRegistry,
        journal: &'a mut AuditJournal,
        settings: &'a PoolSettings,
    ) -> Self {
        Self {
            pool_id,
            ledger,
            registry,
            journal,
            settings,
        }
    }

    /// Propose a batch of typed steps
    ///
    /// The caller's approval is recorded with the action.
    pub fn create_action(
        &mut self,
        caller: &MemberId,
        steps: Vec<ActionStep>,
    ) -> CustodyResult<ActionId> {
        self.require_member(caller, GatedOperation::CreateAction)?;
        let descriptors = codec::encode_batch(&steps)?;
        self.store_action(caller, steps, descriptors)
    }

    /// Propose a batch given as parallel selector/payload arrays
    ///
    /// The descriptors are kept byte for byte and reported back by
    /// action queries.
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
        self.require_member(caller, GatedOperation::CreateAction)?;
        let steps = codec::decode_batch(selectors, payloads)?;
        let descriptors = selectors
            .iter()
            .zip(payloads)
            .map(|(selector, payload)| StepDescriptor::new(selector.as_ref(), payload.as_ref()))
            .collect();
        self.store_action(caller, steps, descriptors)
    }

    fn require_member(&self, caller: &MemberId, operation: GatedOperation) -> CustodyResult<()> {
        AuthorizationGate::require_member(&self.ledger.members, caller, operation)
    }

    fn store_action(
        &mut self,
        caller: &MemberId,
        steps: Vec<ActionStep>,
        descriptors: Vec<StepDescriptor>,
    ) -> CustodyResult<ActionId> {
        let selectors: Vec<&str> = steps.iter().map(|s| s.selector()).collect();
        let summary = selectors.join(",");
        let step_count = steps.len();

        let id = self.registry.create(
            steps,
            descriptors,
            caller.clone(),
            self.settings.max_steps_per_action,
        )?;

        self.journal.log_receipt(
            PoolReceipt::new(
                self.pool_id.clone(),
                ReceiptKind::ActionCreated,
                caller.clone(),
                format!("Action created: {}", id),
            )
            .with_action(id)
            .with_metadata("selectors", summary),
        );

        info!(action_id = %id, proposer = %caller, steps = step_count, "Action created");
        Ok(id)
    }

    /// Record or overwrite the caller's vote
    ///
    /// Votes never trigger execution.
    pub fn approve_action(
        &mut self,
        caller: &MemberId,
        id: ActionId,
        vote: bool,
    ) -> CustodyResult<()> {
        self.require_member(caller, GatedOperation::ApproveAction)?;
        self.registry.record_approval(id, caller.clone(), vote)?;

        self.journal.log_receipt(
            PoolReceipt::new(
                self.pool_id.clone(),
                ReceiptKind::ActionApproved,
                caller.clone(),
                format!("Vote recorded on action {}", id),
            )
            .with_action(id)
            .with_metadata("vote", vote.to_string()),
        );

        info!(action_id = %id, voter = %caller, vote, "Vote recorded");
        Ok(())
    }

    /// Run an approved action's batch atomically, exactly once
    pub fn execute_action(&mut self, caller: &MemberId, id: ActionId) -> CustodyResult<()> {
        self.require_member(caller, GatedOperation::ExecuteAction)?;

        let action = self.registry.get(id).ok_or(CustodyError::UnknownAction(id))?;
        if action.is_executed() {
            return Err(CustodyError::AlreadyExecuted(id));
        }
        if !action.is_approved_by_all(self.ledger.members.iter()) {
            return Err(CustodyError::NotApproved(id));
        }
        let steps = action.steps.clone();

        let mut tx = Transaction::begin(
            self.pool_id.clone(),
            self.ledger,
            self.registry,
            self.journal,
        );
        tx.mark_executed(id, caller)?;

        for (index, step) in steps.iter().enumerate() {
            if let Err(err) = tx.apply(step, caller, id) {
                warn!(
                    action_id = %id,
                    step = index,
                    selector = step.selector(),
                    error = %err,
                    "Action execution failed, batch discarded"
                );
                tx.rollback();
                return Err(err);
            }
        }

        tx.commit()?;
        info!(action_id = %id, executor = %caller, steps = steps.len(), "Action executed");
        Ok(())
    }
}
