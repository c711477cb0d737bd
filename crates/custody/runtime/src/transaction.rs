//! Transaction: staged change-set for one action execution
//!
//! Steps are applied to a private copy of the pool ledger. Nothing becomes
//! observable until [`Transaction::commit`]; dropping the transaction (or
//! calling [`Transaction::rollback`]) discards every staged effect,
//! including the `Executed` flip and any receipts.

use crate::ledger::PoolLedger;
use crate::registry::ActionRegistry;
use custody_types::{
    ActionId, ActionStep, Amount, AuditJournal, CustodyError, CustodyResult, MemberId, PoolId,
    PoolReceipt, ReceiptKind,
};
use tracing::debug;

/// All-or-nothing application of an action batch
pub struct Transaction<'a> {
    pool_id: PoolId,
    ledger: &'a mut PoolLedger,
    registry: &'a mut ActionRegistry,
    journal: &'a mut AuditJournal,
    staged: PoolLedger,
    executed: Option<(ActionId, MemberId)>,
    receipts: Vec<PoolReceipt>,
}

impl<'a> Transaction<'a> {
    /// Open a transaction over the pool's live state
    pub fn begin(
        pool_id: PoolId,
        ledger: &'a mut PoolLedger,
        registry: &'a mut ActionRegistry,
        journal: &'a mut AuditJournal,
    ) -> Self {
        let staged = ledger.clone();
        Self {
            pool_id,
            ledger,
            registry,
            journal,
            staged,
            executed: None,
            receipts: Vec::new(),
        }
    }

    /// Stage the `Created -> Executed` transition
    ///
    /// Called before the first step is applied.
    pub fn mark_executed(&mut self, id: ActionId, by: &MemberId) -> CustodyResult<()> {
        let action = self.registry.get(id).ok_or(CustodyError::UnknownAction(id))?;
        if action.is_executed() || self.executed.as_ref().is_some_and(|(staged, _)| *staged == id)
        {
            return Err(CustodyError::AlreadyExecuted(id));
        }
        self.executed = Some((id, by.clone()));
        Ok(())
    }

    /// Apply one step to the staged ledger
    pub fn apply(
        &mut self,
        step: &ActionStep,
        caller: &MemberId,
        action_id: ActionId,
    ) -> CustodyResult<()> {
        match step {
            ActionStep::AddMember { member } => {
                if self.staged.members.add(member.clone()) {
                    self.record(
                        ReceiptKind::MemberAdded,
                        caller,
                        action_id,
                        None,
                        format!("Member added: {}", member),
                    );
                }
            }
            ActionStep::RemoveMember { member } => {
                self.staged.members.remove(member)?;
                self.record(
                    ReceiptKind::MemberRemoved,
                    caller,
                    action_id,
                    None,
                    format!("Member removed: {}", member),
                );
            }
            ActionStep::Transfer { to, amount } => {
                let available = self.staged.balance;
                self.staged.balance = available.checked_sub(*amount).ok_or(
                    CustodyError::InsufficientPoolBalance {
                        required: *amount,
                        available,
                    },
                )?;
                let paid = self.staged.payouts.entry(to.clone()).or_default();
                *paid = paid
                    .checked_add(*amount)
                    .ok_or(CustodyError::AmountOverflow)?;
                self.record(
                    ReceiptKind::Transferred,
                    caller,
                    action_id,
                    Some(*amount),
                    format!("Transfer: {} to {}", amount, to),
                );
            }
            ActionStep::EscrowWithdraw { depositor, amount } => {
                let released = self.staged.escrow.withdraw_to_pool(depositor, *amount)?;
                self.staged.balance = self
                    .staged
                    .balance
                    .checked_add(released)
                    .ok_or(CustodyError::AmountOverflow)?;
                self.record(
                    ReceiptKind::EscrowWithdrawn,
                    caller,
                    action_id,
                    Some(released),
                    format!("Escrow withdrawn: {} from {}", released, depositor),
                );
            }
        }
        debug!(action_id = %action_id, selector = step.selector(), "Step staged");
        Ok(())
    }

    /// Read-only view of the staged state
    pub fn staged(&self) -> &PoolLedger {
        &self.staged
    }

    /// Publish every staged effect
    pub fn commit(self) -> CustodyResult<()> {
        if let Some((id, by)) = self.executed {
            self.registry.mark_executed(id, by.clone())?;
            self.journal.log_receipt(
                PoolReceipt::new(
                    self.pool_id.clone(),
                    ReceiptKind::ActionExecuted,
                    by,
                    format!("Action executed: {}", id),
                )
                .with_action(id),
            );
        }
        *self.ledger = self.staged;
        self.journal.extend(self.receipts);
        Ok(())
    }

    /// Discard every staged effect
    pub fn rollback(self) {
        debug!(
            pool = %self.pool_id.short(),
            discarded_receipts = self.receipts.len(),
            "Transaction rolled back"
        );
    }

    fn record(
        &mut self,
        kind: ReceiptKind,
        actor: &MemberId,
        action_id: ActionId,
        amount: Option<Amount>,
        description: String,
    ) {
        let mut receipt = PoolReceipt::new(self.pool_id.clone(), kind, actor.clone(), description)
            .with_action(action_id);
        if let Some(amount) = amount {
            receipt = receipt.with_amount(amount);
        }
        self.receipts.push(receipt);
    }
}
