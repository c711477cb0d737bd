//! Escrow Store: depositor balances held in trust for a pool
//!
//! Anyone may deposit. Balances leave escrow only through an executed
//! `EscrowWithdraw` step, which moves them into the pool balance.

use custody_types::{Amount, CustodyResult, EscrowLedger, MemberId};
use tracing::{debug, info};

/// Manages escrow deposits and governed withdrawals
#[derive(Clone, Debug, Default)]
pub struct EscrowStore {
    ledger: EscrowLedger,
}

impl EscrowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a persisted ledger
    pub fn from_ledger(ledger: EscrowLedger) -> Self {
        Self { ledger }
    }

    /// Credit `amount` to the depositor's escrow balance
    ///
    /// Not gated: depositors need not be members.
    pub fn deposit(&mut self, depositor: &MemberId, amount: Amount) -> CustodyResult<Amount> {
        let balance = self.ledger.credit(depositor, amount)?;
        info!(
            depositor = %depositor,
            amount = amount.0,
            balance = balance.0,
            "Escrow deposit completed"
        );
        Ok(balance)
    }

    pub fn deposits_of(&self, depositor: &MemberId) -> Amount {
        self.ledger.balance_of(depositor)
    }

    /// Sum of all escrowed value
    pub fn total(&self) -> CustodyResult<Amount> {
        self.ledger.total()
    }

    pub fn ledger(&self) -> &EscrowLedger {
        &self.ledger
    }

    /// Debit a depositor on behalf of an executing action
    ///
    /// Returns the amount released, which the caller must credit to the
    /// pool balance.
    pub(crate) fn withdraw_to_pool(
        &mut self,
        depositor: &MemberId,
        amount: Amount,
    ) -> CustodyResult<Amount> {
        let remaining = self.ledger.debit(depositor, amount)?;
        debug!(
            depositor = %depositor,
            amount = amount.0,
            remaining = remaining.0,
            "Escrow released to pool"
        );
        Ok(amount)
    }
}
