//! Escrow ledger: per-depositor balances held in trust for a pool
//!
//! Balances only grow through deposits by the depositor and only shrink
//! through withdrawals the governance engine performs for the pool.

use crate::{Amount, CustodyError, CustodyResult, MemberId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-depositor balance ledger
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowLedger {
    balances: BTreeMap<MemberId, Amount>,
}

impl EscrowLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit a depositor's balance
    ///
    /// Fails with `AmountOverflow` if the ledger total would no longer fit.
    pub fn credit(&mut self, depositor: &MemberId, amount: Amount) -> CustodyResult<Amount> {
        if amount.is_zero() {
            return Err(CustodyError::ZeroAmount);
        }
        self.total()?
            .checked_add(amount)
            .ok_or(CustodyError::AmountOverflow)?;
        let current = self.balance_of(depositor);
        let updated = current
            .checked_add(amount)
            .ok_or(CustodyError::AmountOverflow)?;
        self.balances.insert(depositor.clone(), updated);
        Ok(updated)
    }

    /// Debit a depositor's balance (returns error if insufficient)
    pub fn debit(&mut self, depositor: &MemberId, amount: Amount) -> CustodyResult<Amount> {
        let current = self.balance_of(depositor);
        let updated =
            current
                .checked_sub(amount)
                .ok_or_else(|| CustodyError::InsufficientEscrowBalance {
                    depositor: depositor.clone(),
                    required: amount,
                    available: current,
                })?;
        self.balances.insert(depositor.clone(), updated);
        Ok(updated)
    }

    pub fn balance_of(&self, depositor: &MemberId) -> Amount {
        self.balances.get(depositor).copied().unwrap_or_default()
    }

    /// Total held across all depositors
    pub fn total(&self) -> CustodyResult<Amount> {
        self.balances
            .values()
            .try_fold(Amount::zero(), |acc, balance| acc.checked_add(*balance))
            .ok_or(CustodyError::AmountOverflow)
    }
}
