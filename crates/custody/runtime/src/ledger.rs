//! Pool ledger: the state an executed batch may touch
//!
//! Membership, escrow, pool balance and payouts live together so a batch
//! can be staged against a single clone and committed in one assignment.

use crate::escrow_store::EscrowStore;
use custody_types::{Amount, MemberId, MembershipSet};
use std::collections::BTreeMap;

/// Mutable effect state of a pool
#[derive(Clone, Debug)]
pub struct PoolLedger {
    pub(crate) members: MembershipSet,
    pub(crate) escrow: EscrowStore,
    pub(crate) balance: Amount,
    pub(crate) payouts: BTreeMap<MemberId, Amount>,
}

impl PoolLedger {
    /// Genesis ledger: given members, empty balances
    pub fn new(members: MembershipSet) -> Self {
        Self {
            members,
            escrow: EscrowStore::new(),
            balance: Amount::zero(),
            payouts: BTreeMap::new(),
        }
    }

    pub(crate) fn from_parts(
        members: MembershipSet,
        escrow: EscrowStore,
        balance: Amount,
        payouts: BTreeMap<MemberId, Amount>,
    ) -> Self {
        Self {
            members,
            escrow,
            balance,
            payouts,
        }
    }

    pub fn members(&self) -> &MembershipSet {
        &self.members
    }

    pub fn escrow(&self) -> &EscrowStore {
        &self.escrow
    }

    /// Spendable value held by the pool itself
    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// Cumulative value transferred to `recipient`
    pub fn paid_to(&self, recipient: &MemberId) -> Amount {
        self.payouts.get(recipient).copied().unwrap_or_default()
    }

    pub fn payouts(&self) -> &BTreeMap<MemberId, Amount> {
        &self.payouts
    }
}
