//! Pool snapshot: the complete persisted state of one pool

use crate::{Action, Amount, AuditJournal, EscrowLedger, MemberId, MembershipSet, PoolId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything a pool needs to resume after a restart
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub pool_id: PoolId,
    /// Monotonically increasing save counter
    pub sequence: u64,
    pub saved_at: DateTime<Utc>,
    pub members: MembershipSet,
    /// Append-only action log, ordered by id
    pub actions: Vec<Action>,
    pub escrow: EscrowLedger,
    pub pool_balance: Amount,
    /// Cumulative value paid out per recipient
    pub payouts: BTreeMap<MemberId, Amount>,
    pub journal: AuditJournal,
}

impl PoolSnapshot {
    /// Short human-readable summary for logs
    pub fn summary(&self) -> String {
        format!(
            "pool {} seq {}: {} members, {} actions, balance {}",
            self.pool_id.short(),
            self.sequence,
            self.members.count(),
            self.actions.len(),
            self.pool_balance
        )
    }
}
