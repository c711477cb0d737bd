//! Audit journal: receipts for committed pool state changes
//!
//! Every committed change produces a receipt. Receipts generated inside a
//! batch that later rolls back never reach the journal.

use crate::{ActionId, Amount, MemberId, PoolId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What kind of change a receipt records
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptKind {
    PoolCreated,
    MemberAdded,
    MemberRemoved,
    ActionCreated,
    ActionApproved,
    ActionExecuted,
    ValueReceived,
    EscrowDeposited,
    EscrowWithdrawn,
    Transferred,
}

/// A receipt issued by a pool
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoolReceipt {
    /// Unique receipt identifier
    pub receipt_id: String,
    /// The pool that issued the receipt
    pub pool_id: PoolId,
    pub kind: ReceiptKind,
    /// The caller whose request produced the receipt
    pub actor: MemberId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_id: Option<ActionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    /// Human-readable description
    pub description: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl PoolReceipt {
    pub fn new(
        pool_id: PoolId,
        kind: ReceiptKind,
        actor: MemberId,
        description: impl Into<String>,
    ) -> Self {
        Self {
            receipt_id: uuid::Uuid::new_v4().to_string(),
            pool_id,
            kind,
            actor,
            action_id: None,
            amount: None,
            description: description.into(),
            timestamp: Utc::now(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_action(mut self, action_id: ActionId) -> Self {
        self.action_id = Some(action_id);
        self
    }

    pub fn with_amount(mut self, amount: Amount) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// The pool's accountability record
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditJournal {
    pub pool_id: PoolId,
    pub receipts: Vec<PoolReceipt>,
}

impl AuditJournal {
    pub fn new(pool_id: PoolId) -> Self {
        Self {
            pool_id,
            receipts: Vec::new(),
        }
    }

    pub fn log_receipt(&mut self, receipt: PoolReceipt) {
        self.receipts.push(receipt);
    }

    /// Append a batch of receipts in order
    pub fn extend(&mut self, receipts: impl IntoIterator<Item = PoolReceipt>) {
        self.receipts.extend(receipts);
    }

    pub fn receipts_for_action(&self, action_id: ActionId) -> Vec<&PoolReceipt> {
        self.receipts
            .iter()
            .filter(|r| r.action_id == Some(action_id))
            .collect()
    }

    pub fn receipts_of_kind(&self, kind: ReceiptKind) -> Vec<&PoolReceipt> {
        self.receipts.iter().filter(|r| r.kind == kind).collect()
    }

    pub fn receipt_count(&self) -> usize {
        self.receipts.len()
    }
}
