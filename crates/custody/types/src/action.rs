//! Actions: batched, unanimously approved operations
//!
//! An action is created by a member (who implicitly approves it), collects
//! votes from the other members and is executed at most once. Quorum is
//! computed from the votes and the membership set handed in at evaluation
//! time; an action never caches who its voters are.

use crate::{codec, ActionId, Amount, CustodyError, CustodyResult, MemberId, StepDescriptor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One typed operation inside an action batch
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionStep {
    /// Add an identity to the membership set
    AddMember { member: MemberId },
    /// Remove an identity from the membership set
    RemoveMember { member: MemberId },
    /// Pay value from the pool balance to a recipient
    Transfer { to: MemberId, amount: Amount },
    /// Move a depositor's escrowed value into the pool balance
    EscrowWithdraw { depositor: MemberId, amount: Amount },
}

impl ActionStep {
    pub fn add_member(member: MemberId) -> Self {
        Self::AddMember { member }
    }

    pub fn remove_member(member: MemberId) -> Self {
        Self::RemoveMember { member }
    }

    pub fn transfer(to: MemberId, amount: Amount) -> Self {
        Self::Transfer { to, amount }
    }

    pub fn escrow_withdraw(depositor: MemberId, amount: Amount) -> Self {
        Self::EscrowWithdraw { depositor, amount }
    }

    /// Canonical selector string for this step
    pub fn selector(&self) -> &'static str {
        codec::selector_for(self)
    }

    /// Structural validation applied when an action is created
    pub fn validate(&self) -> CustodyResult<()> {
        match self {
            Self::Transfer { amount, .. } | Self::EscrowWithdraw { amount, .. }
                if amount.is_zero() =>
            {
                Err(CustodyError::InvalidActionShape(format!(
                    "{} carries a zero amount",
                    self.selector()
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Lifecycle state of an action
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ActionState {
    /// Collecting votes
    #[default]
    Created,
    /// Executed; terminal
    Executed,
}

impl ActionState {
    /// Numeric code reported by action queries (0 means "no such action")
    pub fn code(&self) -> u8 {
        match self {
            Self::Created => 1,
            Self::Executed => 2,
        }
    }
}

/// A proposed batch of steps and the votes recorded on it
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    pub steps: Vec<ActionStep>,
    /// The descriptors `steps` were decoded from, exactly as submitted
    pub descriptors: Vec<StepDescriptor>,
    /// Latest recorded stance per voter
    pub approvals: BTreeMap<MemberId, bool>,
    pub state: ActionState,
    pub proposer: MemberId,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executed_by: Option<MemberId>,
}

impl Action {
    /// Create an action; the proposer is recorded as approving it
    ///
    /// `descriptors[i]` is the submitted form of `steps[i]`.
    pub fn new(
        id: ActionId,
        steps: Vec<ActionStep>,
        descriptors: Vec<StepDescriptor>,
        proposer: MemberId,
    ) -> Self {
        let mut approvals = BTreeMap::new();
        approvals.insert(proposer.clone(), true);
        Self {
            id,
            steps,
            descriptors,
            approvals,
            state: ActionState::Created,
            proposer,
            created_at: Utc::now(),
            executed_at: None,
            executed_by: None,
        }
    }

    /// Record (or overwrite) a member's vote
    pub fn record_vote(&mut self, voter: MemberId, vote: bool) {
        self.approvals.insert(voter, vote);
    }

    /// The voter's latest stance; `false` if they never voted
    pub fn is_approved_by(&self, voter: &MemberId) -> bool {
        self.approvals.get(voter).copied().unwrap_or(false)
    }

    /// Unanimity over the given (current) membership
    pub fn is_approved_by_all<'a>(&self, members: impl IntoIterator<Item = &'a MemberId>) -> bool {
        members.into_iter().all(|m| self.is_approved_by(m))
    }

    /// Number of yes-votes among the given membership
    pub fn yes_votes_among<'a>(&self, members: impl IntoIterator<Item = &'a MemberId>) -> usize {
        members
            .into_iter()
            .filter(|m| self.is_approved_by(m))
            .count()
    }

    pub fn is_executed(&self) -> bool {
        self.state == ActionState::Executed
    }

    pub fn mark_executed(&mut self, by: MemberId) {
        self.state = ActionState::Executed;
        self.executed_at = Some(Utc::now());
        self.executed_by = Some(by);
    }

    /// Inspection view: the submitted selectors and payloads, byte for byte
    pub fn info(&self) -> ActionInfo {
        ActionInfo {
            id: self.id,
            selectors: self.descriptors.iter().map(|d| d.selector.clone()).collect(),
            payloads: self.descriptors.iter().map(|d| d.payload.clone()).collect(),
            state: self.state,
        }
    }
}

/// Read-only view of an action: parallel selector/payload arrays and state
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionInfo {
    pub id: ActionId,
    pub selectors: Vec<String>,
    pub payloads: Vec<Vec<u8>>,
    pub state: ActionState,
}

impl ActionInfo {
    pub fn state_code(&self) -> u8 {
        self.state.code()
    }
}
