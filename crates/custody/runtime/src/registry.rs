//! Action Registry: append-only action log with vote bookkeeping
//!
//! Actions are keyed by sequential ids starting at 1 and are never removed.
//! The registry records votes but never decides quorum on its own: every
//! approval query takes the membership set as it stands at that moment.

use custody_types::{
    Action, ActionId, ActionStep, CustodyError, CustodyResult, MemberId, MembershipSet,
    StepDescriptor,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Append-only store of actions
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ActionRegistry {
    /// `actions[i].id == i + 1`
    actions: Vec<Action>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a persisted log
    ///
    /// Returns the first id that breaks the `1, 2, 3, ...` sequence.
    pub fn from_log(actions: Vec<Action>) -> Result<Self, ActionId> {
        for (index, action) in actions.iter().enumerate() {
            let expected = ActionId::new(index as u64 + 1);
            if action.id != expected {
                return Err(action.id);
            }
        }
        Ok(Self { actions })
    }

    /// The id the next created action will receive
    pub fn next_id(&self) -> ActionId {
        ActionId::new(self.actions.len() as u64 + 1)
    }

    /// Store a new action; the proposer is recorded as approving it
    ///
    /// Shape rules: at least one step, at most `max_steps`, one descriptor
    /// per step, every step structurally valid.
    pub fn create(
        &mut self,
        steps: Vec<ActionStep>,
        descriptors: Vec<StepDescriptor>,
        proposer: MemberId,
        max_steps: usize,
    ) -> CustodyResult<ActionId> {
        if steps.is_empty() {
            return Err(CustodyError::InvalidActionShape(
                "action has no steps".to_string(),
            ));
        }
        if steps.len() > max_steps {
            return Err(CustodyError::InvalidActionShape(format!(
                "action has {} steps, limit is {}",
                steps.len(),
                max_steps
            )));
        }
        if descriptors.len() != steps.len() {
            return Err(CustodyError::InvalidActionShape(format!(
                "{} steps but {} descriptors",
                steps.len(),
                descriptors.len()
            )));
        }
        for step in &steps {
            step.validate()?;
        }

        let id = self.next_id();
        self.actions.push(Action::new(id, steps, descriptors, proposer));
        debug!(action_id = %id, "Action stored");
        Ok(id)
    }

    /// Record (or overwrite) a vote on a not-yet-executed action
    pub fn record_approval(
        &mut self,
        id: ActionId,
        approver: MemberId,
        vote: bool,
    ) -> CustodyResult<()> {
        let action = self
            .get_mut(id)
            .ok_or(CustodyError::UnknownAction(id))?;
        if action.is_executed() {
            return Err(CustodyError::AlreadyExecuted(id));
        }
        action.record_vote(approver, vote);
        Ok(())
    }

    /// Unanimity of the current membership; `false` for unknown ids
    pub fn is_approved(&self, id: ActionId, members: &MembershipSet) -> bool {
        self.get(id)
            .map(|a| a.is_approved_by_all(members.iter()))
            .unwrap_or(false)
    }

    /// A member's recorded stance; `false` if absent or unknown action
    pub fn is_approved_by(&self, id: ActionId, member: &MemberId) -> bool {
        self.get(id)
            .map(|a| a.is_approved_by(member))
            .unwrap_or(false)
    }

    /// Yes-votes among the current membership
    pub fn approval_count(&self, id: ActionId, members: &MembershipSet) -> usize {
        self.get(id)
            .map(|a| a.yes_votes_among(members.iter()))
            .unwrap_or(0)
    }

    pub(crate) fn mark_executed(&mut self, id: ActionId, by: MemberId) -> CustodyResult<()> {
        let action = self
            .get_mut(id)
            .ok_or(CustodyError::UnknownAction(id))?;
        if action.is_executed() {
            return Err(CustodyError::AlreadyExecuted(id));
        }
        action.mark_executed(by);
        Ok(())
    }

    pub fn get(&self, id: ActionId) -> Option<&Action> {
        let index = usize::try_from(id.0).ok()?.checked_sub(1)?;
        self.actions.get(index)
    }

    fn get_mut(&mut self, id: ActionId) -> Option<&mut Action> {
        let index = usize::try_from(id.0).ok()?.checked_sub(1)?;
        self.actions.get_mut(index)
    }

    /// Ids of actions still collecting votes, oldest first
    pub fn pending(&self) -> Vec<ActionId> {
        self.actions
            .iter()
            .filter(|a| !a.is_executed())
            .map(|a| a.id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custody_types::{codec, ActionState, Amount};

    fn id(s: &str) -> MemberId {
        MemberId::new(s)
    }

    fn add(s: &str) -> Vec<ActionStep> {
        vec![ActionStep::add_member(id(s))]
    }

    fn propose(
        registry: &mut ActionRegistry,
        steps: Vec<ActionStep>,
        max_steps: usize,
    ) -> CustodyResult<ActionId> {
        let descriptors = codec::encode_batch(&steps)?;
        registry.create(steps, descriptors, id("founder"), max_steps)
    }

    #[test]
    fn test_ids_are_sequential_from_one() {
        let mut registry = ActionRegistry::new();
        assert_eq!(propose(&mut registry, add("a"), 8).unwrap(), ActionId::new(1));
        assert_eq!(propose(&mut registry, add("b"), 8).unwrap(), ActionId::new(2));
        assert_eq!(registry.len(), 2);
        assert!(registry.get(ActionId::new(0)).is_none());
        assert!(registry.get(ActionId::new(3)).is_none());
    }

    #[test]
    fn test_shape_rules() {
        let mut registry = ActionRegistry::new();
        assert!(matches!(
            propose(&mut registry, vec![], 8),
            Err(CustodyError::InvalidActionShape(_))
        ));

        let many = (0..3).map(|i| ActionStep::add_member(id(&format!("m{i}")))).collect();
        assert!(matches!(
            propose(&mut registry, many, 2),
            Err(CustodyError::InvalidActionShape(_))
        ));

        let zero = vec![ActionStep::transfer(id("a"), Amount::zero())];
        assert!(propose(&mut registry, zero, 8).is_err());
        let steps = add("a");
        assert!(matches!(
            registry.create(steps, vec![], id("founder"), 8),
            Err(CustodyError::InvalidActionShape(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_quorum_follows_live_membership() {
        let mut registry = ActionRegistry::new();
        let mut members = MembershipSet::genesis(id("founder"), vec![id("partner")]);
        let action = propose(&mut registry, add("late"), 8).unwrap();

        assert!(!registry.is_approved(action, &members));
        registry.record_approval(action, id("partner"), true).unwrap();
        assert!(registry.is_approved(action, &members));

        members.add(id("late"));
        assert!(!registry.is_approved(action, &members));
        assert_eq!(registry.approval_count(action, &members), 2);

        registry.record_approval(action, id("late"), true).unwrap();
        assert!(registry.is_approved(action, &members));
    }

    #[test]
    fn test_approving_executed_action_fails() {
        let mut registry = ActionRegistry::new();
        let action = propose(&mut registry, add("a"), 8).unwrap();
        registry.mark_executed(action, id("founder")).unwrap();

        assert_eq!(
            registry.record_approval(action, id("founder"), false),
            Err(CustodyError::AlreadyExecuted(action))
        );
        assert_eq!(
            registry.mark_executed(action, id("founder")),
            Err(CustodyError::AlreadyExecuted(action))
        );
        assert_eq!(registry.get(action).unwrap().state, ActionState::Executed);
        assert!(registry.pending().is_empty());
    }

    #[test]
    fn test_unknown_action() {
        let mut registry = ActionRegistry::new();
        assert_eq!(
            registry.record_approval(ActionId::new(9), id("founder"), true),
            Err(CustodyError::UnknownAction(ActionId::new(9)))
        );
        let members = MembershipSet::genesis(id("founder"), vec![]);
        assert!(!registry.is_approved(ActionId::new(9), &members));
        assert!(!registry.is_approved_by(ActionId::new(9), &id("founder")));
    }

    #[test]
    fn test_restore_from_log() {
        let mut registry = ActionRegistry::new();
        propose(&mut registry, add("a"), 8).unwrap();
        propose(&mut registry, add("b"), 8).unwrap();

        let restored = ActionRegistry::from_log(registry.actions().to_vec()).unwrap();
        assert_eq!(restored.next_id(), ActionId::new(3));

        let mut gapped = registry.actions().to_vec();
        gapped.remove(0);
        assert_eq!(ActionRegistry::from_log(gapped).unwrap_err(), ActionId::new(2));
    }
}
