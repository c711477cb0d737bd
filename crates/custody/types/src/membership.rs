//! Membership set: who governs a pool
//!
//! The membership set is the source of truth for "who's in". Quorum is
//! always evaluated against it as it stands at decision time. It does NOT
//! make decisions; it stores membership state.

use crate::{CustodyError, CustodyResult, MemberId};
use serde::{Deserialize, Serialize};

/// Ordered, duplicate-free set of member identities
///
/// Members keep their insertion order (genesis members first).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipSet {
    members: Vec<MemberId>,
}

impl MembershipSet {
    /// Genesis membership: the creator followed by its co-members
    ///
    /// Duplicates among the co-members (or the creator listed again) are
    /// collapsed.
    pub fn genesis(creator: MemberId, co_members: impl IntoIterator<Item = MemberId>) -> Self {
        let mut set = Self {
            members: vec![creator],
        };
        for member in co_members {
            set.add(member);
        }
        set
    }

    /// Insert a member. Returns `false` (and changes nothing) if already present.
    pub fn add(&mut self, member: MemberId) -> bool {
        if self.contains(&member) {
            return false;
        }
        self.members.push(member);
        true
    }

    /// Remove a member
    ///
    /// Fails with `NotAMember` if absent and `LastMemberRemoval` if the
    /// removal would leave the pool without members.
    pub fn remove(&mut self, member: &MemberId) -> CustodyResult<()> {
        let position = self
            .members
            .iter()
            .position(|m| m == member)
            .ok_or_else(|| CustodyError::NotAMember(member.clone()))?;
        if self.members.len() == 1 {
            return Err(CustodyError::LastMemberRemoval(member.clone()));
        }
        self.members.remove(position);
        Ok(())
    }

    pub fn contains(&self, member: &MemberId) -> bool {
        self.members.contains(member)
    }

    pub fn count(&self) -> usize {
        self.members.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MemberId> {
        self.members.iter()
    }

    pub fn as_slice(&self) -> &[MemberId] {
        &self.members
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> MemberId {
        MemberId::new(s)
    }

    #[test]
    fn test_genesis_includes_creator_and_co_members() {
        let set = MembershipSet::genesis(id("founder"), vec![id("co-1"), id("co-2")]);
        assert_eq!(set.count(), 3);
        assert!(set.contains(&id("founder")));
        assert!(set.contains(&id("co-2")));
        assert_eq!(set.as_slice()[0], id("founder"));
    }

    #[test]
    fn test_genesis_collapses_duplicates() {
        let set =
            MembershipSet::genesis(id("founder"), vec![id("co-1"), id("co-1"), id("founder")]);
        assert_eq!(set.count(), 2);
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut set = MembershipSet::genesis(id("founder"), vec![]);
        assert!(set.add(id("res-1")));
        assert!(!set.add(id("res-1")));
        assert_eq!(set.count(), 2);
    }

    #[test]
    fn test_remove_member() {
        let mut set = MembershipSet::genesis(id("founder"), vec![id("res-1")]);
        set.remove(&id("res-1")).unwrap();
        assert!(!set.contains(&id("res-1")));
        assert_eq!(set.count(), 1);
    }

    #[test]
    fn test_remove_absent_member_fails() {
        let mut set = MembershipSet::genesis(id("founder"), vec![id("res-1")]);
        let err = set.remove(&id("stranger")).unwrap_err();
        assert_eq!(err, CustodyError::NotAMember(id("stranger")));
        assert_eq!(set.count(), 2);
    }

    #[test]
    fn test_last_member_cannot_be_removed() {
        let mut set = MembershipSet::genesis(id("founder"), vec![]);
        let err = set.remove(&id("founder")).unwrap_err();
        assert_eq!(err, CustodyError::LastMemberRemoval(id("founder")));
        assert_eq!(set.count(), 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum MembershipOp {
            Add(u8),
            Remove(u8),
        }

        fn op_strategy() -> impl Strategy<Value = Vec<MembershipOp>> {
            proptest::collection::vec(
                prop_oneof![
                    (0u8..6).prop_map(MembershipOp::Add),
                    (0u8..6).prop_map(MembershipOp::Remove),
                ],
                0..40,
            )
        }

        proptest! {
            #[test]
            fn property_set_never_empties_or_duplicates(ops in op_strategy()) {
                let mut set = MembershipSet::genesis(MemberId::new("m0"), vec![]);
                for op in ops {
                    match op {
                        MembershipOp::Add(n) => {
                            set.add(MemberId::new(format!("m{n}")));
                        }
                        MembershipOp::Remove(n) => {
                            let _ = set.remove(&MemberId::new(format!("m{n}")));
                        }
                    }
                    prop_assert!(set.count() >= 1);
                    let mut seen = std::collections::BTreeSet::new();
                    prop_assert!(set.iter().all(|m| seen.insert(m.clone())));
                }
            }
        }
    }
}
