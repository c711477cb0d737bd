//! Authorization Gate: the single membership policy point
//!
//! Every mutating governance entry point consults the gate before any
//! other check.

use custody_types::{CustodyError, CustodyResult, MemberId, MembershipSet};
use tracing::warn;

/// Governance operations that require membership
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GatedOperation {
    CreateAction,
    ApproveAction,
    ExecuteAction,
}

impl GatedOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateAction => "create action",
            Self::ApproveAction => "approve action",
            Self::ExecuteAction => "execute action",
        }
    }
}

/// Membership check against the live membership set
pub struct AuthorizationGate;

impl AuthorizationGate {
    /// Fails with `NotAMember` unless `caller` is currently a member
    pub fn require_member(
        members: &MembershipSet,
        caller: &MemberId,
        operation: GatedOperation,
    ) -> CustodyResult<()> {
        if members.contains(caller) {
            return Ok(());
        }
        warn!(
            caller = %caller,
            operation = operation.as_str(),
            "Only members can {}",
            operation.as_str()
        );
        Err(CustodyError::NotAMember(caller.clone()))
    }
}
