//! Error types for pooled custody operations

use crate::{ActionId, Amount, MemberId};

/// Errors that can occur in pooled custody operations
///
/// Every variant is a synchronous failure with no partial effect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustodyError {
    #[error("Not a member: {0}")]
    NotAMember(MemberId),

    #[error("Unknown action: {0}")]
    UnknownAction(ActionId),

    #[error("Action already executed: {0}")]
    AlreadyExecuted(ActionId),

    #[error("Action not approved by all members: {0}")]
    NotApproved(ActionId),

    #[error("Insufficient pool balance: required {required}, available {available}")]
    InsufficientPoolBalance { required: Amount, available: Amount },

    #[error(
        "Insufficient escrow balance for {depositor}: required {required}, available {available}"
    )]
    InsufficientEscrowBalance {
        depositor: MemberId,
        required: Amount,
        available: Amount,
    },

    #[error("Invalid action shape: {0}")]
    InvalidActionShape(String),

    #[error("Cannot remove the last member: {0}")]
    LastMemberRemoval(MemberId),

    #[error("Amount must be greater than zero")]
    ZeroAmount,

    #[error("Amount overflow")]
    AmountOverflow,
}

/// Result type alias for custody operations
pub type CustodyResult<T> = Result<T, CustodyError>;
