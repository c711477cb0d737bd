//! Step codec: `(selector, payload)` descriptors <-> typed steps
//!
//! Callers that compose actions outside this crate submit each step as an
//! opaque selector string plus an encoded payload. The codec is the only
//! place those descriptors are interpreted; everything past it works with
//! [`ActionStep`].

use crate::{ActionStep, Amount, CustodyError, CustodyResult, MemberId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const ADD_MEMBER: &str = "addMember(address)";
pub const REMOVE_MEMBER: &str = "removeMember(address)";
pub const TRANSFER: &str = "transfer(address,uint256)";
pub const WITHDRAW: &str = "withdraw(address,uint256)";

/// An encoded step as submitted by a caller
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDescriptor {
    pub selector: String,
    pub payload: Vec<u8>,
}

impl StepDescriptor {
    pub fn new(selector: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            selector: selector.into(),
            payload: payload.into(),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct MemberPayload {
    member: MemberId,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct TransferPayload {
    to: MemberId,
    amount: Amount,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct WithdrawPayload {
    depositor: MemberId,
    amount: Amount,
}

pub(crate) fn selector_for(step: &ActionStep) -> &'static str {
    match step {
        ActionStep::AddMember { .. } => ADD_MEMBER,
        ActionStep::RemoveMember { .. } => REMOVE_MEMBER,
        ActionStep::Transfer { .. } => TRANSFER,
        ActionStep::EscrowWithdraw { .. } => WITHDRAW,
    }
}

/// Encode a typed step into its canonical descriptor
pub fn encode(step: &ActionStep) -> CustodyResult<StepDescriptor> {
    let payload = match step {
        ActionStep::AddMember { member } | ActionStep::RemoveMember { member } => {
            serde_json::to_vec(&MemberPayload {
                member: member.clone(),
            })
        }
        ActionStep::Transfer { to, amount } => serde_json::to_vec(&TransferPayload {
            to: to.clone(),
            amount: *amount,
        }),
        ActionStep::EscrowWithdraw { depositor, amount } => {
            serde_json::to_vec(&WithdrawPayload {
                depositor: depositor.clone(),
                amount: *amount,
            })
        }
    }
    .map_err(|err| {
        CustodyError::InvalidActionShape(format!(
            "cannot encode {}: {}",
            selector_for(step),
            err
        ))
    })?;

    Ok(StepDescriptor {
        selector: selector_for(step).to_string(),
        payload,
    })
}

/// Canonical descriptors for a batch of typed steps
pub fn encode_batch(steps: &[ActionStep]) -> CustodyResult<Vec<StepDescriptor>> {
    steps.iter().map(encode).collect()
}

/// Decode one descriptor into a validated step
pub fn decode(descriptor: &StepDescriptor) -> CustodyResult<ActionStep> {
    let step = match descriptor.selector.as_str() {
        ADD_MEMBER => ActionStep::AddMember {
            member: parse::<MemberPayload>(descriptor)?.member,
        },
        REMOVE_MEMBER => ActionStep::RemoveMember {
            member: parse::<MemberPayload>(descriptor)?.member,
        },
        TRANSFER => {
            let p = parse::<TransferPayload>(descriptor)?;
            ActionStep::Transfer {
                to: p.to,
                amount: p.amount,
            }
        }
        WITHDRAW => {
            let p = parse::<WithdrawPayload>(descriptor)?;
            ActionStep::EscrowWithdraw {
                depositor: p.depositor,
                amount: p.amount,
            }
        }
        other => {
            return Err(CustodyError::InvalidActionShape(format!(
                "unknown selector: {other}"
            )))
        }
    };
    step.validate()?;
    Ok(step)
}

/// Decode parallel selector/payload arrays into a batch
///
/// The arrays must be non-empty and of equal length.
pub fn decode_batch<S, P>(selectors: &[S], payloads: &[P]) -> CustodyResult<Vec<ActionStep>>
where
    S: AsRef<str>,
    P: AsRef<[u8]>,
{
    if selectors.is_empty() {
        return Err(CustodyError::InvalidActionShape(
            "action has no steps".to_string(),
        ));
    }
    if selectors.len() != payloads.len() {
        return Err(CustodyError::InvalidActionShape(format!(
            "{} selectors but {} payloads",
            selectors.len(),
            payloads.len()
        )));
    }
    selectors
        .iter()
        .zip(payloads)
        .map(|(s, p)| decode(&StepDescriptor::new(s.as_ref(), p.as_ref())))
        .collect()
}

fn parse<T: DeserializeOwned>(descriptor: &StepDescriptor) -> CustodyResult<T> {
    serde_json::from_slice(&descriptor.payload).map_err(|err| {
        CustodyError::InvalidActionShape(format!(
            "malformed payload for {}: {}",
            descriptor.selector, err
        ))
    })
}
