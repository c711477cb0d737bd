//! Pooled Custody Domain Types
//!
//! This crate defines the domain types for a member-governed pooled custody
//! account: a fixed set of members jointly controls a shared balance and a
//! self-amending membership list. Every state change is proposed as a
//! batched action and runs only after every current member has approved it.
//!
//! # Key Concepts
//!
//! - **Membership Set**: ordered, duplicate-free list of member identities.
//!   It is the only input to quorum evaluation.
//! - **Action**: a batch of typed steps (`AddMember`, `RemoveMember`,
//!   `Transfer`, `EscrowWithdraw`) plus the per-member votes recorded on it.
//! - **Escrow Ledger**: per-depositor balances held in trust for the pool,
//!   drainable only through executed actions.
//! - **Audit Journal**: receipts for every committed state change.
//!
//! # Architecture
//!
//! This is a pure types crate. Coordination (authorization, quorum,
//! transactional execution) lives in `custody-runtime`. All types implement
//! `Clone`, `Debug`, `Serialize` and `Deserialize`.

#![deny(unsafe_code)]

mod action;
mod audit;
pub mod codec;
mod errors;
mod escrow;
mod ids;
mod membership;
mod snapshot;

pub use action::*;
pub use audit::*;
pub use codec::StepDescriptor;
pub use errors::*;
pub use escrow::*;
pub use ids::*;
pub use membership::*;
pub use snapshot::*;
