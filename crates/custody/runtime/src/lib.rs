//! Pooled Custody Runtime
//!
//! This crate coordinates a member-governed pool: who may act, when an
//! action has reached unanimity, and how an approved batch is applied.
//!
//! # Architecture
//!
//! The [`CustodyPool`] is the main entry point. It owns the pool state and
//! hands borrowed views of it to the specialized components:
//!
//! - [`AuthorizationGate`]: "is the caller a current member?"
//! - [`ActionRegistry`]: append-only action log and vote bookkeeping
//! - [`GovernanceEngine`]: create / approve / execute orchestration
//! - [`Transaction`]: staged change-set that commits or discards a batch
//! - [`EscrowStore`]: depositor balances, drained only by executed actions
//! - [`PoolService`]: serialized, persisted access for concurrent callers
//!
//! # Key Invariants
//!
//! 1. Quorum is recomputed from the live membership set on every check
//! 2. An action executes at most once
//! 3. A batch applies completely or not at all
//! 4. Every mutating entry point is gated on current membership
//!
//! # Example
//!
//! ```rust
//! use custody_runtime::CustodyPool;
//! use custody_types::{ActionStep, MemberId};
//!
//! let founder = MemberId::new("founder");
//! let partner = MemberId::new("partner");
//! let mut pool = CustodyPool::create(founder.clone(), vec![partner.clone()]);
//!
//! let id = pool
//!     .create_action(&founder, vec![ActionStep::add_member(MemberId::new("newcomer"))])
//!     .unwrap();
//! pool.approve_action(&partner, id, true).unwrap();
//! pool.execute_action(&partner, id).unwrap();
//!
//! assert_eq!(pool.total_members(), 3);
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod engine;
mod error;
pub mod escrow_store;
pub mod gate;
pub mod ledger;
pub mod pool;
pub mod registry;
pub mod service;
pub mod telemetry;
pub mod transaction;

pub use config::{CustodyConfig, LoggingConfig, PoolSettings, StorageConfig};
pub use engine::GovernanceEngine;
pub use error::{ServiceError, ServiceResult};
pub use escrow_store::EscrowStore;
pub use gate::{AuthorizationGate, GatedOperation};
pub use ledger::PoolLedger;
pub use pool::CustodyPool;
pub use registry::ActionRegistry;
pub use service::PoolService;
pub use telemetry::init_tracing;
pub use transaction::Transaction;
