//! Pooled custody storage.
//!
//! Defines the durable store contract for pool state and two backends:
//! - [`InMemoryPoolStore`]: deterministic and test-friendly
//! - [`FilePoolStore`]: one JSON document per pool, digest-checked on load
//!
//! A store persists whole [`PoolSnapshot`]s. Each save must advance the
//! snapshot sequence, so a stale writer can never overwrite newer state.
//!
//! [`PoolSnapshot`]: custody_types::PoolSnapshot

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod error;
pub mod file;
pub mod memory;
mod traits;

pub use error::{StorageError, StorageResult};
pub use file::FilePoolStore;
pub use memory::InMemoryPoolStore;
pub use traits::PoolStore;
