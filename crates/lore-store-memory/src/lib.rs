//! In-memory backend for the Lore knowledge console.
//!
//! State lives behind a single [`tokio::sync::RwLock`], so every mutation is
//! applied by one writer at a time and readers always see whole snapshots.

mod store;

pub mod error;
pub mod seed;

pub use error::{Error, Result};
pub use seed::Seed;
pub use store::{DEFAULT_AUDIT_CAPACITY, MemoryStore};

#[cfg(test)]
mod tests;
