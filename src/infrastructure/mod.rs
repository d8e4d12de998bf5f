//! Adapters implementing the domain ports.

pub mod flat_rate;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
