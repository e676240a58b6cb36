//! Storage abstractions for the service layer
//!
//! Everything lives in memory behind one lock; a JSON snapshot on disk is
//! optional and only ever written after a successful mutation.

pub mod snapshot_store;
pub mod table;

pub use snapshot_store::SnapshotStore;
pub use table::Table;
