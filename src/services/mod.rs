// Service exports
pub mod backend;
pub mod cache;
pub mod snapshot;

pub use backend::{BackendClient, BackendError, BackendTables};
pub use cache::{CacheError, CacheManager, CacheStats, Snapshot};
pub use snapshot::SnapshotStore;
