// Cache module for the repository snapshot.
// One JSON file holding the last good repository list and its capture time.

pub mod paths;
pub mod store;

pub use paths::{SNAPSHOT_FILE, cache_dir, log_dir, snapshot_path};
pub use store::{CacheSnapshot, SnapshotStore};
