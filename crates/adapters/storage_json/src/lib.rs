//! # lampctl-adapter-storage-json
//!
//! JSON-file persistence adapter.
//!
//! ## Responsibilities
//! - Implement the [`SnapshotStore`](lampctl_app::ports::SnapshotStore) port
//!   from `lampctl-app`
//! - Keep the whole snapshot document in one pretty-printed JSON file
//! - Replace the file atomically on save (temp file + rename)
//!
//! ## Dependency rule
//! Depends on `lampctl-app` (for port traits) and `lampctl-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod error;
mod snapshot_store;

pub use error::StorageError;
pub use snapshot_store::JsonSnapshotStore;
