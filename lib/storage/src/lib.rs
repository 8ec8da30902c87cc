//! # Wayfarer Storage
//!
//! Named collections backed by one on-disk directory each. A collection
//! directory holds a gzip-compressed snapshot of its points and a sha256
//! checksum of that file; both are replaced atomically on save.

pub mod manager;
pub mod snapshot;

pub use manager::StorageManager;
pub use snapshot::{CollectionSnapshotData, SnapshotDescription, SnapshotStore};
