use crate::snapshot::{CollectionSnapshotData, SnapshotDescription, SnapshotStore};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use wayfarer_core::{Collection, CollectionConfig, Error, Result};

/// Manages collections and their on-disk directories
pub struct StorageManager {
    collections: RwLock<HashMap<String, Arc<Collection>>>,
    data_dir: PathBuf,
    snapshots: SnapshotStore,
}

impl StorageManager {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;

        Ok(Self {
            collections: RwLock::new(HashMap::new()),
            data_dir,
            snapshots: SnapshotStore,
        })
    }

    fn collection_dir(&self, config: &CollectionConfig) -> PathBuf {
        self.data_dir.join(config.directory())
    }

    /// Open a collection, restoring it from its directory when a snapshot exists.
    ///
    /// Returns the already-open handle on repeated calls.
    pub fn open_collection(&self, config: CollectionConfig) -> Result<Arc<Collection>> {
        if let Some(existing) = self.get_collection(&config.name) {
            Self::check_compatible(&existing, &config)?;
            return Ok(existing);
        }

        let dir = self.collection_dir(&config);
        let collection = match self
            .snapshots
            .load(&dir)
            .map_err(|e| Error::Storage(e.to_string()))?
        {
            Some(data) => {
                let restored = data
                    .into_collection()
                    .map_err(|e| Error::Storage(e.to_string()))?;
                Self::check_compatible(&restored, &config)?;
                info!(collection = %config.name, points = restored.count(), "restored collection from disk");
                Arc::new(restored)
            }
            None => Arc::new(Collection::new(config.clone())),
        };

        // A concurrent opener may have won; keep whichever landed first
        let mut collections = self.collections.write();
        Ok(collections
            .entry(config.name.clone())
            .or_insert(collection)
            .clone())
    }

    fn check_compatible(collection: &Collection, config: &CollectionConfig) -> Result<()> {
        if collection.vector_dim() != config.vector_dim {
            return Err(Error::InvalidConfig(format!(
                "collection {} stores {}-dimensional vectors, embedder produces {}",
                config.name,
                collection.vector_dim(),
                config.vector_dim
            )));
        }
        Ok(())
    }

    pub fn create_collection(&self, config: CollectionConfig) -> Result<Arc<Collection>> {
        let name = config.name.clone();
        let mut collections = self.collections.write();

        if collections.contains_key(&name) {
            return Err(Error::CollectionExists(name));
        }

        let collection = Arc::new(Collection::new(config));
        collections.insert(name, collection.clone());
        Ok(collection)
    }

    #[inline]
    pub fn get_collection(&self, name: &str) -> Option<Arc<Collection>> {
        self.collections.read().get(name).cloned()
    }

    /// Drop a collection and its directory. Returns whether anything existed.
    pub fn delete_collection(&self, name: &str) -> Result<bool> {
        let removed = self.collections.write().remove(name);
        let dir = match &removed {
            Some(collection) => self.data_dir.join(collection.config().directory()),
            None => self.data_dir.join(name),
        };

        let on_disk = dir.exists();
        if on_disk {
            std::fs::remove_dir_all(&dir)?;
        }
        if removed.is_some() || on_disk {
            info!(collection = %name, "deleted collection");
        }
        Ok(removed.is_some() || on_disk)
    }

    #[inline]
    #[must_use]
    pub fn list_collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }

    #[inline]
    #[must_use]
    pub fn collection_exists(&self, name: &str) -> bool {
        self.collections.read().contains_key(name)
    }

    #[inline]
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Write one collection to its directory
    pub fn save_collection(&self, name: &str) -> Result<SnapshotDescription> {
        let collection = self
            .get_collection(name)
            .ok_or_else(|| Error::CollectionNotFound(name.to_string()))?;

        let data = CollectionSnapshotData::from_collection(&collection)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        let dir = self.collection_dir(collection.config());
        self.snapshots
            .save(&dir, &data)
            .map_err(|e| Error::Storage(e.to_string()))
    }

    /// Save every open collection; stops at the first failure
    pub fn save(&self) -> Result<Vec<SnapshotDescription>> {
        let names = self.list_collections();
        let mut saved = Vec::with_capacity(names.len());
        for name in names {
            match self.save_collection(&name) {
                Ok(description) => saved.push(description),
                Err(e) => {
                    warn!(collection = %name, error = %e, "failed to save collection");
                    return Err(e);
                }
            }
        }
        Ok(saved)
    }
}
