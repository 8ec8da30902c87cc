// Per-collection snapshot files
use anyhow::{anyhow, Context, Result};
use atomicwrites::{AllowOverwrite, AtomicFile};
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use wayfarer_core::{Collection, CollectionConfig, Distance, Payload, Point, PointId, Vector};

const SNAPSHOT_FILE: &str = "collection.snapshot";
const CHECKSUM_FILE: &str = "collection.snapshot.sha256";

/// Snapshot description returned after a save
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDescription {
    pub collection: String,
    pub path: PathBuf,
    pub points: usize,
    pub size: u64,
    pub checksum: String,
    pub created_at: DateTime<Utc>,
}

/// Collection snapshot data - config plus every point in insertion order
#[derive(Debug, Serialize, Deserialize)]
pub struct CollectionSnapshotData {
    pub name: String,
    pub config: CollectionConfigData,
    pub points: Vec<PointData>,
    pub created_at: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CollectionConfigData {
    pub vector_dim: usize,
    pub distance: String,
}

// Payload is kept as JSON text: bincode cannot decode self-describing values
#[derive(Debug, Serialize, Deserialize)]
pub struct PointData {
    pub id: String,
    pub vector: Vec<f32>,
    pub document: String,
    pub payload: String,
}

impl CollectionSnapshotData {
    pub fn from_collection(collection: &Collection) -> Result<Self> {
        let points = collection
            .iter()
            .into_iter()
            .map(|p| {
                Ok(PointData {
                    id: p.id.to_string(),
                    vector: p.vector.into_inner(),
                    document: p.document,
                    payload: serde_json::to_string(&p.payload)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: collection.name().to_string(),
            config: CollectionConfigData {
                vector_dim: collection.vector_dim(),
                distance: collection.distance().as_str().to_string(),
            },
            points,
            created_at: Utc::now().timestamp(),
        })
    }

    /// Rebuild the collection. Restored ids and insertion order are preserved.
    pub fn into_collection(self) -> Result<Collection> {
        let distance: Distance = self.config.distance.parse()?;
        let collection = Collection::new(CollectionConfig {
            name: self.name,
            vector_dim: self.config.vector_dim,
            distance,
        });

        let points = self
            .points
            .into_iter()
            .map(|p| {
                let payload: Payload = serde_json::from_str(&p.payload)
                    .with_context(|| format!("payload of point {}", p.id))?;
                Ok(Point::new(
                    PointId::parse(&p.id),
                    Vector::new(p.vector),
                    p.document,
                    payload,
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        collection.insert_batch(points)?;
        Ok(collection)
    }
}

/// Reads and writes snapshot files under a collection directory
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore;

impl SnapshotStore {
    pub fn snapshot_path(dir: &Path) -> PathBuf {
        dir.join(SNAPSHOT_FILE)
    }

    pub fn exists(dir: &Path) -> bool {
        Self::snapshot_path(dir).exists()
    }

    /// Write a snapshot into `dir`, replacing any previous one
    pub fn save(&self, dir: &Path, data: &CollectionSnapshotData) -> Result<SnapshotDescription> {
        fs::create_dir_all(dir)?;

        let encoded = bincode::serialize(data)
            .map_err(|e| anyhow!("Serialization error: {}", e))?;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&encoded)?;
        let compressed = encoder.finish()?;
        let checksum = format!("{:x}", Sha256::digest(&compressed));

        let snapshot_path = Self::snapshot_path(dir);
        AtomicFile::new(&snapshot_path, AllowOverwrite)
            .write(|f| f.write_all(&compressed))
            .map_err(|e| anyhow!("Failed to write {:?}: {}", snapshot_path, e))?;
        AtomicFile::new(dir.join(CHECKSUM_FILE), AllowOverwrite)
            .write(|f| f.write_all(checksum.as_bytes()))
            .map_err(|e| anyhow!("Failed to write checksum: {}", e))?;

        Ok(SnapshotDescription {
            collection: data.name.clone(),
            path: snapshot_path,
            points: data.points.len(),
            size: compressed.len() as u64,
            checksum,
            created_at: DateTime::from_timestamp(data.created_at, 0).unwrap_or_else(Utc::now),
        })
    }

    /// Load the snapshot in `dir`, verifying its checksum when one is present
    pub fn load(&self, dir: &Path) -> Result<Option<CollectionSnapshotData>> {
        let snapshot_path = Self::snapshot_path(dir);
        if !snapshot_path.exists() {
            return Ok(None);
        }

        let compressed = fs::read(&snapshot_path)?;
        let checksum_path = dir.join(CHECKSUM_FILE);
        if checksum_path.exists() {
            let expected = fs::read_to_string(&checksum_path)?;
            let actual = format!("{:x}", Sha256::digest(&compressed));
            if expected.trim() != actual {
                return Err(anyhow!(
                    "Checksum mismatch for {:?}: expected {}, got {}",
                    snapshot_path,
                    expected.trim(),
                    actual
                ));
            }
        }

        let mut decoder = GzDecoder::new(compressed.as_slice());
        let mut encoded = Vec::new();
        decoder.read_to_end(&mut encoded)?;
        let data: CollectionSnapshotData = bincode::deserialize(&encoded)
            .map_err(|e| anyhow!("Deserialization error: {}", e))?;
        Ok(Some(data))
    }
}
