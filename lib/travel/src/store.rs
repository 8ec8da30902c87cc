//! The record store: three domain collections behind one embedder.

use crate::document::TravelDocument;
use crate::domain::Domain;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use wayfarer_core::{
    Collection, CollectionConfig, Distance, Filter, Payload, PayloadFilter, Point, PointId,
};
use wayfarer_embedding::Embedder;
use wayfarer_storage::{SnapshotDescription, StorageManager};

pub const DEFAULT_K: usize = 5;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A document as read back from a collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredDocument {
    pub id: String,
    pub content: String,
    pub metadata: Payload,
}

impl From<Point> for StoredDocument {
    fn from(point: Point) -> Self {
        Self {
            id: point.id.to_string(),
            content: point.document,
            metadata: point.payload,
        }
    }
}

/// A search hit and its relevance, higher is better
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub document: StoredDocument,
    pub score: f32,
}

impl Candidate {
    pub fn metadata(&self) -> &Payload {
        &self.document.metadata
    }

    pub fn metadata_f64(&self, key: &str) -> Option<f64> {
        self.document.metadata.get(key).and_then(|v| v.as_f64())
    }
}

/// Similarity search over the domain collections.
///
/// An empty collection or a filter that matches nothing yields an empty
/// list, never an error.
#[async_trait]
pub trait DocumentIndex: Send + Sync {
    async fn search_with_score(
        &self,
        domain: Domain,
        query: &str,
        k: usize,
        filter: Option<&PayloadFilter>,
    ) -> Result<Vec<Candidate>>;

    async fn search(
        &self,
        domain: Domain,
        query: &str,
        k: usize,
        filter: Option<&PayloadFilter>,
    ) -> Result<Vec<StoredDocument>> {
        Ok(self
            .search_with_score(domain, query, k, filter)
            .await?
            .into_iter()
            .map(|c| c.document)
            .collect())
    }
}

pub struct RecordStore {
    storage: Arc<StorageManager>,
    embedder: Arc<dyn Embedder>,
    distance: Distance,
    timeout: Duration,
}

impl RecordStore {
    /// Open the three domain collections, restoring any persisted ones
    pub fn open(storage: Arc<StorageManager>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let store = Self {
            storage,
            embedder,
            distance: Distance::Cosine,
            timeout: DEFAULT_TIMEOUT,
        };
        for domain in Domain::ALL {
            let collection = store.collection(domain)?;
            info!(
                collection = %collection.name(),
                documents = collection.count(),
                "opened collection"
            );
        }
        Ok(store)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    fn config(&self, domain: Domain) -> CollectionConfig {
        CollectionConfig {
            name: domain.collection_name().to_string(),
            vector_dim: self.embedder.dim(),
            distance: self.distance,
        }
    }

    /// The live collection for a domain; recreated empty after a delete
    pub fn collection(&self, domain: Domain) -> Result<Arc<Collection>> {
        Ok(self.storage.open_collection(self.config(domain))?)
    }

    pub fn count(&self, domain: Domain) -> Result<usize> {
        Ok(self.collection(domain)?.count())
    }

    pub fn is_empty(&self, domain: Domain) -> Result<bool> {
        Ok(self.collection(domain)?.is_empty())
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<wayfarer_core::Vector>> {
        match tokio::time::timeout(self.timeout, self.embedder.embed_batch(texts)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(Error::Timeout("embedding request".to_string())),
        }
    }

    /// Embed and insert one batch; the batch lands whole or not at all
    pub async fn add_documents(
        &self,
        domain: Domain,
        documents: Vec<TravelDocument>,
        ids: Vec<PointId>,
    ) -> Result<usize> {
        if documents.len() != ids.len() {
            return Err(Error::InvalidConfig(format!(
                "{} documents but {} ids",
                documents.len(),
                ids.len()
            )));
        }
        if documents.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
        let vectors = self.embed_batch(&texts).await?;
        if vectors.len() != documents.len() {
            return Err(Error::StoreUnavailable(format!(
                "embedder returned {} vectors for {} documents",
                vectors.len(),
                documents.len()
            )));
        }

        let points: Vec<Point> = documents
            .into_iter()
            .zip(ids)
            .zip(vectors)
            .map(|((doc, id), vector)| Point::new(id, vector, doc.content, doc.metadata))
            .collect();
        let inserted = points.len();

        self.collection(domain)?.insert_batch(points)?;
        debug!(domain = %domain, inserted, "inserted batch");
        Ok(inserted)
    }

    /// Query every collection at once, `k` hits each
    pub async fn search_all(
        &self,
        query: &str,
        k: usize,
    ) -> Result<HashMap<Domain, Vec<StoredDocument>>> {
        let (hotels, experiences, flights) = tokio::try_join!(
            self.search(Domain::Hotel, query, k, None),
            self.search(Domain::Experience, query, k, None),
            self.search(Domain::Flight, query, k, None),
        )?;

        Ok(HashMap::from([
            (Domain::Hotel, hotels),
            (Domain::Experience, experiences),
            (Domain::Flight, flights),
        ]))
    }

    pub fn persist(&self, domain: Domain) -> Result<SnapshotDescription> {
        Ok(self.storage.save_collection(domain.collection_name())?)
    }

    /// Drop a collection and its directory
    pub fn delete_collection(&self, domain: Domain) -> Result<bool> {
        Ok(self.storage.delete_collection(domain.collection_name())?)
    }

    pub fn delete_all(&self) -> Result<()> {
        for domain in Domain::ALL {
            self.delete_collection(domain)?;
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentIndex for RecordStore {
    async fn search_with_score(
        &self,
        domain: Domain,
        query: &str,
        k: usize,
        filter: Option<&PayloadFilter>,
    ) -> Result<Vec<Candidate>> {
        let collection = self.collection(domain)?;
        if k == 0 || collection.is_empty() {
            return Ok(Vec::new());
        }

        let vector = match tokio::time::timeout(self.timeout, self.embedder.embed(query)).await {
            Ok(result) => result?,
            Err(_) => return Err(Error::Timeout("query embedding".to_string())),
        };

        let hits = collection.search(&vector, k, filter.map(|f| f as &dyn Filter));
        Ok(hits
            .into_iter()
            .map(|(point, score)| Candidate {
                document: point.into(),
                score,
            })
            .collect())
    }
}
