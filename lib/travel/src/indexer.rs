//! One-time population of the domain collections from seed records.

use crate::document::{DocumentBuilder, TravelDocument};
use crate::domain::Domain;
use crate::records::{describe_id, SeedData};
use crate::store::RecordStore;
use crate::Result;
use std::sync::Arc;
use tracing::{info, warn};
use wayfarer_core::PointId;

pub const BATCH_SIZE: usize = 100;

/// A record that could not be turned into a document
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFailure {
    pub index: usize,
    pub record_id: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PopulateOutcome {
    /// The collection already held documents; nothing was written
    Skipped { existing: usize },
    Populated { inserted: usize, batches: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopulateReport {
    pub domain: Domain,
    pub outcome: PopulateOutcome,
    pub failures: Vec<RecordFailure>,
}

impl PopulateReport {
    pub fn inserted(&self) -> usize {
        match self.outcome {
            PopulateOutcome::Populated { inserted, .. } => inserted,
            PopulateOutcome::Skipped { .. } => 0,
        }
    }

    pub fn skipped(&self) -> bool {
        matches!(self.outcome, PopulateOutcome::Skipped { .. })
    }
}

pub struct Indexer {
    store: Arc<RecordStore>,
    builder: DocumentBuilder,
    batch_size: usize,
}

impl Indexer {
    pub fn new(store: Arc<RecordStore>, builder: DocumentBuilder) -> Self {
        Self {
            store,
            builder,
            batch_size: BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Populate all three collections, hotels then experiences then flights
    pub async fn populate_all(&self, seed: &SeedData) -> Result<Vec<PopulateReport>> {
        let hotels = self
            .populate(Domain::Hotel, seed.hotels.len(), |i| {
                let record = &seed.hotels[i];
                (describe_id(record.hotel_id.as_ref()), self.builder.hotel(record))
            })
            .await?;
        let experiences = self
            .populate(Domain::Experience, seed.experiences.len(), |i| {
                let record = &seed.experiences[i];
                (
                    describe_id(record.experience_id.as_ref()),
                    self.builder.experience(record),
                )
            })
            .await?;
        let flights = self
            .populate(Domain::Flight, seed.flights.len(), |i| {
                let record = &seed.flights[i];
                (describe_id(record.flight_id.as_ref()), self.builder.flight(record))
            })
            .await?;

        Ok(vec![hotels, experiences, flights])
    }

    /// Populate one collection from `total` records built by `build`.
    ///
    /// A non-empty collection is left untouched. Batches already written
    /// stay written if a later batch fails.
    pub async fn populate<F>(&self, domain: Domain, total: usize, build: F) -> Result<PopulateReport>
    where
        F: Fn(usize) -> (Option<String>, Result<TravelDocument>),
    {
        let existing = self.store.count(domain)?;
        if existing > 0 {
            info!(domain = %domain, existing, "collection already populated, skipping");
            if existing != total {
                warn!(
                    domain = %domain,
                    existing,
                    seed_records = total,
                    "seed record count differs from stored documents; collection is stale"
                );
            }
            return Ok(PopulateReport {
                domain,
                outcome: PopulateOutcome::Skipped { existing },
                failures: Vec::new(),
            });
        }

        let mut documents = Vec::with_capacity(total);
        let mut failures = Vec::new();
        for index in 0..total {
            match build(index) {
                (_, Ok(doc)) => documents.push(doc),
                (record_id, Err(e)) => {
                    warn!(domain = %domain, index, record_id = ?record_id, error = %e, "skipping malformed record");
                    failures.push(RecordFailure {
                        index,
                        record_id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let mut inserted = 0;
        let mut batches = 0;
        let mut documents = documents.into_iter().peekable();
        while documents.peek().is_some() {
            let batch: Vec<TravelDocument> = documents.by_ref().take(self.batch_size).collect();
            let ids = batch.iter().map(|_| PointId::random()).collect();
            inserted += self.store.add_documents(domain, batch, ids).await?;
            batches += 1;
        }

        if inserted > 0 {
            self.store.persist(domain)?;
        }
        info!(domain = %domain, inserted, batches, failed = failures.len(), "populated collection");

        Ok(PopulateReport {
            domain,
            outcome: PopulateOutcome::Populated { inserted, batches },
            failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::FixedPrices;
    use crate::records::{FlexNumber, FlightRecord, HotelRecord};
    use serde_json::json;
    use tempfile::tempdir;
    use wayfarer_embedding::HashEmbedder;
    use wayfarer_storage::StorageManager;

    fn indexer(dir: &std::path::Path) -> (Arc<RecordStore>, Indexer) {
        let storage = Arc::new(StorageManager::new(dir).unwrap());
        let store = Arc::new(RecordStore::open(storage, Arc::new(HashEmbedder::default())).unwrap());
        let builder = DocumentBuilder::new(Arc::new(FixedPrices::new(250.0)));
        (store.clone(), Indexer::new(store, builder))
    }

    fn hotels(n: usize) -> Vec<HotelRecord> {
        (0..n)
            .map(|i| {
                serde_json::from_value(json!({
                    "hotel_id": i,
                    "hotel_name": format!("Hotel {}", i),
                    "city": "Lisbon",
                    "rating": 4.0
                }))
                .unwrap()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_populate_in_batches() {
        let dir = tempdir().unwrap();
        let (store, indexer) = indexer(dir.path());
        let indexer = indexer.with_batch_size(2);
        let seed = SeedData {
            hotels: hotels(5),
            ..Default::default()
        };

        let reports = indexer.populate_all(&seed).await.unwrap();
        assert_eq!(reports[0].domain, Domain::Hotel);
        assert_eq!(
            reports[0].outcome,
            PopulateOutcome::Populated { inserted: 5, batches: 3 }
        );
        assert_eq!(store.count(Domain::Hotel).unwrap(), 5);
        assert_eq!(reports[1].inserted(), 0);
        assert_eq!(reports[2].inserted(), 0);
    }

    #[tokio::test]
    async fn test_populate_is_idempotent() {
        let dir = tempdir().unwrap();
        let (store, indexer) = indexer(dir.path());
        let mut seed = SeedData {
            hotels: hotels(3),
            ..Default::default()
        };

        indexer.populate_all(&seed).await.unwrap();
        seed.hotels = hotels(4);
        let reports = indexer.populate_all(&seed).await.unwrap();

        assert!(reports[0].skipped());
        assert_eq!(reports[0].outcome, PopulateOutcome::Skipped { existing: 3 });
        assert_eq!(store.count(Domain::Hotel).unwrap(), 3);
    }

    #[tokio::test]
    async fn test_malformed_records_are_reported() {
        let dir = tempdir().unwrap();
        let (store, indexer) = indexer(dir.path());
        let seed = SeedData {
            flights: vec![
                FlightRecord {
                    flight_id: Some(json!("ok")),
                    operating_airline: "TAP".into(),
                    flight_duration: Some("PT2H".into()),
                    ..Default::default()
                },
                FlightRecord {
                    flight_id: Some(json!("bad")),
                    operating_airline: "TAP".into(),
                    flight_duration: Some("two hours".into()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let reports = indexer.populate_all(&seed).await.unwrap();
        let flights = &reports[2];
        assert_eq!(flights.inserted(), 1);
        assert_eq!(flights.failures.len(), 1);
        assert_eq!(flights.failures[0].index, 1);
        assert_eq!(flights.failures[0].record_id.as_deref(), Some("bad"));
        assert_eq!(store.count(Domain::Flight).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_non_finite_rating_is_reported() {
        let dir = tempdir().unwrap();
        let (store, indexer) = indexer(dir.path());
        let mut seed = SeedData {
            hotels: hotels(2),
            ..Default::default()
        };
        seed.hotels[1].rating = Some(FlexNumber::Text("NaN".into()));

        let reports = indexer.populate_all(&seed).await.unwrap();
        let hotels = &reports[0];
        assert_eq!(hotels.inserted(), 1);
        assert_eq!(hotels.failures.len(), 1);
        assert_eq!(hotels.failures[0].index, 1);
        assert_eq!(hotels.failures[0].record_id.as_deref(), Some("1"));
        assert!(hotels.failures[0].reason.contains("not finite"));
        assert_eq!(store.count(Domain::Hotel).unwrap(), 1);

        let rating = store.collection(Domain::Hotel).unwrap().iter()[0].payload["rating"].clone();
        assert_eq!(rating, json!(4.0));
    }

    #[tokio::test]
    async fn test_populated_collections_survive_restart() {
        let dir = tempdir().unwrap();
        let seed = SeedData {
            hotels: hotels(2),
            ..Default::default()
        };
        {
            let (_, indexer) = indexer(dir.path());
            indexer.populate_all(&seed).await.unwrap();
        }

        let (store, indexer) = indexer(dir.path());
        assert_eq!(store.count(Domain::Hotel).unwrap(), 2);
        let reports = indexer.populate_all(&seed).await.unwrap();
        assert!(reports[0].skipped());
    }
}
