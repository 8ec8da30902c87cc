//! # Wayfarer
//!
//! Retrieval-grounded travel recommendations.
//!
//! Wayfarer embeds a fixed catalogue of hotels, flights and experiences into
//! three collections, answers free-text travel queries by searching each
//! one, and only returns advice whose hotel, flight and experience can be
//! found again in the catalogue.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! wayfarer --seed-dir ./data/seed --http-port 8000
//! curl -X POST localhost:8000/travel-assistant \
//!      -H 'content-type: application/json' \
//!      -d '{"query": "romantic getaway in Paris"}'
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wayfarer::prelude::*;
//!
//! # async fn run() -> wayfarer::Result<()> {
//! let storage = Arc::new(StorageManager::new("./data/store")?);
//! let store = Arc::new(RecordStore::open(storage, Arc::new(HashEmbedder::default()))?);
//!
//! let tools = SearchTools::new(store);
//! let hotels = tools
//!     .hotel_search(&HotelSearch {
//!         location: Some("London".to_string()),
//!         ..HotelSearch::new("luxury hotel")
//!     })
//!     .await?;
//! println!("{}", hotels.to_text());
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Structure
//!
//! - `wayfarer-core` - Vector, Point, Collection and payload filters
//! - `wayfarer-embedding` - Text embedders (feature hashing, OpenAI-compatible HTTP)
//! - `wayfarer-storage` - Collection directories and checksummed snapshots
//! - `wayfarer-travel` - Records, indexing, domain search, selection, grounding, safety
//! - `wayfarer-api` - HTTP API

pub use wayfarer_core::{
    Collection, CollectionConfig, Distance, Filter, FilterCondition, Payload, PayloadFilter,
    Point, PointId, Vector,
};

pub use wayfarer_embedding::{Embedder, HashEmbedder, OpenAiEmbedder, OpenAiEmbedderConfig};

pub use wayfarer_storage::StorageManager;

pub use wayfarer_travel::{
    AssistantConfig, Domain, Error, GroundingPolicy, RecordStore, Result, SeedData,
    TravelAdvice, TravelAssistant,
};

pub use wayfarer_api::RestApi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AssistantConfig, Distance, Domain, Embedder, Error, GroundingPolicy, HashEmbedder,
        PayloadFilter, RecordStore, RestApi, Result, SeedData, StorageManager, TravelAdvice,
        TravelAssistant,
    };
    pub use wayfarer_travel::{
        AllowAllModerator, DocumentBuilder, DocumentIndex, ExperienceSearch, FlightSearch,
        HotelSearch, Indexer, PolicyReasoner, RandomPrices, SearchTools,
    };
}
