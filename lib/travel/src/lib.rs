//! # Wayfarer Travel
//!
//! Travel recommendations over three record collections: hotels, flights
//! and experiences.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wayfarer_embedding::HashEmbedder;
//! use wayfarer_storage::StorageManager;
//! use wayfarer_travel::{
//!     AllowAllModerator, AssistantConfig, DocumentBuilder, Indexer, PolicyReasoner,
//!     RandomPrices, RecordStore, SeedData, TravelAssistant,
//! };
//!
//! # async fn run() -> wayfarer_travel::Result<()> {
//! let storage = Arc::new(StorageManager::new("./data/store")?);
//! let store = Arc::new(RecordStore::open(storage, Arc::new(HashEmbedder::default()))?);
//!
//! let indexer = Indexer::new(store.clone(), DocumentBuilder::new(Arc::new(RandomPrices::new())));
//! indexer.populate_all(&SeedData::load("./data/seed")?).await?;
//!
//! let assistant = TravelAssistant::new(
//!     store,
//!     Arc::new(AllowAllModerator),
//!     Arc::new(PolicyReasoner),
//!     AssistantConfig::default(),
//! );
//! let advice = assistant.plan_trip("romantic hotel in London").await?;
//! println!("{}", advice.destination);
//! # Ok(())
//! # }
//! ```

pub mod advice;
pub mod config;
pub mod coordinator;
pub mod document;
pub mod domain;
pub mod duration;
pub mod error;
pub mod grounding;
pub mod indexer;
pub mod pricing;
pub mod reasoning;
pub mod records;
pub mod safety;
pub mod selection;
pub mod store;
pub mod tools;

pub use advice::{
    ExperienceRecommendation, FlightRecommendation, HotelRecommendation, Recommendation,
    TravelAdvice, TravelQuery,
};
pub use config::{check_api_key, AssistantConfig};
pub use coordinator::TravelAssistant;
pub use document::{DocumentBuilder, TravelDocument};
pub use domain::Domain;
pub use duration::format_duration;
pub use error::{Error, Result};
pub use grounding::{DomainCheck, GroundingPolicy, GroundingReport, GroundingVerifier};
pub use indexer::{Indexer, PopulateOutcome, PopulateReport, RecordFailure};
pub use pricing::{FixedPrices, PriceSource, RandomPrices};
pub use reasoning::{Findings, PolicyReasoner, Reasoner, SearchPlan};
pub use records::{ExperienceRecord, FlexNumber, FlightRecord, HotelRecord, SeedData};
pub use safety::{
    check_rules, AllowAllModerator, Moderator, OpenAiModerator, QueryGate, QueryRejection,
    SafetyVerdict,
};
pub use selection::{best_candidate, select};
pub use store::{Candidate, DocumentIndex, RecordStore, StoredDocument};
pub use wayfarer_core::PayloadFilter;
pub use tools::{
    DomainSearchResult, ExperienceSearch, FlightSearch, HotelSearch, SearchStatus, SearchTools,
};
