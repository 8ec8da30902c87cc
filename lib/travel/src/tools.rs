//! Domain search tools: query augmentation, similarity search, post-filters.

use crate::document::display_value;
use crate::domain::Domain;
use crate::store::{Candidate, DocumentIndex, DEFAULT_K};
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

const SEPARATOR_WIDTH: usize = 50;
const EXCERPT_CHARS: usize = 300;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HotelSearch {
    pub query: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub min_rating: Option<f64>,
}

impl HotelSearch {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn query_text(&self) -> String {
        let mut text = self.query.clone();
        if let Some(location) = &self.location {
            text.push_str(&format!(" in {}", location));
        }
        text
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightSearch {
    pub query: String,
    #[serde(default)]
    pub from_city: Option<String>,
    #[serde(default)]
    pub to_city: Option<String>,
    #[serde(default)]
    pub from_airport: Option<String>,
    #[serde(default)]
    pub to_airport: Option<String>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub month: Option<String>,
}

impl FlightSearch {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn query_text(&self) -> String {
        let mut parts = vec![self.query.clone()];
        let from: Vec<&str> = [&self.from_city, &self.from_airport]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect();
        if !from.is_empty() {
            parts.push(format!("from {}", from.join(" ")));
        }
        let to: Vec<&str> = [&self.to_city, &self.to_airport]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect();
        if !to.is_empty() {
            parts.push(format!("to {}", to.join(" ")));
        }
        if let Some(month) = &self.month {
            parts.push(format!("in {}", month));
        }
        parts.join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceSearch {
    pub query: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub max_price: Option<f64>,
}

impl ExperienceSearch {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn query_text(&self) -> String {
        let mut text = self.query.clone();
        if let Some(location) = &self.location {
            text.push_str(&format!(" in {}", location));
        }
        text
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    /// The similarity search itself returned nothing
    NoHits,
    /// Hits existed but none passed the price or rating filters
    FilteredOut,
    Matched,
}

/// Filtered candidates for one domain, in ranking order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainSearchResult {
    pub domain: Domain,
    pub status: SearchStatus,
    pub candidates: Vec<Candidate>,
}

impl DomainSearchResult {
    pub fn empty(domain: Domain) -> Self {
        Self {
            domain,
            status: SearchStatus::NoHits,
            candidates: Vec::new(),
        }
    }

    fn from_filtered(domain: Domain, hits: usize, candidates: Vec<Candidate>) -> Self {
        let status = match (hits, candidates.is_empty()) {
            (0, _) => SearchStatus::NoHits,
            (_, true) => SearchStatus::FilteredOut,
            (_, false) => SearchStatus::Matched,
        };
        Self {
            domain,
            status,
            candidates,
        }
    }

    fn row_fields(&self) -> &'static [&'static str] {
        match self.domain {
            Domain::Hotel => &["name", "city", "price_per_night", "rating", "pricing_tier"],
            Domain::Flight => &[
                "airline",
                "flight_number",
                "from_airport",
                "to_airport",
                "price",
                "duration",
                "date",
            ],
            Domain::Experience => &["name", "city", "price", "duration", "tags"],
        }
    }

    /// Structured rows: the output-facing metadata fields plus `similarity_score`
    pub fn rows(&self) -> Vec<Value> {
        self.candidates
            .iter()
            .map(|candidate| {
                let mut row = Map::new();
                for field in self.row_fields() {
                    let value = candidate.metadata().get(*field).cloned().unwrap_or(Value::Null);
                    row.insert((*field).to_string(), value);
                }
                row.insert("similarity_score".to_string(), Value::from(candidate.score));
                Value::Object(row)
            })
            .collect()
    }

    /// Human-readable listing of the candidates
    pub fn to_text(&self) -> String {
        match self.status {
            SearchStatus::NoHits => {
                format!("No {} found matching your criteria.", self.domain.plural())
            }
            SearchStatus::FilteredOut => {
                format!("No {} found matching your filters.", self.domain.plural())
            }
            SearchStatus::Matched => {
                let separator = format!("\n{}\n", "=".repeat(SEPARATOR_WIDTH));
                let blocks: Vec<String> = self
                    .candidates
                    .iter()
                    .map(|c| format_candidate(self.domain, c))
                    .collect();
                blocks.join(&separator)
            }
        }
    }
}

fn field(candidate: &Candidate, key: &str) -> String {
    display_value(candidate.metadata().get(key))
}

fn excerpt(content: &str) -> String {
    let head: String = content.chars().take(EXCERPT_CHARS).collect();
    format!("{}...", head)
}

fn format_candidate(domain: Domain, c: &Candidate) -> String {
    match domain {
        Domain::Hotel => format!(
            "Hotel: {}\nLocation: {}\nRating: {} stars\nPrice: ${}/night\nPricing Tier: {}\nSimilarity Score: {:.3}\nDescription: {}",
            field(c, "name"),
            field(c, "city"),
            field(c, "rating"),
            field(c, "price_per_night"),
            field(c, "pricing_tier"),
            c.score,
            excerpt(&c.document.content),
        ),
        Domain::Flight => format!(
            "Flight: {} {}\nRoute: {} to {}\nDate: {}\nDuration: {}\nPrice: ${}\nSimilarity Score: {:.3}\nDetails: {}",
            field(c, "airline"),
            field(c, "flight_number"),
            field(c, "from_airport"),
            field(c, "to_airport"),
            field(c, "date"),
            field(c, "duration"),
            field(c, "price"),
            c.score,
            excerpt(&c.document.content),
        ),
        Domain::Experience => format!(
            "Experience: {}\nLocation: {}\nDuration: {}\nPrice: ${}\nSimilarity Score: {:.3}\nDescription: {}",
            field(c, "name"),
            field(c, "city"),
            field(c, "duration"),
            field(c, "price"),
            c.score,
            excerpt(&c.document.content),
        ),
    }
}

fn within_price(candidate: &Candidate, key: &str, max_price: Option<f64>) -> bool {
    match max_price {
        Some(max) => candidate.metadata_f64(key).unwrap_or(0.0) <= max,
        None => true,
    }
}

fn meets_rating(candidate: &Candidate, min_rating: Option<f64>) -> bool {
    match min_rating {
        Some(min) => candidate.metadata_f64("rating").unwrap_or(0.0) >= min,
        None => true,
    }
}

/// The three domain search tools over one index
pub struct SearchTools {
    index: Arc<dyn DocumentIndex>,
    k: usize,
}

impl SearchTools {
    pub fn new(index: Arc<dyn DocumentIndex>) -> Self {
        Self { index, k: DEFAULT_K }
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn index(&self) -> &Arc<dyn DocumentIndex> {
        &self.index
    }

    async fn retrieve(&self, domain: Domain, query: &str) -> Result<Vec<Candidate>> {
        let hits = self.index.search_with_score(domain, query, self.k, None).await?;
        debug!(domain = %domain, query, hits = hits.len(), "domain search");
        Ok(hits)
    }

    pub async fn hotel_search(&self, params: &HotelSearch) -> Result<DomainSearchResult> {
        let hits = self.retrieve(Domain::Hotel, &params.query_text()).await?;
        let total = hits.len();
        let kept = hits
            .into_iter()
            .filter(|c| within_price(c, "price_per_night", params.max_price))
            .filter(|c| meets_rating(c, params.min_rating))
            .collect();
        Ok(DomainSearchResult::from_filtered(Domain::Hotel, total, kept))
    }

    pub async fn flight_search(&self, params: &FlightSearch) -> Result<DomainSearchResult> {
        let hits = self.retrieve(Domain::Flight, &params.query_text()).await?;
        let total = hits.len();
        let kept = hits
            .into_iter()
            .filter(|c| within_price(c, "price", params.max_price))
            .collect();
        Ok(DomainSearchResult::from_filtered(Domain::Flight, total, kept))
    }

    pub async fn experience_search(&self, params: &ExperienceSearch) -> Result<DomainSearchResult> {
        let hits = self.retrieve(Domain::Experience, &params.query_text()).await?;
        let total = hits.len();
        let kept = hits
            .into_iter()
            .filter(|c| within_price(c, "price", params.max_price))
            .collect();
        Ok(DomainSearchResult::from_filtered(Domain::Experience, total, kept))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoredDocument;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;
    use wayfarer_core::PayloadFilter;

    /// Returns canned hits and records every query it sees
    struct CannedIndex {
        hits: Vec<Candidate>,
        queries: Mutex<Vec<(Domain, String, usize)>>,
    }

    impl CannedIndex {
        fn new(hits: Vec<Candidate>) -> Arc<Self> {
            Arc::new(Self {
                hits,
                queries: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl DocumentIndex for CannedIndex {
        async fn search_with_score(
            &self,
            domain: Domain,
            query: &str,
            k: usize,
            _filter: Option<&PayloadFilter>,
        ) -> Result<Vec<Candidate>> {
            self.queries.lock().push((domain, query.to_string(), k));
            Ok(self.hits.iter().take(k).cloned().collect())
        }
    }

    fn hotel(name: &str, price: f64, rating: f64, score: f32) -> Candidate {
        Candidate {
            document: StoredDocument {
                id: name.to_string(),
                content: format!("Hotel: {}\nDescription: {}", name, "x".repeat(400)),
                metadata: json!({
                    "name": name,
                    "city": "London",
                    "price_per_night": price,
                    "rating": rating,
                    "pricing_tier": "luxury",
                    "type": "hotel"
                })
                .as_object()
                .unwrap()
                .clone(),
            },
            score,
        }
    }

    #[test]
    fn test_query_augmentation() {
        let hotel = HotelSearch {
            location: Some("London".into()),
            ..HotelSearch::new("luxury hotel")
        };
        assert_eq!(hotel.query_text(), "luxury hotel in London");

        let flight = FlightSearch {
            from_city: Some("London".into()),
            to_city: Some("New York".into()),
            to_airport: Some("JFK".into()),
            month: Some("July".into()),
            ..FlightSearch::new("cheap flight")
        };
        assert_eq!(flight.query_text(), "cheap flight from London to New York JFK in July");

        assert_eq!(ExperienceSearch::new("museum").query_text(), "museum");
    }

    #[tokio::test]
    async fn test_hotel_search_uses_fixed_k() {
        let index = CannedIndex::new(vec![hotel("The Savoy", 450.0, 4.5, 0.9)]);
        let tools = SearchTools::new(index.clone());
        let params = HotelSearch {
            location: Some("London".into()),
            ..HotelSearch::new("luxury hotel")
        };

        let result = tools.hotel_search(&params).await.unwrap();
        assert_eq!(result.status, SearchStatus::Matched);
        assert_eq!(result.candidates.len(), 1);

        let queries = index.queries.lock();
        assert_eq!(queries[0], (Domain::Hotel, "luxury hotel in London".to_string(), 5));
    }

    #[tokio::test]
    async fn test_price_then_rating_filters() {
        let index = CannedIndex::new(vec![
            hotel("Pricey", 500.0, 5.0, 0.9),
            hotel("Shabby", 80.0, 2.5, 0.8),
            hotel("Just Right", 95.0, 4.0, 0.7),
        ]);
        let tools = SearchTools::new(index);
        let params = HotelSearch {
            max_price: Some(100.0),
            min_rating: Some(3.0),
            ..HotelSearch::new("hotel")
        };

        let result = tools.hotel_search(&params).await.unwrap();
        assert_eq!(result.candidates.len(), 1);
        assert_eq!(result.candidates[0].document.id, "Just Right");
    }

    #[tokio::test]
    async fn test_no_hits_and_filtered_out_differ() {
        let tools = SearchTools::new(CannedIndex::new(vec![]));
        let none = tools.hotel_search(&HotelSearch::new("hotel")).await.unwrap();
        assert_eq!(none.status, SearchStatus::NoHits);
        assert_eq!(none.to_text(), "No hotels found matching your criteria.");

        let tools = SearchTools::new(CannedIndex::new(vec![hotel("Pricey", 500.0, 5.0, 0.9)]));
        let params = HotelSearch {
            max_price: Some(100.0),
            min_rating: Some(3.0),
            ..HotelSearch::new("hotel")
        };
        let filtered = tools.hotel_search(&params).await.unwrap();
        assert_eq!(filtered.status, SearchStatus::FilteredOut);
        assert!(filtered.candidates.is_empty());
        assert_eq!(filtered.to_text(), "No hotels found matching your filters.");
    }

    #[tokio::test]
    async fn test_rows_and_text() {
        let tools = SearchTools::new(CannedIndex::new(vec![
            hotel("The Savoy", 450.0, 4.5, 0.9123),
            hotel("The Ritz", 480.0, 5.0, 0.8),
        ]));
        let result = tools.hotel_search(&HotelSearch::new("hotel")).await.unwrap();

        let rows = result.rows();
        assert_eq!(rows[0]["name"], json!("The Savoy"));
        assert_eq!(rows[0]["price_per_night"], json!(450.0));
        assert!((rows[0]["similarity_score"].as_f64().unwrap() - 0.9123).abs() < 1e-6);
        assert!(rows[0].get("type").is_none());

        let text = result.to_text();
        assert!(text.starts_with("Hotel: The Savoy\nLocation: London\nRating: 4.5 stars\nPrice: $450.0/night"));
        assert!(text.contains("Similarity Score: 0.912"));
        assert!(text.contains(&"=".repeat(50)));
        assert!(text.contains("Hotel: The Ritz"));
        assert!(!text.contains(&"x".repeat(301)));
    }

    #[tokio::test]
    async fn test_flight_price_filter() {
        let flight = Candidate {
            document: StoredDocument {
                id: "f1".into(),
                content: "Flight: TAP TP1".into(),
                metadata: json!({"airline": "TAP", "price": 700.0, "type": "flight"})
                    .as_object()
                    .unwrap()
                    .clone(),
            },
            score: 0.5,
        };
        let tools = SearchTools::new(CannedIndex::new(vec![flight]));

        let params = FlightSearch {
            max_price: Some(600.0),
            ..FlightSearch::new("flight")
        };
        let result = tools.flight_search(&params).await.unwrap();
        assert_eq!(result.status, SearchStatus::FilteredOut);
        assert_eq!(result.to_text(), "No flights found matching your filters.");

        let result = tools.flight_search(&FlightSearch::new("flight")).await.unwrap();
        assert_eq!(result.status, SearchStatus::Matched);
    }
}
