//! Request and response schemas for the assistant.

use crate::domain::Domain;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelQuery {
    pub query: String,
}

/// Output-facing shape of a chosen candidate, copied from its metadata
pub trait Recommendation: Serialize + DeserializeOwned + Clone + Send + Sync {
    const DOMAIN: Domain;

    /// Query used to look the recommendation back up in its collection
    fn grounding_query(&self) -> String;

    /// Price used when classifying the overall budget
    fn price(&self) -> f64;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelRecommendation {
    pub name: String,
    pub city: String,
    pub price_per_night: f64,
    pub rating: f64,
}

impl Recommendation for HotelRecommendation {
    const DOMAIN: Domain = Domain::Hotel;

    fn grounding_query(&self) -> String {
        format!("{} {}", self.name, self.city)
    }

    fn price(&self) -> f64 {
        self.price_per_night
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRecommendation {
    pub airline: String,
    pub from_airport: String,
    pub to_airport: String,
    pub price: f64,
    pub duration: String,
    pub date: String,
}

impl Recommendation for FlightRecommendation {
    const DOMAIN: Domain = Domain::Flight;

    fn grounding_query(&self) -> String {
        format!(
            "{} {} {} {}",
            self.airline, self.from_airport, self.to_airport, self.date
        )
    }

    fn price(&self) -> f64 {
        self.price
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceRecommendation {
    pub name: String,
    pub city: String,
    pub price: f64,
    pub duration: String,
}

impl Recommendation for ExperienceRecommendation {
    const DOMAIN: Domain = Domain::Experience;

    fn grounding_query(&self) -> String {
        format!("{} {}", self.name, self.city)
    }

    fn price(&self) -> f64 {
        self.price
    }
}

/// The assembled answer to a travel query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelAdvice {
    pub destination: String,
    pub reason: String,
    pub budget: String,
    pub tips: Vec<String>,
    pub hotel: Option<HotelRecommendation>,
    pub flight: Option<FlightRecommendation>,
    pub experience: Option<ExperienceRecommendation>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_grounding_queries() {
        let hotel = HotelRecommendation {
            name: "The Savoy".into(),
            city: "London".into(),
            price_per_night: 450.0,
            rating: 4.5,
        };
        assert_eq!(hotel.grounding_query(), "The Savoy London");

        let flight = FlightRecommendation {
            airline: "Virgin Atlantic".into(),
            from_airport: "LHR".into(),
            to_airport: "JFK".into(),
            price: 500.0,
            duration: "8h".into(),
            date: "2024-07-01".into(),
        };
        assert_eq!(flight.grounding_query(), "Virgin Atlantic LHR JFK 2024-07-01");
    }

    #[test]
    fn test_advice_serializes_missing_domains_as_null() {
        let advice = TravelAdvice {
            destination: "London".into(),
            reason: "r".into(),
            budget: "Mid-range".into(),
            tips: vec![],
            hotel: None,
            flight: None,
            experience: None,
        };
        let value = serde_json::to_value(&advice).unwrap();
        assert_eq!(value["hotel"], json!(null));
        assert_eq!(value["destination"], json!("London"));
    }
}
