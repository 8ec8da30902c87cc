//! Raw record to embeddable document.

use crate::domain::Domain;
use crate::duration::format_duration;
use crate::pricing::PriceSource;
use crate::records::{required_number, ExperienceRecord, FlightRecord, HotelRecord};
use crate::{Error, Result};
use serde_json::{json, Value};
use std::sync::Arc;
use wayfarer_core::Payload;

/// Display text plus the metadata that recommendations are copied from
#[derive(Debug, Clone, PartialEq)]
pub struct TravelDocument {
    pub domain: Domain,
    pub content: String,
    pub metadata: Payload,
}

/// Render a float the way the stored text expects it: `200.0`, `4.5`
pub fn format_number(value: f64) -> String {
    format!("{:?}", value)
}

pub(crate) fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| display_value(Some(item)))
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

fn display_opt(value: Option<&String>) -> &str {
    value.map(String::as_str).unwrap_or("")
}

fn into_payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        _ => Payload::new(),
    }
}

pub struct DocumentBuilder {
    prices: Arc<dyn PriceSource>,
}

impl DocumentBuilder {
    pub fn new(prices: Arc<dyn PriceSource>) -> Self {
        Self { prices }
    }

    pub fn hotel(&self, hotel: &HotelRecord) -> Result<TravelDocument> {
        let rating = required_number(hotel.rating.as_ref(), "rating")?;
        let price_per_night = self.prices.room_price();

        let content = [
            format!("Hotel: {}", hotel.hotel_name),
            format!("Description: {}", display_opt(hotel.hotel_description.as_ref())),
            format!("Location: {}, {}", hotel.city, display_opt(hotel.country.as_ref())),
            format!("Rating: {} stars", format_number(rating)),
            format!("Price per night: ${}", format_number(price_per_night)),
            format!("Pricing Tier: {}", display_opt(hotel.pricing_tier.as_ref())),
            format!("Amenities: {}", display_value(hotel.amenities.as_ref())),
        ]
        .join("\n");

        let metadata = json!({
            "hotel_id": hotel.hotel_id,
            "name": hotel.hotel_name,
            "city": hotel.city,
            "price_per_night": price_per_night,
            "rating": rating,
            "pricing_tier": hotel.pricing_tier,
            "type": Domain::Hotel.as_str(),
        });

        Ok(TravelDocument {
            domain: Domain::Hotel,
            content,
            metadata: into_payload(metadata),
        })
    }

    pub fn experience(&self, experience: &ExperienceRecord) -> Result<TravelDocument> {
        let price = required_number(experience.base_price.as_ref(), "base_price")?;
        let hours = experience
            .duration_hours
            .as_ref()
            .ok_or_else(|| Error::malformed("duration_hours", "missing"))?;
        hours.to_f64("duration_hours")?;
        let duration = format!("{} hours", hours);

        let content = [
            format!("Experience: {}", experience.title),
            format!("Description: {}", display_opt(experience.description.as_ref())),
            format!("Location: {}, {}", experience.city, display_opt(experience.country.as_ref())),
            format!("Duration: {}", duration),
            format!("Price: ${}", format_number(price)),
            format!("Tags: {}", display_value(experience.tags.as_ref())),
        ]
        .join("\n");

        let metadata = json!({
            "experience_id": experience.experience_id,
            "name": experience.title,
            "city": experience.city,
            "price": price,
            "duration": duration,
            "tags": experience.tags,
            "type": Domain::Experience.as_str(),
        });

        Ok(TravelDocument {
            domain: Domain::Experience,
            content,
            metadata: into_payload(metadata),
        })
    }

    pub fn flight(&self, flight: &FlightRecord) -> Result<TravelDocument> {
        let encoded = flight.flight_duration.as_deref().unwrap_or("");
        let duration = format_duration(encoded)?;
        let price = self.prices.cabin_price();

        let content = [
            format!(
                "Flight: {} {}",
                flight.operating_airline,
                display_value(flight.flight_number.as_ref())
            ),
            format!(
                "Route: {} ({}) to {} ({})",
                flight.airport_depart,
                display_opt(flight.city_depart.as_ref()),
                flight.airport_arrive,
                display_opt(flight.city_arrive.as_ref())
            ),
            format!("Departure: {}", display_opt(flight.depart.as_ref())),
            format!("Arrival: {}", display_opt(flight.arrive.as_ref())),
            format!("Date: {}", flight.depart_date),
            format!("Duration: {}", duration),
            format!("Price: ${}", format_number(price)),
            format!("Aircraft: {}", display_opt(flight.plane_type.as_ref())),
        ]
        .join("\n");

        let metadata = json!({
            "flight_id": flight.flight_id,
            "airline": flight.operating_airline,
            "from_airport": flight.airport_depart,
            "to_airport": flight.airport_arrive,
            "price": price,
            "duration": duration,
            "date": flight.depart_date,
            "flight_number": flight.flight_number,
            "type": Domain::Flight.as_str(),
        });

        Ok(TravelDocument {
            domain: Domain::Flight,
            content,
            metadata: into_payload(metadata),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::FixedPrices;
    use crate::records::FlexNumber;

    fn builder(room: f64, cabin: f64) -> DocumentBuilder {
        DocumentBuilder::new(Arc::new(FixedPrices { room, cabin }))
    }

    fn hotel() -> HotelRecord {
        serde_json::from_value(json!({
            "hotel_id": "hotel_123",
            "hotel_name": "Test Hotel",
            "hotel_description": "A lovely test hotel",
            "city": "London",
            "country": "UK",
            "rating": "4.5",
            "pricing_tier": "luxury",
            "amenities": "WiFi, Pool, Spa"
        }))
        .unwrap()
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(200.0), "200.0");
        assert_eq!(format_number(4.5), "4.5");
    }

    #[test]
    fn test_hotel_document() {
        let doc = builder(200.0, 500.0).hotel(&hotel()).unwrap();

        assert_eq!(doc.domain, Domain::Hotel);
        assert!(doc.content.starts_with("Hotel: Test Hotel\n"));
        assert!(doc.content.contains("London, UK"));
        assert!(doc.content.contains("4.5 stars"));
        assert!(doc.content.contains("$200"));
        assert!(doc.content.ends_with("Amenities: WiFi, Pool, Spa"));

        assert_eq!(doc.metadata["hotel_id"], json!("hotel_123"));
        assert_eq!(doc.metadata["name"], json!("Test Hotel"));
        assert_eq!(doc.metadata["city"], json!("London"));
        assert_eq!(doc.metadata["price_per_night"], json!(200.0));
        assert_eq!(doc.metadata["rating"], json!(4.5));
        assert_eq!(doc.metadata["pricing_tier"], json!("luxury"));
        assert_eq!(doc.metadata["type"], json!("hotel"));
    }

    #[test]
    fn test_hotel_without_rating_is_malformed() {
        let mut record = hotel();
        record.rating = None;
        let err = builder(200.0, 500.0).hotel(&record).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { ref field, .. } if field == "rating"));
    }

    #[test]
    fn test_non_finite_rating_is_malformed() {
        let mut record = hotel();
        record.rating = Some(FlexNumber::Text("NaN".into()));
        let err = builder(200.0, 500.0).hotel(&record).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { ref field, .. } if field == "rating"));
    }

    #[test]
    fn test_experience_without_duration_is_malformed() {
        let record = ExperienceRecord {
            title: "London Eye".into(),
            city: "London".into(),
            base_price: Some(FlexNumber::Text("50".into())),
            ..Default::default()
        };
        let err = builder(200.0, 500.0).experience(&record).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { ref field, .. } if field == "duration_hours"));
    }

    #[test]
    fn test_experience_document() {
        let record: ExperienceRecord = serde_json::from_value(json!({
            "experience_id": "exp_123",
            "title": "London Eye",
            "description": "Iconic observation wheel",
            "city": "London",
            "country": "UK",
            "base_price": "50.0",
            "duration_hours": "2",
            "tags": ["sightseeing", "landmark"]
        }))
        .unwrap();

        let doc = builder(200.0, 500.0).experience(&record).unwrap();

        assert!(doc.content.contains("London Eye"));
        assert!(doc.content.contains("London, UK"));
        assert!(doc.content.contains("Duration: 2 hours"));
        assert!(doc.content.contains("$50.0"));
        assert!(doc.content.contains("Tags: sightseeing, landmark"));

        assert_eq!(doc.metadata["experience_id"], json!("exp_123"));
        assert_eq!(doc.metadata["name"], json!("London Eye"));
        assert_eq!(doc.metadata["price"], json!(50.0));
        assert_eq!(doc.metadata["duration"], json!("2 hours"));
        assert_eq!(doc.metadata["tags"], json!(["sightseeing", "landmark"]));
        assert_eq!(doc.metadata["type"], json!("experience"));
    }

    #[test]
    fn test_flight_document() {
        let record: FlightRecord = serde_json::from_value(json!({
            "flight_id": "flight_123",
            "operating_airline": "Virgin Atlantic",
            "flight_number": "VS123",
            "airport_depart": "LHR",
            "airport_arrive": "JFK",
            "city_depart": "London",
            "city_arrive": "New York",
            "depart": "10:00",
            "arrive": "18:00",
            "depart_date": "2024-07-01",
            "flight_duration": "PT8H0M",
            "plane_type": "Boeing 787"
        }))
        .unwrap();

        let doc = builder(200.0, 500.0).flight(&record).unwrap();

        assert!(doc.content.contains("Flight: Virgin Atlantic VS123"));
        assert!(doc.content.contains("LHR (London) to JFK (New York)"));
        assert!(doc.content.contains("Duration: 8h"));
        assert!(doc.content.contains("$500"));

        assert_eq!(doc.metadata["flight_id"], json!("flight_123"));
        assert_eq!(doc.metadata["airline"], json!("Virgin Atlantic"));
        assert_eq!(doc.metadata["from_airport"], json!("LHR"));
        assert_eq!(doc.metadata["to_airport"], json!("JFK"));
        assert_eq!(doc.metadata["price"], json!(500.0));
        assert_eq!(doc.metadata["duration"], json!("8h"));
        assert_eq!(doc.metadata["date"], json!("2024-07-01"));
        assert_eq!(doc.metadata["type"], json!("flight"));
    }

    #[test]
    fn test_flight_with_bad_duration() {
        let record = FlightRecord {
            operating_airline: "Virgin Atlantic".into(),
            flight_duration: Some("8 hours".into()),
            ..Default::default()
        };
        let err = builder(200.0, 500.0).flight(&record).unwrap_err();
        assert!(matches!(err, Error::InvalidDurationFormat(_)));
    }
}
