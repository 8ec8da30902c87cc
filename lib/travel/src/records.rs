//! Raw seed records, as they arrive from the JSON seed files.
//!
//! Numeric fields may be JSON numbers or numeric strings; identifiers,
//! amenities and tags are carried through untouched.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;

/// A number that may have been written as a string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlexNumber {
    Number(serde_json::Number),
    Text(String),
}

impl FlexNumber {
    /// The value as a finite float; NaN and infinities are rejected
    pub fn to_f64(&self, field: &str) -> Result<f64> {
        let value = match self {
            FlexNumber::Number(n) => n
                .as_f64()
                .ok_or_else(|| Error::malformed(field, format!("{} is out of range", n)))?,
            FlexNumber::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| Error::malformed(field, format!("'{}' is not a number", s)))?,
        };
        if !value.is_finite() {
            return Err(Error::malformed(field, format!("'{}' is not finite", self)));
        }
        Ok(value)
    }
}

impl fmt::Display for FlexNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlexNumber::Number(n) => write!(f, "{}", n),
            FlexNumber::Text(s) => f.write_str(s),
        }
    }
}

pub(crate) fn required_number(value: Option<&FlexNumber>, field: &str) -> Result<f64> {
    value
        .ok_or_else(|| Error::malformed(field, "missing"))?
        .to_f64(field)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HotelRecord {
    #[serde(default)]
    pub hotel_id: Option<Value>,
    #[serde(default)]
    pub hotel_name: String,
    #[serde(default)]
    pub hotel_description: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub rating: Option<FlexNumber>,
    #[serde(default)]
    pub pricing_tier: Option<String>,
    #[serde(default)]
    pub amenities: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceRecord {
    #[serde(default)]
    pub experience_id: Option<Value>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub base_price: Option<FlexNumber>,
    #[serde(default)]
    pub duration_hours: Option<FlexNumber>,
    #[serde(default)]
    pub tags: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    #[serde(default)]
    pub flight_id: Option<Value>,
    #[serde(default)]
    pub operating_airline: String,
    #[serde(default)]
    pub flight_number: Option<Value>,
    #[serde(default)]
    pub airport_depart: String,
    #[serde(default)]
    pub airport_arrive: String,
    #[serde(default)]
    pub city_depart: Option<String>,
    #[serde(default)]
    pub city_arrive: Option<String>,
    #[serde(default)]
    pub depart: Option<String>,
    #[serde(default)]
    pub arrive: Option<String>,
    #[serde(default)]
    pub depart_date: String,
    #[serde(default)]
    pub flight_duration: Option<String>,
    #[serde(default)]
    pub plane_type: Option<String>,
}

/// Identifier of a raw record, for failure reports
pub(crate) fn describe_id(id: Option<&Value>) -> Option<String> {
    match id? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// The three record sequences supplied at start-up
#[derive(Debug, Clone, Default)]
pub struct SeedData {
    pub hotels: Vec<HotelRecord>,
    pub flights: Vec<FlightRecord>,
    pub experiences: Vec<ExperienceRecord>,
}

impl SeedData {
    pub const HOTELS_FILE: &'static str = "hotels.json";
    pub const FLIGHTS_FILE: &'static str = "flights.json";
    pub const EXPERIENCES_FILE: &'static str = "experiences.json";

    /// Read `hotels.json`, `flights.json` and `experiences.json` from `dir`
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        Ok(Self {
            hotels: read_array(&dir.join(Self::HOTELS_FILE))?,
            flights: read_array(&dir.join(Self::FLIGHTS_FILE))?,
            experiences: read_array(&dir.join(Self::EXPERIENCES_FILE))?,
        })
    }

    pub fn len(&self) -> usize {
        self.hotels.len() + self.flights.len() + self.experiences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn read_array<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| Error::Seed(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&raw).map_err(|e| Error::Seed(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_flex_number() {
        let rating: FlexNumber = serde_json::from_value(json!(4.5)).unwrap();
        assert_eq!(rating.to_f64("rating").unwrap(), 4.5);
        assert_eq!(FlexNumber::Text(" 50.0 ".into()).to_f64("price").unwrap(), 50.0);

        let err = FlexNumber::Text("four".into()).to_f64("rating").unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { ref field, .. } if field == "rating"));
    }

    #[test]
    fn test_flex_number_rejects_non_finite() {
        for text in ["NaN", "inf", "-infinity"] {
            let err = FlexNumber::Text(text.into()).to_f64("rating").unwrap_err();
            assert!(
                matches!(err, Error::MalformedRecord { ref field, ref reason } if field == "rating" && reason.contains("not finite")),
                "{} was accepted",
                text
            );
        }
    }

    #[test]
    fn test_flex_number_display_keeps_source_form() {
        let whole: FlexNumber = serde_json::from_value(json!(2)).unwrap();
        let text: FlexNumber = serde_json::from_value(json!("2")).unwrap();
        let float: FlexNumber = serde_json::from_value(json!(1.5)).unwrap();
        assert_eq!(whole.to_string(), "2");
        assert_eq!(text.to_string(), "2");
        assert_eq!(float.to_string(), "1.5");
    }

    #[test]
    fn test_hotel_accepts_string_rating() {
        let hotel: HotelRecord = serde_json::from_value(json!({
            "hotel_id": "hotel_123",
            "hotel_name": "Test Hotel",
            "city": "London",
            "rating": "4.5",
            "amenities": ["WiFi", "Spa"]
        }))
        .unwrap();

        assert_eq!(hotel.rating, Some(FlexNumber::Text("4.5".into())));
        assert_eq!(hotel.hotel_id, Some(json!("hotel_123")));
        assert!(hotel.country.is_none());
    }

    #[test]
    fn test_load_seed_dir() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SeedData::HOTELS_FILE),
            r#"[{"hotel_name": "The Savoy", "city": "London", "rating": 4.5}]"#,
        )
        .unwrap();
        std::fs::write(dir.path().join(SeedData::FLIGHTS_FILE), "[]").unwrap();
        std::fs::write(
            dir.path().join(SeedData::EXPERIENCES_FILE),
            r#"[{"title": "London Eye", "city": "London", "base_price": 50, "duration_hours": "2"}]"#,
        )
        .unwrap();

        let seed = SeedData::load(dir.path()).unwrap();
        assert_eq!(seed.hotels.len(), 1);
        assert_eq!(seed.flights.len(), 0);
        assert_eq!(seed.experiences.len(), 1);
        assert_eq!(seed.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(SeedData::load(dir.path()), Err(Error::Seed(_))));
    }
}
