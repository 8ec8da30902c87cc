use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use crate::vector::Vector;

/// Metadata attached to a point
pub type Payload = serde_json::Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointId {
    Uuid(Uuid),
    String(String),
}

impl PointId {
    /// A freshly generated v4 identifier
    #[must_use]
    pub fn random() -> Self {
        PointId::Uuid(Uuid::new_v4())
    }

    /// Parses UUID-shaped ids back into the `Uuid` variant
    pub fn parse(s: &str) -> Self {
        Uuid::parse_str(s)
            .map(PointId::Uuid)
            .unwrap_or_else(|_| PointId::String(s.to_string()))
    }
}

impl std::fmt::Display for PointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PointId::Uuid(u) => write!(f, "{}", u),
            PointId::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<String> for PointId {
    fn from(s: String) -> Self {
        PointId::String(s)
    }
}

impl From<&str> for PointId {
    fn from(s: &str) -> Self {
        PointId::String(s.to_string())
    }
}

impl From<Uuid> for PointId {
    fn from(u: Uuid) -> Self {
        PointId::Uuid(u)
    }
}

/// An embedded document: the text it was embedded from, its vector and its metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    pub id: PointId,
    pub vector: Vector,
    pub document: String,
    pub payload: Payload,
}

impl Point {
    #[inline]
    #[must_use]
    pub fn new(id: PointId, vector: Vector, document: impl Into<String>, payload: Payload) -> Self {
        Self {
            id,
            vector,
            document: document.into(),
            payload,
        }
    }

    #[inline]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    #[inline]
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }

    #[inline]
    pub fn field_f64(&self, key: &str) -> Option<f64> {
        self.payload.get(key).and_then(Value::as_f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_point_id_parse_roundtrips_uuid() {
        let id = PointId::random();
        assert_eq!(PointId::parse(&id.to_string()), id);
        assert_eq!(PointId::parse("hotel-1"), PointId::String("hotel-1".to_string()));
    }

    #[test]
    fn test_field_accessors() {
        let mut payload = Payload::new();
        payload.insert("name".to_string(), json!("The Savoy"));
        payload.insert("rating".to_string(), json!(4.5));
        let point = Point::new(PointId::random(), Vector::new(vec![1.0]), "Hotel", payload);

        assert_eq!(point.field_str("name"), Some("The Savoy"));
        assert_eq!(point.field_f64("rating"), Some(4.5));
        assert!(point.field("missing").is_none());
    }
}
