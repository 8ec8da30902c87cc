// Exact-match payload filter
use serde_json::Value;
use crate::{Payload, Point};

pub trait Filter: Send + Sync {
    fn matches(&self, point: &Point) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterCondition {
    Equals { field: String, value: Value },
    And(Vec<FilterCondition>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayloadFilter {
    condition: FilterCondition,
}

impl PayloadFilter {
    pub fn new(condition: FilterCondition) -> Self {
        Self { condition }
    }

    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(FilterCondition::Equals {
            field: field.into(),
            value: value.into(),
        })
    }

    /// Every key of `fields` must be present with an equal value
    pub fn exact(fields: &Payload) -> Self {
        Self::new(FilterCondition::And(
            fields
                .iter()
                .map(|(field, value)| FilterCondition::Equals {
                    field: field.clone(),
                    value: value.clone(),
                })
                .collect(),
        ))
    }

    #[must_use]
    pub fn and(self, other: PayloadFilter) -> Self {
        let mut conditions = match self.condition {
            FilterCondition::And(conditions) => conditions,
            single => vec![single],
        };
        conditions.push(other.condition);
        Self::new(FilterCondition::And(conditions))
    }

    pub fn condition(&self) -> &FilterCondition {
        &self.condition
    }

    fn matches_condition(condition: &FilterCondition, point: &Point) -> bool {
        match condition {
            FilterCondition::Equals { field, value } => point
                .field(field)
                .map(|v| values_equal(v, value))
                .unwrap_or(false),
            FilterCondition::And(conditions) => {
                conditions.iter().all(|c| Self::matches_condition(c, point))
            }
        }
    }
}

// 300 and 300.0 are the same price
fn values_equal(stored: &Value, expected: &Value) -> bool {
    match (stored.as_f64(), expected.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => stored == expected,
    }
}

impl Filter for PayloadFilter {
    fn matches(&self, point: &Point) -> bool {
        Self::matches_condition(&self.condition, point)
    }
}
