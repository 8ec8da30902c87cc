//! Query safety gate: ordered local rules, then an external moderation check.

use crate::{Error, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, warn};

pub const MIN_QUERY_CHARS: usize = 3;
pub const MAX_QUERY_CHARS: usize = 1000;

static INJECTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)<script.*?>.*?</script>",
        r"(?i)union.*select",
        r"(?i)javascript:",
        r"(?i)eval\s*\(",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid injection pattern"))
    .collect()
});

const TRAVEL_KEYWORDS: &[&str] = &[
    "travel",
    "trip",
    "vacation",
    "holiday",
    "hotel",
    "flight",
    "experience",
    "activity",
    "destination",
    "city",
    "romantic",
    "family",
    "business",
    "group",
    "couple",
    "solo",
    "budget",
    "getaway",
    "gateaway",
    "airport",
    "airline",
];

const GAMBLING_KEYWORDS: &[&str] = &["casino", "gambling", "poker", "blackjack"];

/// Why a query was refused; the message is shown to the user as-is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryRejection {
    Empty,
    TooShort,
    TooLong,
    Injection,
    OffTopic,
    Gambling,
    Flagged,
}

impl QueryRejection {
    pub fn message(&self) -> &'static str {
        match self {
            QueryRejection::Empty => {
                "Please provide a travel query. Tell me where you'd like to go or what you're looking for!"
            }
            QueryRejection::TooShort => {
                "Your query is too short. Please provide more details about your travel plans."
            }
            QueryRejection::TooLong => "Your query is too long. Please provide a shorter query.",
            QueryRejection::Injection | QueryRejection::Flagged => {
                "Your query contains inappropriate content. Please rephrase your travel request."
            }
            QueryRejection::OffTopic => {
                "Your query is not travel related. Please ask about travel destinations, hotels, flights, or activities instead."
            }
            QueryRejection::Gambling => {
                "I'm a travel assistant and cannot help with gambling-related requests. Please ask about travel destinations, hotels, flights, or activities instead."
            }
        }
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    let lower = text.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

/// The local rules, first failing rule wins
pub fn check_rules(query: &str) -> std::result::Result<(), QueryRejection> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(QueryRejection::Empty);
    }

    let chars = trimmed.chars().count();
    if chars < MIN_QUERY_CHARS {
        return Err(QueryRejection::TooShort);
    }
    if chars > MAX_QUERY_CHARS {
        return Err(QueryRejection::TooLong);
    }

    if INJECTION_PATTERNS.iter().any(|re| re.is_match(query)) {
        return Err(QueryRejection::Injection);
    }
    if !contains_any(query, TRAVEL_KEYWORDS) {
        return Err(QueryRejection::OffTopic);
    }
    if contains_any(query, GAMBLING_KEYWORDS) {
        return Err(QueryRejection::Gambling);
    }
    Ok(())
}

/// External content moderation
#[async_trait]
pub trait Moderator: Send + Sync {
    /// `Ok(true)` when the text is flagged; `Err` when the service is unavailable
    async fn is_flagged(&self, text: &str) -> Result<bool>;
}

/// Accepts everything
pub struct AllowAllModerator;

#[async_trait]
impl Moderator for AllowAllModerator {
    async fn is_flagged(&self, _text: &str) -> Result<bool> {
        Ok(false)
    }
}

/// Client for an OpenAI-compatible `POST {api_base}/moderations` endpoint
pub struct OpenAiModerator {
    client: Client,
    api_base: String,
    api_key: String,
}

impl OpenAiModerator {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        Ok(Self {
            client,
            api_base: api_base.into(),
            api_key: api_key.into(),
        })
    }
}

fn parse_flagged(json: &Value) -> Result<bool> {
    json.pointer("/results/0/flagged")
        .and_then(Value::as_bool)
        .ok_or_else(|| Error::ModerationUnavailable("response is missing results[0].flagged".to_string()))
}

#[async_trait]
impl Moderator for OpenAiModerator {
    async fn is_flagged(&self, text: &str) -> Result<bool> {
        let url = format!("{}/moderations", self.api_base.trim_end_matches('/'));
        let unavailable = |e: reqwest::Error| Error::ModerationUnavailable(e.to_string());

        let res = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&json!({ "input": text }))
            .send()
            .await
            .map_err(unavailable)?;
        let json: Value = res
            .error_for_status()
            .map_err(unavailable)?
            .json()
            .await
            .map_err(unavailable)?;
        parse_flagged(&json)
    }
}

/// Outcome of a query that passed the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SafetyVerdict {
    /// Moderation could not be consulted and the query was let through
    pub degraded: bool,
}

pub struct QueryGate {
    moderator: Arc<dyn Moderator>,
    timeout: Duration,
}

impl QueryGate {
    pub fn new(moderator: Arc<dyn Moderator>, timeout: Duration) -> Self {
        Self { moderator, timeout }
    }

    /// Run the local rules, then moderation. Moderation outages fail open.
    pub async fn check(&self, query: &str) -> Result<SafetyVerdict> {
        check_rules(query).map_err(Error::UnsafeQuery)?;

        let outcome = match tokio::time::timeout(self.timeout, self.moderator.is_flagged(query)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(Error::Timeout("moderation request".to_string())),
        };

        match outcome {
            Ok(true) => Err(Error::UnsafeQuery(QueryRejection::Flagged)),
            Ok(false) => {
                debug!("query passed safety gate");
                Ok(SafetyVerdict::default())
            }
            Err(e) => {
                warn!(error = %e, "moderation unavailable, accepting query");
                Ok(SafetyVerdict { degraded: true })
            }
        }
    }
}
