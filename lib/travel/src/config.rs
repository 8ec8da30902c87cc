use crate::grounding::GroundingPolicy;
use crate::store::{DEFAULT_K, DEFAULT_TIMEOUT};
use crate::{Error, Result};
use std::time::Duration;

const MIN_API_KEY_CHARS: usize = 10;

#[derive(Debug, Clone, Copy)]
pub struct AssistantConfig {
    /// Bound on every external call: moderation, tool searches, reasoning
    pub timeout: Duration,
    pub k: usize,
    pub grounding: GroundingPolicy,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            k: DEFAULT_K,
            grounding: GroundingPolicy::RequireAll,
        }
    }
}

/// Reject a missing or obviously truncated provider key
pub fn check_api_key(key: Option<&str>) -> Result<&str> {
    match key.map(str::trim) {
        None | Some("") => Err(Error::InvalidConfig("OPENAI_API_KEY is not set".to_string())),
        Some(k) if k.chars().count() < MIN_API_KEY_CHARS => {
            Err(Error::InvalidConfig("OPENAI_API_KEY is too short".to_string()))
        }
        Some(k) => Ok(k),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_api_key() {
        let err = check_api_key(None).unwrap_err();
        assert_eq!(err.to_string(), "Invalid configuration: OPENAI_API_KEY is not set");
        assert!(check_api_key(Some("  ")).is_err());

        let err = check_api_key(Some("sk-123")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid configuration: OPENAI_API_KEY is too short");

        assert_eq!(check_api_key(Some("sk-1234567890")).unwrap(), "sk-1234567890");
    }

    #[test]
    fn test_defaults() {
        let config = AssistantConfig::default();
        assert_eq!(config.k, 5);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.grounding, GroundingPolicy::RequireAll);
    }
}
