//! Picking one candidate per domain.

use crate::advice::Recommendation;
use crate::store::Candidate;
use crate::{Error, Result};
use serde_json::Value;

/// Highest score wins; on equal scores the earlier candidate is kept
pub fn best_candidate(candidates: &[Candidate]) -> Option<&Candidate> {
    candidates.iter().fold(None, |best, candidate| match best {
        Some(current) if current.score >= candidate.score => Some(current),
        _ => Some(candidate),
    })
}

/// Reshape a candidate's metadata into a recommendation without editing it
pub fn recommend<R: Recommendation>(candidate: &Candidate) -> Result<R> {
    serde_json::from_value(Value::Object(candidate.metadata().clone())).map_err(|e| Error::MalformedRecord {
        field: R::DOMAIN.as_str().to_string(),
        reason: format!("candidate {} cannot be reshaped: {}", candidate.document.id, e),
    })
}

/// The recommendation for one domain, `None` when no candidate survived
pub fn select<R: Recommendation>(candidates: &[Candidate]) -> Result<Option<R>> {
    best_candidate(candidates).map(recommend::<R>).transpose()
}
