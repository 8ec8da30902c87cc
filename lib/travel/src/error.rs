use crate::safety::QueryRejection;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid duration format: {0}")]
    InvalidDurationFormat(String),

    #[error("No valid duration found in: {0}")]
    NoDurationComponents(String),

    #[error("Malformed record field '{field}': {reason}")]
    MalformedRecord { field: String, reason: String },

    #[error("Record store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Moderation service unavailable: {0}")]
    ModerationUnavailable(String),

    #[error("Recommendations are not valid: {0}")]
    UngroundedRecommendation(String),

    #[error("{}", .0.message())]
    UnsafeQuery(QueryRejection),

    #[error("Reasoning failed: {0}")]
    Reasoning(String),

    #[error("{0} timed out")]
    Timeout(String),

    #[error("Seed data error: {0}")]
    Seed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Core(#[from] wayfarer_core::Error),
}

impl Error {
    pub(crate) fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedRecord {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Failures caused by the request itself rather than by the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::UnsafeQuery(_) | Error::UngroundedRecommendation(_))
    }
}

impl From<wayfarer_embedding::Error> for Error {
    fn from(e: wayfarer_embedding::Error) -> Self {
        match e {
            wayfarer_embedding::Error::InvalidConfig(msg) => Error::InvalidConfig(msg),
            other => Error::StoreUnavailable(other.to_string()),
        }
    }
}
