use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Embedding backend unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid embedding response: {0}")]
    InvalidResponse(String),

    #[error("Invalid embedding configuration: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Error::InvalidResponse(e.to_string())
        } else {
            Error::Unavailable(e.to_string())
        }
    }
}
