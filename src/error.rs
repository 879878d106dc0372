use thiserror::Error;

pub type Result<T> = std::result::Result<T, CarsxeError>;

#[derive(Error, Debug)]
pub enum CarsxeError {
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("HTTP error: {0}")]
    Transport(String),
    #[error("non-2xx response ({status}): {body}")]
    Status { status: u16, body: String },
    #[error("decode error: {source} (body={body})")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },
    #[error("encode error: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("{0} required")]
    MissingArgument(&'static str),
    #[error("request cancelled")]
    Cancelled,
    #[error("configuration error: {0}")]
    Config(String),
}

impl CarsxeError {
    /// HTTP status of the response, when the server answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body attached to status and decode failures.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } | Self::Decode { body, .. } => Some(body),
            _ => None,
        }
    }
}
