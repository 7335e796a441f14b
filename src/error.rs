use crate::response::Response;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The response had a status code outside [200, 300) and the caller did
    /// not opt out of raising.
    #[error("request was not successful, status code {}", .0.status().as_u16())]
    Status(Box<Response>),

    #[error("download was cancelled")]
    Cancelled,

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode response body: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// The response carried by a [`Error::Status`] failure, if any.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Error::Status(response) => Some(response),
            _ => None,
        }
    }
}
