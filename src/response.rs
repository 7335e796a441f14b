use crate::error::Result;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use std::borrow::Cow;

/// A fully buffered HTTP response.
///
/// The body is read once when the response comes back from the transport, so
/// callers can inspect it any number of times without consuming anything.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Response {
    /// Buffers the body of a transport response.
    pub(crate) async fn read(raw: reqwest::Response) -> Result<Self> {
        let status = raw.status();
        let headers = raw.headers().clone();
        let body = raw.bytes().await?.to_vec();

        Ok(Self {
            status,
            headers,
            body,
        })
    }

    #[cfg(test)]
    pub(crate) fn from_parts(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers, with case-insensitive name lookup.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// The body as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}
