//! A lightweight HTTP client facade: every request is logged at debug level,
//! unsuccessful status codes turn into typed errors unless the caller opts
//! out, and file downloads render a progress bar when the total size is
//! known.

pub mod client;
pub mod error;
pub mod logging;
pub mod options;
pub mod response;

pub use client::HttpClient;
pub use error::{Error, Result};
pub use logging::{ConsoleLogger, Logger, Progress, initialize_logging};
pub use options::RequestOptions;
pub use response::Response;

pub use reqwest::Method;
pub use tokio_util::sync::CancellationToken;

#[cfg(test)]
pub mod test_helpers;
