use crate::error::{Error, Result};
use crate::logging::{Logger, Progress};
use crate::options::RequestOptions;
use crate::response::Response;
use futures_util::{Stream, StreamExt};
use reqwest::header::{CONTENT_LENGTH, HeaderMap};
use reqwest::{Client, Method};
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

/// A lightweight wrapper around a [`reqwest::Client`] with additional logging.
///
/// Every request is logged at debug level before dispatch, and any response
/// with a status code outside [200, 300) is logged and, unless the caller
/// opted out via [`RequestOptions::with_raise_for_status`], turned into
/// [`Error::Status`].
pub struct HttpClient {
    client: Client,
    logger: Arc<dyn Logger>,
    cancel: CancellationToken,
}

impl HttpClient {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self::with_cancellation(logger, CancellationToken::new())
    }

    /// Builds a client whose in-flight downloads stop when `cancel` fires.
    pub fn with_cancellation(logger: Arc<dyn Logger>, cancel: CancellationToken) -> Self {
        let client = Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            logger,
            cancel,
        }
    }

    /// Issues a GET request.
    ///
    /// An error is returned if the response is unsuccessful unless
    /// `options.raise_for_status` is false.
    pub async fn get(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::GET, url, options).await
    }

    /// Issues a POST request.
    ///
    /// An error is returned if the response is unsuccessful unless
    /// `options.raise_for_status` is false.
    pub async fn post(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::POST, url, options).await
    }

    /// Issues a request with an arbitrary verb. [`Self::get`] and
    /// [`Self::post`] delegate here.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<Response> {
        self.log_request(&method, url, &options);

        let raise_for_status = options.raise_for_status;
        let raw = self.dispatch(method, url, &options).await?;
        let response = Response::read(raw).await?;

        self.check_response(response, raise_for_status)
    }

    /// Downloads a file and shows a progress bar when possible.
    ///
    /// The body is streamed straight to `output_path`, truncating any
    /// existing file. If the cancellation token fires mid-stream the
    /// progress bar is stopped, [`Error::Cancelled`] is returned and the
    /// partially written file is left on disk as-is.
    pub async fn download_file(&self, url: &str, output_path: &Path) -> Result<()> {
        let options = RequestOptions::new();
        self.log_request(&Method::GET, url, &options);

        let raw = self.dispatch(Method::GET, url, &options).await?;
        if !raw.status().is_success() {
            let response = Response::read(raw).await?;
            self.log_unsuccessful_response(&response);
            return Err(Error::Status(Box::new(response)));
        }

        // Content length isn't always set; skip the progress bar in that case.
        let total_size_bytes = content_length(raw.headers());
        let progress = (total_size_bytes > 0).then(|| self.logger.progress());

        let mut file = tokio::fs::File::create(output_path).await?;
        let result = self
            .write_chunks(
                raw.bytes_stream(),
                &mut file,
                total_size_bytes,
                progress.as_deref(),
            )
            .await;

        match &result {
            Ok(()) | Err(Error::Cancelled) => {
                if let Some(progress) = &progress {
                    progress.stop();
                }
            }
            Err(_) => {}
        }

        result
    }

    /// Logs an unsuccessful response's status code and body.
    ///
    /// Public so callers that disable `raise_for_status` can still get the
    /// standard diagnostic line on demand.
    pub fn log_unsuccessful_response(&self, response: &Response) {
        let text = response.text();
        let body = if text.is_empty() {
            "empty body".to_string()
        } else {
            format!("body:\n{text}")
        };

        self.logger.debug(&format!(
            "Request was not successful, status code {}, {body}",
            response.status().as_u16()
        ));
    }

    fn log_request(&self, method: &Method, url: &str, options: &RequestOptions) {
        let mut message = format!("--> {method} {url}");
        if let Some(payload) = options.loggable_payload() {
            message.push_str(&format!(" with data:\n{payload}"));
        }

        self.logger.debug(&message);
    }

    async fn dispatch(
        &self,
        method: Method,
        url: &str,
        options: &RequestOptions,
    ) -> Result<reqwest::Response> {
        let mut builder = self.client.request(method, url);
        if !options.headers.is_empty() {
            builder = builder.headers(options.headers.clone());
        }
        if let Some(params) = &options.params {
            builder = builder.query(params);
        }
        if let Some(form) = &options.form {
            builder = builder.form(form);
        }
        if let Some(json) = &options.json {
            builder = builder.json(json);
        }

        Ok(builder.send().await?)
    }

    /// Logs a debug message if the response wasn't successful, then either
    /// fails with the response or hands it back, per `raise_for_status`.
    fn check_response(&self, response: Response, raise_for_status: bool) -> Result<Response> {
        if !response.status().is_success() {
            self.log_unsuccessful_response(&response);
            if raise_for_status {
                return Err(Error::Status(Box::new(response)));
            }
        }

        Ok(response)
    }

    async fn write_chunks<S, B>(
        &self,
        mut stream: S,
        file: &mut tokio::fs::File,
        total_size_bytes: u64,
        progress: Option<&dyn Progress>,
    ) -> Result<()>
    where
        S: Stream<Item = reqwest::Result<B>> + Unpin,
        B: AsRef<[u8]>,
    {
        let mut written_bytes = 0u64;

        loop {
            let chunk = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    // Make sure the bytes received so far reach the disk
                    // before the partial file is handed back to the caller.
                    file.flush().await?;
                    return Err(Error::Cancelled);
                }
                chunk = stream.next() => match chunk {
                    Some(chunk) => chunk?,
                    None => break,
                },
            };

            file.write_all(chunk.as_ref()).await?;

            if let Some(progress) = progress {
                written_bytes += chunk.as_ref().len() as u64;
                progress.update((written_bytes as f64 / total_size_bytes as f64) * 100.0);
            }
        }

        file.flush().await?;
        Ok(())
    }
}

fn content_length(headers: &HeaderMap) -> u64 {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}
