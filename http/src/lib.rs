#![allow(clippy::result_large_err)]
//! Convenience HTTP request handlers that use ureq underneath in order to ensure safe usage
//! when reading the body and reducing boilerplate.
//!
//! The [`Client`] owns the retry policy: transient failures (429, 5xx and
//! connection-level transport errors) are retried with exponential backoff, everything
//! else surfaces immediately.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use std::io::Read;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
pub use ureq;
use ureq::{ErrorKind, Response};
pub use url;
use url::Url;

/// Errors that may arise during an http request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP status error.
    #[error("Http: {0}")]
    Http(u16, Response),
    /// HTTP Transport error.
    #[error("Transport: {0}")]
    Transport(ureq::Transport),
    /// Json serialization or deserialization error.
    #[error("Json Serialization: {0}")]
    Json(#[from] serde_json::Error),
    /// IO Error
    #[error("IO: {0}")]
    IO(#[from] io::Error),
    /// Parsing or manipulation of Urls.
    #[error("Url: {0}")]
    Url(#[from] url::ParseError),
    /// Unexpected use case.
    #[error("Unexpected: {0}")]
    Unexpected(anyhow::Error),
}

impl From<ureq::Error> for Error {
    fn from(value: ureq::Error) -> Self {
        match value {
            ureq::Error::Status(code, response) => Self::Http(code, response),
            ureq::Error::Transport(t) => Self::Transport(t),
        }
    }
}

impl Error {
    /// Whether the request that produced this error may be repeated.
    ///
    /// Retriability is decided here, at the point the error is constructed: rate
    /// limiting (429), server errors (5xx) and connection-level transport failures
    /// qualify, all other client errors do not.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Http(code, _) => *code == 429 || (500..600).contains(code),
            Self::Transport(err) => matches!(
                err.kind(),
                ErrorKind::Dns | ErrorKind::ConnectionFailed | ErrorKind::Io
            ),
            _ => false,
        }
    }

    /// HTTP status code of the error, if the server produced one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        if let Self::Http(code, _) = self {
            Some(*code)
        } else {
            None
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// How to process the response.
pub trait FromResponse {
    /// Result of processing the response.
    type Output;
    /// Process the response from the server.
    ///
    /// This function will only be called if the server did not return an error status.
    ///
    /// # Errors
    /// Should return error if the operation failed.
    fn from_response(response: ureq::Response) -> Result<Self::Output>;
}

/// This response handler does not perform any processing on the response from the server
/// if the request succeeded.
pub struct NoResponse {}

impl FromResponse for NoResponse {
    type Output = ();
    fn from_response(_: ureq::Response) -> Result<Self::Output> {
        Ok(())
    }
}

/// This response handler deserializes the body into a json type `T` from the server response.
pub struct JsonResponse<T: DeserializeOwned>(PhantomData<T>);

impl<T: DeserializeOwned> FromResponse for JsonResponse<T> {
    type Output = T;
    fn from_response(response: ureq::Response) -> Result<Self::Output> {
        let body = response.into_safe_reader();
        Ok(serde_json::from_reader(body)?)
    }
}

/// Response handler for endpoints that may legitimately produce nothing.
///
/// Empty bodies, `204` and non-json content types resolve to `None`. Malformed json on
/// a response declared as json is still an [`Error::Json`], not silently swallowed.
pub struct OptionalJsonResponse<T: DeserializeOwned>(PhantomData<T>);

impl<T: DeserializeOwned> FromResponse for OptionalJsonResponse<T> {
    type Output = Option<T>;
    fn from_response(response: ureq::Response) -> Result<Self::Output> {
        if response.status() == 204 {
            return Ok(None);
        }

        let content_type = response.content_type();
        if content_type != "application/json" && content_type != "application/ld+json" {
            return Ok(None);
        }

        let mut body = String::new();
        response.into_safe_reader().read_to_string(&mut body)?;
        if body.is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&body)?))
    }
}

/// This response handler reads the raw response body, bypassing json parsing entirely.
pub struct BytesResponse {}

impl FromResponse for BytesResponse {
    type Output = Vec<u8>;

    fn from_response(response: Response) -> Result<Self::Output> {
        let mut result = Vec::new();
        response.into_safe_reader().read_to_end(&mut result)?;
        Ok(result)
    }
}

/// HTTP method for the request.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Method {
    Delete,
    Get,
    Patch,
    Post,
    Put,
}

/// Defines an Http Request.
pub trait Request {
    /// How the response should be handled.
    type Response: FromResponse;

    /// Http Method.
    const METHOD: Method;

    /// The relative url of the request without query components.
    fn url(&self) -> String;

    /// Build the request.
    ///
    /// Query parameters, headers and body should be set here.
    ///
    /// # Errors
    /// Returns error if building the operation failed.
    fn build(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        Ok(builder)
    }
}

pub struct RequestBuilder {
    request: ureq::Request,
    body: Option<Vec<u8>>,
}

impl RequestBuilder {
    fn new(request: ureq::Request) -> Self {
        Self {
            request,
            body: None,
        }
    }

    /// Set a header with `key` and `value`.
    #[must_use]
    pub fn header(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.request = self.request.set(key.as_ref(), value.as_ref());
        self
    }

    /// Set bearer authentication `token`.
    #[must_use]
    pub fn bearer_token(self, token: impl AsRef<str>) -> Self {
        self.header("Authorization", format!("Bearer {}", token.as_ref()))
    }

    /// Set the body as a serialized json object.
    ///
    /// # Panics
    /// Will panic if the type can not be serialized to json.
    #[must_use]
    pub fn json(mut self, value: impl Serialize) -> Self {
        let bytes = serde_json::to_vec(&value).expect("Failed to serialize json");
        self.body = Some(bytes);
        self.header("Content-Type", "application/json")
    }

    /// Set a query parameter with `key` and `value`.
    #[must_use]
    pub fn query(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.request = self.request.query(key.as_ref(), value.as_ref());
        self
    }
}

/// Total number of attempts before a retriable error is surfaced.
pub const MAX_ATTEMPTS: u32 = 5;

/// Base delay of the exponential backoff schedule.
pub const RETRY_BASE_DELAY: Duration = Duration::from_millis(1500);

/// Delay before retry attempt `attempt` (1-based, the first attempt has no delay).
///
/// With the default base this produces 1.5s, 3s, 6s and 12s before attempts 2-5.
#[must_use]
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base * 2u32.saturating_pow(attempt.saturating_sub(2))
}

/// Http client builder.
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Url,
    request_timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    user_agent: String,
    allow_http: bool,
    retry_base_delay: Duration,
}

impl ClientBuilder {
    fn new(base_url: Url) -> Self {
        Self {
            user_agent: "NoClient/0.1.0".to_string(),
            base_url,
            request_timeout: None,
            connect_timeout: None,
            allow_http: false,
            retry_base_delay: RETRY_BASE_DELAY,
        }
    }

    /// Set the user agent to be submitted with every request.
    #[must_use]
    pub fn user_agent(mut self, agent: &str) -> Self {
        self.user_agent = agent.to_string();
        self
    }

    /// Set the full request timeout. By default there is no timeout.
    #[must_use]
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the connection timeout. By default there is no timeout.
    #[must_use]
    pub fn connect_timeout(mut self, duration: Duration) -> Self {
        self.connect_timeout = Some(duration);
        self
    }

    /// Base delay for the retry backoff schedule.
    #[must_use]
    pub fn retry_base_delay(mut self, duration: Duration) -> Self {
        self.retry_base_delay = duration;
        self
    }

    /// Allow http request
    #[must_use]
    pub fn allow_http(mut self) -> Self {
        self.allow_http = true;
        self
    }

    /// Create the client.
    ///
    /// # Errors
    /// Returns error if the construction failed.
    pub fn build(self) -> Result<Arc<Client>> {
        let mut builder = ureq::AgentBuilder::new();

        if let Some(d) = self.request_timeout {
            builder = builder.timeout(d);
        }

        if let Some(d) = self.connect_timeout {
            builder = builder.timeout_connect(d);
        }

        if !self.allow_http {
            builder = builder.https_only(true);
        }

        let agent = builder
            .user_agent(&self.user_agent)
            .max_idle_connections(0)
            .max_idle_connections_per_host(0)
            .build();

        Ok(Arc::new(Client {
            agent,
            base_url: self.base_url,
            retry_base_delay: self.retry_base_delay,
        }))
    }
}

/// HTTP Client on which to execute requests.
///
/// All request executed on this client will be appended to the base url.
pub struct Client {
    agent: ureq::Agent,
    base_url: Url,
    retry_base_delay: Duration,
}

impl Client {
    /// Create a new builder with the given `base_url`.
    #[must_use]
    pub fn builder(base_url: Url) -> ClientBuilder {
        ClientBuilder::new(base_url)
    }

    /// The base url in use by the client.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Execute the request, retrying transient failures.
    ///
    /// Up to [`MAX_ATTEMPTS`] attempts are made; the delay before attempt `k` doubles
    /// starting from the configured base delay. Non-retriable errors and exhausted
    /// retries surface the last error unchanged.
    ///
    /// # Errors
    /// Returns an error if the request construction, execution or response handling failed.
    pub fn execute<R: Request>(
        &self,
        request: &R,
    ) -> Result<<R::Response as FromResponse>::Output> {
        let mut attempt = 1;
        loop {
            match self.execute_once(request) {
                Ok(v) => return Ok(v),
                Err(e) if e.is_retriable() && attempt < MAX_ATTEMPTS => {
                    attempt += 1;
                    let delay = backoff_delay(self.retry_base_delay, attempt);
                    warn!(
                        "Request to {} failed ({e}), retrying in {delay:?} (attempt {attempt}/{MAX_ATTEMPTS})",
                        request.url()
                    );
                    std::thread::sleep(delay);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Execute the request exactly once.
    ///
    /// This is just a thin wrapper around [`ureq::Request`] that executes the correct
    /// function depending on whether the request has a body or not.
    ///
    /// # Errors
    /// Returns an error if the request construction, execution or response handling failed.
    pub fn execute_once<R: Request>(
        &self,
        request: &R,
    ) -> Result<<R::Response as FromResponse>::Output> {
        let url = self.base_url.join(&request.url())?;
        let ureq_request = match R::METHOD {
            Method::Get => self.agent.get(url.as_str()),
            Method::Put => self.agent.put(url.as_str()),
            Method::Post => self.agent.post(url.as_str()),
            Method::Delete => self.agent.delete(url.as_str()),
            Method::Patch => self.agent.patch(url.as_str()),
        };

        let builder = request.build(RequestBuilder::new(ureq_request))?;

        let ureq_response = if let Some(body) = builder.body {
            builder.request.send_bytes(body.as_ref())?
        } else {
            builder.request.call()?
        };

        R::Response::from_response(ureq_response)
    }
}

/// Extension trait to read the body with safe upper limit.
pub trait ExtSafeResponse {
    /// Create a safe reader that reads up to a maximum number of bytes from the server.
    fn into_safe_reader(self) -> impl Read;
}

const MAX_BYTES_FROM_RESPONSE: u64 = 10_000_000;

impl ExtSafeResponse for ureq::Response {
    fn into_safe_reader(self) -> impl Read {
        self.into_reader().take(MAX_BYTES_FROM_RESPONSE)
    }
}
