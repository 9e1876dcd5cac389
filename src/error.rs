//! Error types for REST calls.
//!
//! Failures are classified into a small taxonomy: the transport timed out,
//! the transport failed some other way, the server answered with an error
//! status, or the response body could not be converted to the expected
//! type. Every kind keeps enough context for programmatic inspection, and a
//! response failure can re-run body conversion after the fact.

use crate::convert;
use http::StatusCode;
use serde::de::DeserializeOwned;

/// The main error type for REST calls.
///
/// # Examples
///
/// ```no_run
/// use restcall::{Error, RestClient};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct ApiError {
///     value: String,
/// }
///
/// # async fn example() -> Result<(), Error> {
/// # let client = RestClient::builder().base_url("https://api.example.com")?.build()?;
/// match client.get::<serde_json::Value>("/endpoint").await {
///     Ok(response) => println!("Success: {:?}", response.value),
///     Err(Error::Response(response)) => {
///         eprintln!("Server said {}: {}", response.status, response.body);
///         // A typed view of the error body, without re-issuing the call.
///         if let Ok(detail) = response.decode_body::<ApiError>() {
///             eprintln!("Detail: {}", detail.value);
///         }
///     }
///     Err(Error::Timeout { url, .. }) => eprintln!("Timed out calling {}", url),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The transport did not respond within the configured timeout.
    ///
    /// Covers both connect and read timeouts. Never retried internally.
    #[error("The API did not respond within the configured timeout for URL {url}")]
    Timeout {
        /// The fully built request URL.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// Any other I/O-level failure reaching the transport (connection
    /// refused, reset, malformed response framing).
    #[error("Failed to retrieve the requested data from the API for URL {url}")]
    Transport {
        /// The fully built request URL.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The server responded with status >= 400.
    #[error(transparent)]
    Response(#[from] ResponseError),

    /// The response arrived but its body could not be converted to the
    /// expected type.
    #[error(transparent)]
    Conversion(#[from] ConvertError),

    /// The request body could not be serialized to JSON.
    #[error("Failed to serialize the request body to JSON: {0}")]
    BodySerialization(#[source] serde_json::Error),

    /// An invalid URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Invalid configuration was provided, such as a bad header value.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Returns the HTTP status code if this error carries one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Response(response) => Some(response.status),
            _ => None,
        }
    }

    /// Returns the response failure payload, if this is one.
    pub fn response(&self) -> Option<&ResponseError> {
        match self {
            Error::Response(response) => Some(response),
            _ => None,
        }
    }
}

/// A non-2xx response from the server, kept raw for later inspection.
///
/// The body is not decoded when the error is raised; call
/// [`decode_body`](ResponseError::decode_body) to get a typed view of it on
/// demand.
#[derive(Debug, Clone, thiserror::Error)]
#[error(
    "Failed to perform REST call: got back {} {} with content type {} and body {body}",
    .status.as_u16(),
    .status.canonical_reason().unwrap_or("unknown"),
    .content_type.as_deref().unwrap_or("none")
)]
pub struct ResponseError {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The response's content type header, if present.
    pub content_type: Option<String>,
    /// The raw response body text.
    pub body: String,
}

impl ResponseError {
    /// The reason phrase for the status code, e.g. `"Not Found"` for 404.
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("unknown")
    }

    /// Re-runs body conversion against the stored body and content type.
    ///
    /// Useful for extracting a typed error payload without re-issuing the
    /// call. Conversion follows the same rules as a live response.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::ErrorBody`], which chains the conversion
    /// failure and keeps this response failure inspectable alongside it.
    pub fn decode_body<T>(&self) -> std::result::Result<T, ConvertError>
    where
        T: DeserializeOwned + 'static,
    {
        convert::convert(&self.body, self.content_type.as_deref()).map_err(|source| {
            ConvertError::ErrorBody {
                source: Box::new(source),
                response: Box::new(self.clone()),
            }
        })
    }
}

/// A response body that could not be converted to the expected type.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The response body was empty but the expected type requires one.
    #[error("Response body is absent, though required for {target}")]
    BodyMissing {
        /// Name of the expected response type.
        target: &'static str,
    },

    /// No converter claimed the body/content-type/target combination.
    #[error("Unable to convert response {body} with content type {content_type:?} to {target}")]
    NoConverter {
        /// A snippet of the response body.
        body: String,
        /// The response's content type, if present.
        content_type: Option<String>,
        /// Name of the expected response type.
        target: &'static str,
    },

    /// The body was claimed as JSON but is malformed for the target type.
    #[error("Failed to decode JSON response body {body}: {source}")]
    Json {
        /// A snippet of the response body.
        body: String,
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// The body was claimed as XML but is malformed for the target type.
    #[error("Failed to decode XML response body {body}: {source}")]
    Xml {
        /// A snippet of the response body.
        body: String,
        /// The underlying decode error.
        #[source]
        source: quick_xml::DeError,
    },

    /// Re-decoding a stored error body failed.
    ///
    /// Both the conversion failure (`source`) and the original response
    /// failure (`response`) remain inspectable.
    #[error("Unable to convert the error response body to the requested type")]
    ErrorBody {
        /// Why the stored body could not be converted.
        #[source]
        source: Box<ConvertError>,
        /// The response failure whose body was being decoded.
        response: Box<ResponseError>,
    },
}

/// Bounds a body for inclusion in an error message.
pub(crate) fn snippet(body: &str) -> String {
    const MAX_CHARS: usize = 200;
    let mut out: String = body.chars().take(MAX_CHARS).collect();
    if out.len() < body.len() {
        out.push_str("...");
    }
    out
}

/// A specialized `Result` type for REST calls.
pub type Result<T> = std::result::Result<T, Error>;
