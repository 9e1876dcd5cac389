//! The call executor: builds the URL, dispatches the request, classifies
//! the outcome.
//!
//! The [`RestClient`] type is the main entry point for executing requests.
//! Use [`RestClientBuilder`] to configure and create clients.

use crate::error::ResponseError;
use crate::params;
use crate::request::{Body, Request};
use crate::{Error, Response, Result};
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::{form_urlencoded, Url};

/// A client for executing REST calls against one base URL.
///
/// The client is designed to be reused across many requests: it holds the
/// connection pool and the configuration that applies to every call it
/// issues. Cloning is cheap and shares the pool. Execution is sequential
/// per call; `execute` returns once the transport call completes or fails,
/// and nothing is retried internally.
///
/// # Examples
///
/// ```no_run
/// use http::Method;
/// use restcall::{Request, RestClient};
/// use serde::Deserialize;
/// use std::time::Duration;
///
/// #[derive(Deserialize)]
/// struct User {
///     name: String,
/// }
///
/// # async fn example() -> Result<(), restcall::Error> {
/// let client = RestClient::builder()
///     .base_url("https://api.example.com")?
///     .timeout(Duration::from_secs(30))
///     .build()?;
///
/// // Convenience form:
/// let user = client.get::<User>("/users/123").await?;
/// println!("User: {}", user.value.name);
///
/// // Full descriptor form:
/// let request = Request::<User>::builder(Method::GET)
///     .path("/users/123")
///     .parameter("expand", "profile")
///     .build();
/// let user = client.execute(&request).await?;
/// println!("Status: {}", user.status);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RestClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: Url,
    default_headers: HeaderMap,
}

impl RestClient {
    /// Creates a new `RestClientBuilder` for configuring a client.
    pub fn builder() -> RestClientBuilder {
        RestClientBuilder::new()
    }

    /// Executes a request descriptor and converts the response.
    ///
    /// The target URL is the client's base URL joined with the descriptor's
    /// path and encoded query string. The call runs to completion, success
    /// or failure; the outcome is classified as a timeout, a transport
    /// failure, a response failure (status >= 400, body kept raw), or a
    /// conversion failure (status < 400 but the body did not decode).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use http::Method;
    /// use restcall::{NoContent, Request, RestClient};
    ///
    /// # async fn example() -> Result<(), restcall::Error> {
    /// # let client = RestClient::builder().base_url("https://api.example.com")?.build()?;
    /// let request = Request::<NoContent>::builder(Method::DELETE)
    ///     .path("/sessions/current")
    ///     .build();
    /// let response = client.execute(&request).await?;
    /// println!("Deleted, status {}", response.status);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn execute<T>(&self, request: &Request<T>) -> Result<Response<T>>
    where
        T: DeserializeOwned + 'static,
    {
        let url = self.build_url(request)?;

        tracing::debug!(method = %request.method(), url = %url, "Dispatching HTTP request");

        let outgoing = self.build_http_request(request, &url)?;
        let started = Instant::now();
        let http_response = self
            .inner
            .http_client
            .execute(outgoing)
            .await
            .map_err(|source| classify_transport(&url, source))?;
        let elapsed = started.elapsed();

        let status = http_response.status();
        tracing::info!(
            status = status.as_u16(),
            elapsed_ms = elapsed.as_millis() as u64,
            url = %url,
            "Received HTTP response"
        );

        let content_type = http_response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);
        // An absent entity reads as an empty string.
        let body = http_response
            .text()
            .await
            .map_err(|source| classify_transport(&url, source))?;

        if status.as_u16() >= 400 {
            return Err(Error::Response(ResponseError {
                status,
                content_type,
                body,
            }));
        }

        let value = crate::convert::convert(&body, content_type.as_deref())?;
        Ok(Response::new(status, value))
    }

    /// Builds the target URL: base + "/" + path with its leading slash
    /// stripped + the encoded query string (nothing appended when there are
    /// no parameters).
    fn build_url<T>(&self, request: &Request<T>) -> Result<Url> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        let path = request.path().trim_start_matches('/');
        let mut target = format!("{base}/{path}");

        let pairs = params::encode_pairs(request.parameters(), request.parameter_encoding());
        if !pairs.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs)
                .finish();
            target.push('?');
            target.push_str(&query);
        }

        Url::parse(&target).map_err(Error::InvalidUrl)
    }

    /// Assembles the outgoing transport request: headers layered as
    /// defaults, then request headers, then the JSON body forcing; body
    /// attached per its kind; attributes passed along as extensions.
    fn build_http_request<T>(&self, request: &Request<T>, url: &Url) -> Result<reqwest::Request> {
        let mut headers = self.inner.default_headers.clone();
        for (name, value) in request.headers() {
            headers.insert(name, value.clone());
        }

        let mut builder = self
            .inner
            .http_client
            .request(request.method().clone(), url.clone());

        match request.body() {
            // Text goes out as-is, with no content-type override.
            Some(Body::Text(text)) => builder = builder.body(text.clone()),
            // Bytes are an opaque entity.
            Some(Body::Bytes(bytes)) => builder = builder.body(bytes.clone()),
            // A JSON body forces both negotiation headers, overriding any
            // caller-set values of the same name.
            Some(Body::Json(value)) => {
                headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                let body = serde_json::to_vec(value).map_err(Error::BodySerialization)?;
                builder = builder.body(body);
            }
            None => {}
        }

        let mut outgoing = builder
            .headers(headers)
            .build()
            .map_err(|source| classify_transport(url, source))?;

        // Attributes ride on the request extensions, never on the wire.
        if !request.attributes().is_empty() {
            // reqwest keeps `Request::extensions_mut` private, so the
            // extensions are reached through the public http::Request
            // round-trip. That conversion substitutes an empty body where
            // there was none, so the original body is restored afterward to
            // leave the wire request byte-for-byte unchanged.
            let had_no_body = outgoing.body().is_none();
            let mut parts: http::Request<reqwest::Body> = outgoing
                .try_into()
                .map_err(|source| classify_transport(url, source))?;
            parts.extensions_mut().insert(request.attributes().clone());
            outgoing = parts
                .try_into()
                .map_err(|source| classify_transport(url, source))?;
            if had_no_body {
                *outgoing.body_mut() = None;
            }
        }

        Ok(outgoing)
    }

    /// Executes a GET request for the given path.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use restcall::RestClient;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct User {
    ///     name: String,
    /// }
    ///
    /// # async fn example() -> Result<(), restcall::Error> {
    /// # let client = RestClient::builder().base_url("https://api.example.com")?.build()?;
    /// let user = client.get::<User>("/users/123").await?;
    /// println!("User: {}", user.value.name);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get<T>(&self, path: impl Into<String>) -> Result<Response<T>>
    where
        T: DeserializeOwned + 'static,
    {
        let request = Request::<T>::builder(Method::GET).path(path).build();
        self.execute(&request).await
    }

    /// Executes a POST request with a JSON body.
    pub async fn post<B, T>(&self, path: impl Into<String>, body: &B) -> Result<Response<T>>
    where
        B: Serialize,
        T: DeserializeOwned + 'static,
    {
        let request = Request::<T>::builder(Method::POST)
            .path(path)
            .json_body(body)?
            .build();
        self.execute(&request).await
    }

    /// Executes a PUT request with a JSON body.
    pub async fn put<B, T>(&self, path: impl Into<String>, body: &B) -> Result<Response<T>>
    where
        B: Serialize,
        T: DeserializeOwned + 'static,
    {
        let request = Request::<T>::builder(Method::PUT)
            .path(path)
            .json_body(body)?
            .build();
        self.execute(&request).await
    }

    /// Executes a DELETE request for the given path.
    ///
    /// Use [`NoContent`](crate::NoContent) as `T` when the response body is
    /// not interesting.
    pub async fn delete<T>(&self, path: impl Into<String>) -> Result<Response<T>>
    where
        T: DeserializeOwned + 'static,
    {
        let request = Request::<T>::builder(Method::DELETE).path(path).build();
        self.execute(&request).await
    }

    /// Executes a PATCH request with a JSON body.
    pub async fn patch<B, T>(&self, path: impl Into<String>, body: &B) -> Result<Response<T>>
    where
        B: Serialize,
        T: DeserializeOwned + 'static,
    {
        let request = Request::<T>::builder(Method::PATCH)
            .path(path)
            .json_body(body)?
            .build();
        self.execute(&request).await
    }
}

/// A transport-level failure is either a timeout (connect or read) or any
/// other I/O failure; both carry the fully built URL.
fn classify_transport(url: &Url, source: reqwest::Error) -> Error {
    if source.is_timeout() {
        Error::Timeout {
            url: url.to_string(),
            source,
        }
    } else {
        Error::Transport {
            url: url.to_string(),
            source,
        }
    }
}

/// Builder for configuring and creating a [`RestClient`].
///
/// # Examples
///
/// ```no_run
/// use restcall::RestClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), restcall::Error> {
/// let client = RestClientBuilder::new()
///     .base_url("https://api.example.com")?
///     .timeout(Duration::from_secs(30))
///     .default_header("User-Agent", "my-app/1.0")?
///     .build()?;
/// # let _ = client;
/// # Ok(())
/// # }
/// ```
pub struct RestClientBuilder {
    base_url: Option<Url>,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
}

impl RestClientBuilder {
    /// Creates a new `RestClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            base_url: None,
            default_headers: HeaderMap::new(),
            timeout: None,
        }
    }

    /// Sets the base URL all request paths are resolved against.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base_url = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Adds a default header included in every request.
    ///
    /// Per-request headers with the same name take precedence.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::Configuration(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::Configuration(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the transport timeout, applied uniformly to connection
    /// establishment and to the whole request.
    ///
    /// Without a timeout, a call runs as long as the transport lets it.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configured `RestClient`.
    ///
    /// # Errors
    ///
    /// Returns an error if no base URL was provided or if the transport
    /// cannot be initialized.
    pub fn build(self) -> Result<RestClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Configuration("Base URL is required".to_string()))?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout).connect_timeout(timeout);
        }
        let http_client = builder.build().map_err(|e| {
            Error::Configuration(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(RestClient {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                default_headers: self.default_headers,
            }),
        })
    }
}

impl Default for RestClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
