//! Request descriptors: an immutable description of one outbound call.
//!
//! A [`Request`] is built once through [`RequestBuilder`] and never mutated
//! afterwards, so a single descriptor can be shared freely across concurrent
//! calls.

use crate::params::ParameterEncoding;
use crate::Error;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use indexmap::IndexMap;
use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// The body attached to an outgoing request.
///
/// Text is sent as-is without a content-type override, bytes are sent as an
/// opaque entity, and a JSON value is serialized with `Accept` and
/// `Content-Type` forced to `application/json`.
#[derive(Debug, Clone)]
pub enum Body {
    /// Raw text, transmitted verbatim.
    Text(String),
    /// Raw bytes, transmitted as an opaque entity.
    Bytes(Vec<u8>),
    /// A structured value, serialized as JSON on dispatch.
    Json(serde_json::Value),
}

/// Request-scoped context handed to the transport layer out-of-band.
///
/// Attributes are never serialized into the wire request. They ride along on
/// the outgoing request's extensions so transport-side instrumentation (for
/// example per-call tracing middleware) can pick them up.
#[derive(Clone, Default)]
pub struct Attributes(HashMap<String, Arc<dyn Any + Send + Sync>>);

impl Attributes {
    /// Stores a value under `key`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Any + Send + Sync) {
        self.0.insert(key.into(), Arc::new(value));
    }

    /// Looks up the value stored under `key`, downcast to `V`.
    ///
    /// Returns `None` when the key is absent or holds a different type.
    pub fn get<V: Any + Send + Sync>(&self, key: &str) -> Option<&V> {
        self.0.get(key).and_then(|value| value.downcast_ref())
    }

    /// Returns `true` when no attributes are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}

/// An immutable description of one outbound REST call.
///
/// The type parameter `T` is the expected response type; it is only used to
/// drive response decoding. Use [`NoContent`](crate::NoContent) as `T` when
/// the response body is not interesting.
///
/// # Examples
///
/// ```
/// use http::Method;
/// use restcall::{ParameterEncoding, Request};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct User {
///     name: String,
/// }
///
/// # fn example() -> Result<(), restcall::Error> {
/// let request = Request::<User>::builder(Method::GET)
///     .path("/users/123")
///     .parameter("expand", "profile")
///     .parameter_values("fields", ["name", "email"])
///     .parameter_encoding(ParameterEncoding::Duplicate)
///     .header("X-Request-Source", "billing")?
///     .build();
/// # let _ = request;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Request<T> {
    method: Method,
    path: String,
    body: Option<Body>,
    parameters: IndexMap<String, Vec<String>>,
    headers: HeaderMap,
    attributes: Attributes,
    parameter_encoding: ParameterEncoding,
    response_type: PhantomData<fn() -> T>,
}

impl<T> Request<T> {
    /// Starts building a request for the given HTTP method.
    ///
    /// Any standard verb works, and so does an extension method accepted by
    /// [`http::Method`].
    pub fn builder(method: Method) -> RequestBuilder<T> {
        RequestBuilder::new(method)
    }

    /// The HTTP method to execute.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request path, relative to the client's base URL.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The request body, if any.
    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// The query parameters, in insertion order.
    pub fn parameters(&self) -> &IndexMap<String, Vec<String>> {
        &self.parameters
    }

    /// The additional headers sent with this request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The out-of-band attributes passed to the transport.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// How multi-valued parameters are encoded into the query string.
    pub fn parameter_encoding(&self) -> ParameterEncoding {
        self.parameter_encoding
    }
}

impl<T> Clone for Request<T> {
    fn clone(&self) -> Self {
        Self {
            method: self.method.clone(),
            path: self.path.clone(),
            body: self.body.clone(),
            parameters: self.parameters.clone(),
            headers: self.headers.clone(),
            attributes: self.attributes.clone(),
            parameter_encoding: self.parameter_encoding,
            response_type: PhantomData,
        }
    }
}

/// Builder for [`Request`].
///
/// Setters that validate their input (`header`, `json_body`) return a
/// `Result`; everything else is infallible and chains directly.
#[derive(Debug)]
pub struct RequestBuilder<T> {
    method: Method,
    path: String,
    body: Option<Body>,
    parameters: IndexMap<String, Vec<String>>,
    headers: HeaderMap,
    attributes: Attributes,
    parameter_encoding: ParameterEncoding,
    response_type: PhantomData<fn() -> T>,
}

impl<T> RequestBuilder<T> {
    fn new(method: Method) -> Self {
        Self {
            method,
            path: String::new(),
            body: None,
            parameters: IndexMap::new(),
            headers: HeaderMap::new(),
            attributes: Attributes::default(),
            parameter_encoding: ParameterEncoding::default(),
            response_type: PhantomData,
        }
    }

    /// Sets the request path. A leading slash is optional.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Attaches a raw text body, transmitted as-is.
    pub fn text_body(mut self, text: impl Into<String>) -> Self {
        self.body = Some(Body::Text(text.into()));
        self
    }

    /// Attaches a raw byte body, transmitted as an opaque entity.
    pub fn bytes_body(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.body = Some(Body::Bytes(bytes.into()));
        self
    }

    /// Attaches a structured body, serialized to JSON.
    ///
    /// The value is serialized eagerly so a broken `Serialize` impl surfaces
    /// here rather than mid-dispatch.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented as JSON.
    pub fn json_body(mut self, value: &impl Serialize) -> Result<Self, Error> {
        let value = serde_json::to_value(value).map_err(Error::BodySerialization)?;
        self.body = Some(Body::Json(value));
        Ok(self)
    }

    /// Adds a single-valued query parameter.
    ///
    /// Setting the same key again replaces its values but keeps the key's
    /// original position in the query string.
    pub fn parameter(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameter_values(key, [value.into()])
    }

    /// Adds a multi-valued query parameter.
    ///
    /// How the values appear in the query string depends on the
    /// [`ParameterEncoding`] of the request.
    pub fn parameter_values<V>(
        mut self,
        key: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self
    where
        V: Into<String>,
    {
        self.parameters
            .insert(key.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Adds several parameters at once, preserving iteration order.
    pub fn parameters(
        mut self,
        parameters: impl IntoIterator<Item = (String, Vec<String>)>,
    ) -> Self {
        self.parameters.extend(parameters);
        self
    }

    /// Adds a header. Setting the same name again overwrites the value.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self, Error> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::Configuration(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::Configuration(format!("Invalid header value: {}", e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Adds an out-of-band attribute for the transport layer.
    ///
    /// Attributes never appear in the wire request.
    pub fn attribute(mut self, key: impl Into<String>, value: impl Any + Send + Sync) -> Self {
        self.attributes.insert(key, value);
        self
    }

    /// Selects the query parameter encoding. Defaults to
    /// [`ParameterEncoding::Overwrite`].
    pub fn parameter_encoding(mut self, encoding: ParameterEncoding) -> Self {
        self.parameter_encoding = encoding;
        self
    }

    /// Finalizes the descriptor.
    pub fn build(self) -> Request<T> {
        Request {
            method: self.method,
            path: self.path,
            body: self.body,
            parameters: self.parameters,
            headers: self.headers,
            attributes: self.attributes,
            parameter_encoding: self.parameter_encoding,
            response_type: PhantomData,
        }
    }
}
