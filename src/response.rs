//! The successful result of a REST call.

use http::StatusCode;

/// A successful response: the HTTP status code paired with the decoded
/// value.
///
/// Only constructed for responses with a status below 400; the value is
/// always present. A 2xx whose body cannot be decoded surfaces as a
/// conversion error instead of an envelope with a placeholder value.
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
/// let client = RestClient::builder()
///     .base_url("https://api.example.com")?
///     .build()?;
///
/// let response = client.get::<User>("/users/123").await?;
/// println!("Status: {}", response.status);
/// println!("User: {}", response.value.name);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The decoded response value.
    pub value: T,
}

impl<T> Response<T> {
    /// Creates a new `Response`.
    pub fn new(status: StatusCode, value: T) -> Self {
        Self { status, value }
    }

    /// Consumes the envelope, returning the decoded value.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Maps the decoded value to a different type, keeping the status.
    ///
    /// # Examples
    ///
    /// ```
    /// # use restcall::Response;
    /// # use http::StatusCode;
    /// let response = Response::new(StatusCode::OK, 42);
    /// let text = response.map(|n| n.to_string());
    /// assert_eq!(text.value, "42");
    /// assert_eq!(text.status, StatusCode::OK);
    /// ```
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            status: self.status,
            value: f(self.value),
        }
    }
}

impl<T> AsRef<T> for Response<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}
