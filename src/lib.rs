//! # Restcall - a typed outbound REST call layer
//!
//! Restcall shapes outbound REST calls on top of `reqwest`: a request is
//! described once as an immutable [`Request`] descriptor, executed against a
//! configured base URL, and the raw response body is converted into a typed
//! result based on its content type. Failures are classified into a small
//! taxonomy - timeout, transport error, non-2xx response, conversion error -
//! each carrying enough context for programmatic inspection.
//!
//! ## Quick Start
//!
//! ```no_run
//! use http::Method;
//! use restcall::{ParameterEncoding, Request, RestClient};
//! use serde::{Deserialize, Serialize};
//! use std::time::Duration;
//!
//! #[derive(Serialize)]
//! struct CreateUser {
//!     name: String,
//!     email: String,
//! }
//!
//! #[derive(Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), restcall::Error> {
//!     let client = RestClient::builder()
//!         .base_url("https://api.example.com")?
//!         .timeout(Duration::from_secs(30))
//!         .build()?;
//!
//!     // Convenience verbs for the common cases.
//!     let user = client.get::<User>("/users/123").await?;
//!     println!("User: {} (status {})", user.value.name, user.status);
//!
//!     let new_user = CreateUser {
//!         name: "Alice".to_string(),
//!         email: "alice@example.com".to_string(),
//!     };
//!     let created: restcall::Response<User> = client.post("/users", &new_user).await?;
//!     println!("Created user {}", created.value.id);
//!
//!     // Or a full descriptor when the call needs more shape.
//!     let request = Request::<User>::builder(Method::GET)
//!         .path("/users/search")
//!         .parameter_values("role", ["admin", "owner"])
//!         .parameter_encoding(ParameterEncoding::Duplicate)
//!         .header("X-Request-Source", "billing")?
//!         .build();
//!     let found = client.execute(&request).await?;
//!     println!("Found: {}", found.value.name);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Declarative requests** - an immutable, builder-constructed descriptor
//!   per call, safe to share across concurrent calls
//! - **Selectable query encoding** - three strategies for multi-valued
//!   parameters ([`ParameterEncoding`])
//! - **Content-type driven conversion** - an ordered converter chain decodes
//!   JSON, plain strings, and XML into the expected type; [`NoContent`]
//!   marks fire-and-forget calls
//! - **Classified failures** - timeout, transport, response, and conversion
//!   errors as distinct variants, never retried or swallowed internally
//! - **Inspectable error responses** - a non-2xx response keeps its raw body
//!   and can be decoded into a typed error payload after the fact
//! - **Structured logging** - per-call dispatch and elapsed-time events via
//!   `tracing`
//!
//! ## Error Handling
//!
//! ```no_run
//! use restcall::{Error, RestClient};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct ErrorDetail {
//!     value: String,
//! }
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = RestClient::builder().base_url("https://api.example.com")?.build()?;
//! match client.get::<serde_json::Value>("/endpoint").await {
//!     Ok(response) => println!("Success: {:?}", response.value),
//!     Err(Error::Response(response)) => {
//!         eprintln!("Got {} {}", response.status.as_u16(), response.status_text());
//!         if let Ok(detail) = response.decode_body::<ErrorDetail>() {
//!             eprintln!("Server detail: {}", detail.value);
//!         }
//!     }
//!     Err(Error::Timeout { url, .. }) => eprintln!("Timed out: {}", url),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```

mod client;
pub mod convert;
mod error;
mod params;
mod request;
mod response;

pub use client::{RestClient, RestClientBuilder};
pub use convert::NoContent;
pub use error::{ConvertError, Error, ResponseError, Result};
pub use params::ParameterEncoding;
pub use request::{Attributes, Body, Request, RequestBuilder};
pub use response::Response;
