//! Example demonstrating the three query parameter encoding strategies.
//!
//! This example shows how the same multi-valued parameter map ends up in
//! the query string under each [`ParameterEncoding`]:
//! - `Overwrite` (default): only the first value per key
//! - `Duplicate`: the key repeated per value
//! - `IndexedArray`: `key[i]=value` once a key has two or more values
//!
//! Run with: `cargo run --example query_encoding`

use http::Method;
use restcall::{Error, ParameterEncoding, Request, RestClient};

#[derive(Debug, serde::Deserialize)]
#[allow(dead_code)]
struct EchoedArgs {
    args: serde_json::Value,
    url: String,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("restcall=info")
        .init();

    // httpbin echoes the query parameters it received back as JSON.
    let client = RestClient::builder().base_url("https://httpbin.org")?.build()?;

    for encoding in [
        ParameterEncoding::Overwrite,
        ParameterEncoding::Duplicate,
        ParameterEncoding::IndexedArray,
    ] {
        let request = Request::<EchoedArgs>::builder(Method::GET)
            .path("/get")
            .parameter_values("tag", ["rust", "http"])
            .parameter("page", "1")
            .parameter_encoding(encoding)
            .build();

        let response = client.execute(&request).await?;
        println!("=== {:?} ===", encoding);
        println!("Request URL: {}", response.value.url);
        println!("Server saw args: {}", response.value.args);
        println!();
    }

    Ok(())
}
