//! Example demonstrating comprehensive error handling.
//!
//! This example shows how to:
//! - Branch on the failure taxonomy (timeout, transport, response, conversion)
//! - Inspect the raw body of a non-2xx response
//! - Decode an error body into a typed value after the fact
//!
//! Run with: `cargo run --example error_handling`

use restcall::{Error, RestClient};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Post {
    id: u32,
    title: String,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct ApiError {
    message: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("restcall=info")
        .init();

    let client = RestClient::builder()
        .base_url("https://jsonplaceholder.typicode.com")?
        .timeout(Duration::from_secs(10))
        .build()?;

    println!("=== Example 1: Handling HTTP Errors ===");
    // Try to fetch a non-existent resource (404 error)
    match client.get::<Post>("/posts/999999").await {
        Ok(response) => println!("Success: {:?}", response.value),
        Err(Error::Response(response)) => {
            println!("Response failure!");
            println!("  Status: {} {}", response.status.as_u16(), response.status_text());
            println!("  Content-Type: {:?}", response.content_type);
            println!("  Raw body: {}", response.body);

            // The stored body can still be decoded into a typed view.
            match response.decode_body::<ApiError>() {
                Ok(detail) => println!("  Typed detail: {:?}", detail),
                Err(e) => println!("  Error body did not decode either: {}", e),
            }
        }
        Err(e) => println!("Other error: {}", e),
    }
    println!();

    println!("=== Example 2: Handling Conversion Errors ===");
    // An HTML page cannot be decoded into a Post
    match client.get::<Post>("/").await {
        Ok(response) => println!("Success: {:?}", response.value),
        Err(Error::Conversion(e)) => {
            println!("Conversion failure: {}", e);
        }
        Err(e) => println!("Other error: {}", e),
    }
    println!();

    println!("=== Example 3: Handling Transport Errors ===");
    // Nothing listens on this port
    let unreachable = RestClient::builder()
        .base_url("http://127.0.0.1:9")?
        .timeout(Duration::from_secs(2))
        .build()?;
    match unreachable.get::<Post>("/posts/1").await {
        Ok(response) => println!("Success: {:?}", response.value),
        Err(Error::Timeout { url, .. }) => println!("Timed out calling {}", url),
        Err(Error::Transport { url, .. }) => println!("Transport failure calling {}", url),
        Err(e) => println!("Other error: {}", e),
    }

    Ok(())
}
