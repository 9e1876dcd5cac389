//! Basic example demonstrating simple GET and POST requests.
//!
//! This example shows how to:
//! - Create a client with basic configuration
//! - Make GET requests to fetch typed data
//! - Make POST requests with a JSON body
//! - Access the status code on the response envelope
//!
//! Run with: `cargo run --example basic_call`

use restcall::{Error, RestClient};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Post {
    #[serde(rename = "userId")]
    user_id: u32,
    id: u32,
    title: String,
    body: String,
}

#[derive(Debug, Serialize)]
struct NewPost {
    title: String,
    body: String,
    #[serde(rename = "userId")]
    user_id: u32,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter("restcall=debug,basic_call=info")
        .init();

    // Create a client for the JSONPlaceholder API
    let client = RestClient::builder()
        .base_url("https://jsonplaceholder.typicode.com")?
        .timeout(Duration::from_secs(30))
        .build()?;

    println!("=== GET Request Example ===");
    // Make a GET request to fetch a post
    let response = client.get::<Post>("/posts/1").await?;

    println!("Post ID: {}", response.value.id);
    println!("Title: {}", response.value.title);
    println!("Status code: {}", response.status);
    println!();

    println!("=== POST Request Example ===");
    // Make a POST request to create a new post
    let new_post = NewPost {
        title: "My New Post".to_string(),
        body: "This is the content of my new post!".to_string(),
        user_id: 1,
    };
    let created = client.post::<_, Post>("/posts", &new_post).await?;

    println!("Created post with ID: {}", created.value.id);
    println!("Status code: {}", created.status);

    Ok(())
}
