//! API integration tests
//!
//! Run against a live server started with an administrator configured:
//! `OWL_AUTH__ADMIN_USERNAME=admin ADMIN_PASSWORD=admin cargo run`, then
//! `cargo test -- --ignored`.

use reqwest::Client;
use serde_json::{json, Value};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:8080/api/v1";

async fn login(client: &Client, username: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Register a throwaway member and return its username and token
async fn new_member(client: &Client) -> (String, String) {
    let username = format!("member-{}", Uuid::new_v4().simple());
    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({ "username": username, "password": "secret" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let token = login(client, &username, "secret").await;
    (username, token)
}

/// Shelve a book with one copy under a fresh author; returns the owl id
async fn shelve(client: &Client, admin: &str, author: &str) -> String {
    let author = format!("{} {}", author, Uuid::new_v4().simple());
    let title = format!("Book of {}", author);

    let response = client
        .post(format!("{}/authors", BASE_URL))
        .bearer_auth(admin)
        .json(&json!({ "name": author }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(admin)
        .json(&json!({ "title": title, "author_name": author }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let book: Value = response.json().await.expect("Failed to parse response");
    let owl_id = book["owl_id"].as_str().expect("No owl id").to_string();

    let response = client
        .post(format!("{}/copies", BASE_URL))
        .bearer_auth(admin)
        .json(&json!({ "owl_id": owl_id, "copy_type": "pb" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    owl_id
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_member_cannot_maintain_catalog() {
    let client = Client::new();
    let (_, token) = new_member(&client).await;

    let response = client
        .post(format!("{}/authors", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "name": "Nobody" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_borrow_return_and_cooldown() {
    let client = Client::new();
    let admin = login(&client, "admin", "admin").await;
    let owl_id = shelve(&client, &admin, "James").await;
    let (username, token) = new_member(&client).await;

    let response = client
        .post(format!("{}/borrow", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "owl_id": owl_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let record: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(record["library_user"], username.as_str());
    assert_eq!(record["is_returned"], false);

    let response = client
        .get(format!("{}/books/available", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    let books: Value = response.json().await.expect("Failed to parse response");
    assert!(books
        .as_array()
        .expect("Expected an array")
        .iter()
        .all(|b| b["owl_id"] != owl_id.as_str()));

    let response = client
        .put(format!("{}/return", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "owl_id": owl_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Book returned successfully");

    let response = client
        .post(format!("{}/borrow", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "owl_id": owl_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);

    let response = client
        .get(format!("{}/books/{}/availability", BASE_URL, owl_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["message"]
        .as_str()
        .expect("No message")
        .starts_with("You can borrow this book again on "));
    assert!(body["next_borrow_date"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_return_without_borrow_is_not_found() {
    let client = Client::new();
    let admin = login(&client, "admin", "admin").await;
    let owl_id = shelve(&client, &admin, "Guido").await;
    let (_, token) = new_member(&client).await;

    let response = client
        .put(format!("{}/return", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "owl_id": owl_id }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}
