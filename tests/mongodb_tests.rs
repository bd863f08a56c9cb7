//! Integration tests for the MongoDB user lookup.
//!
//! # Requirements
//!
//! - Docker must be running (testcontainers launches a MongoDB container)
//! - Feature flag `mongodb_backend` must be enabled
//!
//! # Running
//!
//! ```sh
//! cargo test --features mongodb_backend --test mongodb_tests
//! ```
//!
//! # Test isolation
//!
//! All tests share a single MongoDB container (via `OnceLock`). Each test
//! gets its own database.

#![cfg(feature = "mongodb_backend")]

use mongodb::Client;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Document, doc};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::mongo::Mongo;
use user_guard::prelude::*;
use user_guard::storage::MongoUserLookup;

// ---------------------------------------------------------------------------
// Shared test environment (single container, fresh database per test)
// ---------------------------------------------------------------------------

struct MongoTestEnv {
    /// Container handle — dropping this stops the MongoDB container.
    _container: testcontainers::ContainerAsync<Mongo>,
    connection_url: String,
}

static TEST_ENV: OnceLock<MongoTestEnv> = OnceLock::new();

async fn init_mongo_env() -> &'static MongoTestEnv {
    if let Some(env) = TEST_ENV.get() {
        return env;
    }

    let container = Mongo::default()
        .start()
        .await
        .expect("Failed to start MongoDB container — is Docker running?");

    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(27017).await.unwrap();
    let url = format!("mongodb://{}:{}", host, port);

    let _ = TEST_ENV.set(MongoTestEnv {
        _container: container,
        connection_url: url,
    });
    TEST_ENV.get().unwrap()
}

static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

async fn mongo_database() -> mongodb::Database {
    let env = init_mongo_env().await;
    let client = Client::with_uri_str(&env.connection_url)
        .await
        .expect("Failed to connect to MongoDB");
    let db_num = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    client.database(&format!("user_guard_test_{}", db_num))
}

/// Lookup over a fresh database seeded with one user; returns the user's id.
async fn seeded_lookup() -> (MongoUserLookup, String) {
    let db = mongo_database().await;
    let oid = ObjectId::new();
    db.collection::<Document>("users")
        .insert_one(doc! {
            "_id": oid,
            "name": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "role": "ADMIN_ROLE",
        })
        .await
        .expect("Failed to seed users collection");

    (MongoUserLookup::new(db), oid.to_hex())
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_find_by_email() {
    let (lookup, id) = seeded_lookup().await;

    let user = lookup.find_by_email("ada@example.com").await.unwrap().unwrap();
    assert_eq!(user.id, id);
    assert_eq!(user.last_name, "Lovelace");

    assert!(lookup.find_by_email("nobody@example.com").await.unwrap().is_none());
    assert!(lookup.find_by_email("").await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_by_id() {
    let (lookup, id) = seeded_lookup().await;

    let user = lookup.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.role.as_deref(), Some("ADMIN_ROLE"));

    let unknown = ObjectId::new().to_hex();
    assert!(lookup.find_by_id(&unknown).await.unwrap().is_none());
}

#[tokio::test]
async fn test_unparsable_id_finds_nothing() {
    let (lookup, _) = seeded_lookup().await;

    assert!(lookup.find_by_id("42").await.unwrap().is_none());
    assert!(lookup.find_by_id("").await.unwrap().is_none());
}

#[tokio::test]
async fn test_custom_collection() {
    let db = mongo_database().await;
    db.collection::<Document>("members")
        .insert_one(doc! { "_id": ObjectId::new(), "email": "m@example.com" })
        .await
        .unwrap();

    let lookup = MongoUserLookup::with_collection(db.clone(), "members");
    assert!(lookup.find_by_email("m@example.com").await.unwrap().is_some());

    let default_lookup = MongoUserLookup::new(db);
    assert!(
        default_lookup
            .find_by_email("m@example.com")
            .await
            .unwrap()
            .is_none()
    );
}

// ---------------------------------------------------------------------------
// Chains over MongoDB
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_chains_over_mongodb() {
    let (lookup, id) = seeded_lookup().await;
    let validations =
        UserValidations::new(Arc::new(lookup), &ValidationConfig::default()).unwrap();

    let create = ValidationContext::from_body(json!({
        "name": "A",
        "lastName": "B",
        "email": "ada@example.com",
        "password": "p"
    }))
    .unwrap();
    let err = validations.post.run(&create).await.unwrap_err();
    assert_eq!(
        err.field_errors().unwrap()[0].message,
        messages::EMAIL_TAKEN
    );

    let update = ValidationContext::from_body(json!({ "id": id, "role": "USER_ROLE" })).unwrap();
    assert!(validations.put.run(&update).await.is_ok());
}
