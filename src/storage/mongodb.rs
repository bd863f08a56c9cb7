//! MongoDB user lookup using the official MongoDB async driver.
//!
//! # Feature flag
//!
//! This module is gated behind the `mongodb_backend` feature flag:
//! ```toml
//! [dependencies]
//! user-guard = { version = "0.1", features = ["mongodb_backend"] }
//! ```
//!
//! # Storage model
//!
//! Users live in one collection (default `users`) keyed by a native
//! `ObjectId` in `_id`, with camelCase field names (`lastName`).

use crate::core::{User, UserLookup};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use mongodb::Database;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document, doc};

/// Default collection holding user documents
pub const DEFAULT_COLLECTION: &str = "users";

/// Convert a user document into a [`User`], mapping `_id` to a hex id.
fn document_to_user(doc: &Document) -> Result<User> {
    let id = match doc.get("_id") {
        Some(Bson::ObjectId(oid)) => oid.to_hex(),
        Some(Bson::String(s)) => s.clone(),
        other => return Err(anyhow!("Unexpected _id in user document: {:?}", other)),
    };
    let text = |key: &str| doc.get_str(key).map(str::to_string).ok();

    Ok(User {
        id,
        name: text("name").unwrap_or_default(),
        last_name: text("lastName").unwrap_or_default(),
        email: text("email").unwrap_or_default(),
        role: text("role"),
        birthdate: text("birthdate"),
    })
}

/// User lookup backed by a MongoDB collection.
///
/// # Example
///
/// ```rust,ignore
/// use mongodb::Client;
/// use user_guard::storage::MongoUserLookup;
///
/// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
/// let lookup = MongoUserLookup::new(client.database("app"));
/// ```
#[derive(Clone, Debug)]
pub struct MongoUserLookup {
    database: Database,
    collection: String,
}

impl MongoUserLookup {
    /// Create a lookup over the default `users` collection.
    pub fn new(database: Database) -> Self {
        Self::with_collection(database, DEFAULT_COLLECTION)
    }

    pub fn with_collection(database: Database, collection: impl Into<String>) -> Self {
        Self {
            database,
            collection: collection.into(),
        }
    }

    /// Get a reference to the underlying database.
    pub fn database(&self) -> &Database {
        &self.database
    }

    fn collection(&self) -> mongodb::Collection<Document> {
        self.database.collection(&self.collection)
    }

    async fn find_one(&self, filter: Document) -> Result<Option<User>> {
        let found = self
            .collection()
            .find_one(filter)
            .await
            .map_err(|e| anyhow!("Failed to query users: {}", e))?;

        found.as_ref().map(document_to_user).transpose()
    }
}

#[async_trait]
impl UserLookup for MongoUserLookup {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.find_one(doc! { "email": email }).await
    }

    /// Ids that are not valid ObjectIds cannot match any document, so they
    /// resolve to `None` without a query.
    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        self.find_one(doc! { "_id": oid }).await
    }
}
