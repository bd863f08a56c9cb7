//! In-memory implementation of UserLookup for testing and development

use crate::core::{User, UserLookup};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory user store
///
/// Useful for testing and development. Emails are matched exactly, the way
/// a plain equality query against the datastore would.
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user, rejecting duplicate ids
    pub async fn insert(&self, user: User) -> Result<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(anyhow!("User with id '{}' already exists", user.id));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    /// Replace an existing user
    pub async fn update(&self, user: User) -> Result<User> {
        let mut users = self.users.write().await;
        let slot = users
            .get_mut(&user.id)
            .ok_or_else(|| anyhow!("User not found: {}", user.id))?;
        *slot = user.clone();
        Ok(user)
    }

    pub async fn list(&self) -> Vec<User> {
        self.users.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserLookup for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(id).cloned())
    }
}
