//! The user record returned by lookups

use serde::{Deserialize, Serialize};

/// A stored user as seen by the validation layer
///
/// Only the lookup outcome matters to the rule chains; the fields are kept
/// so lookup implementations and demos can return something meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<String>,
}

impl User {
    /// Create a user with a freshly generated 24-hex-character id
    pub fn new(
        name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: new_object_id(),
            name: name.into(),
            last_name: last_name.into(),
            email: email.into(),
            role: None,
            birthdate: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// Generate an id in the datastore's native 24-hex-character format
pub fn new_object_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(24);
    id
}
