//! Configuration loading and management

use crate::core::error::ConfigError;
use crate::core::field::DateFormat;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Default layout for the `birthdate` field
pub const DEFAULT_BIRTHDATE_FORMAT: &str = "MM-DD-YYYY";

/// Default request body limit for the validation middleware
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Settings for the user validation chains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Allowed values of the `role` field
    pub roles: Vec<String>,

    /// Layout of the `birthdate` field, written with YYYY/MM/DD tokens
    pub birthdate_format: String,

    /// Look up the empty key when a required lookup field is absent
    pub lookup_absent_fields: bool,

    /// Largest request body the middleware buffers
    pub max_body_bytes: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            roles: vec!["USER_ROLE".to_string(), "ADMIN_ROLE".to_string()],
            birthdate_format: DEFAULT_BIRTHDATE_FORMAT.to_string(),
            lookup_absent_fields: true,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ValidationConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    ///
    /// Missing keys fall back to their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings can build rule chains
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.roles.is_empty() {
            return Err(ConfigError::MissingField {
                field: "roles".to_string(),
            });
        }
        if let Some(blank) = self.roles.iter().find(|r| r.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "roles".to_string(),
                value: blank.clone(),
                message: "role names cannot be blank".to_string(),
            });
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_body_bytes".to_string(),
                value: "0".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        self.date_format()?;
        Ok(())
    }

    /// Parsed `birthdate_format`
    pub fn date_format(&self) -> Result<DateFormat, ConfigError> {
        DateFormat::parse(&self.birthdate_format)
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_lookup_absent_fields(mut self, enabled: bool) -> Self {
        self.lookup_absent_fields = enabled;
        self
    }
}
