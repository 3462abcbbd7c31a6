//! Introspection configuration.
//!
//! Library-level settings supplied by the embedding application. There is no
//! environment loading here; the caller owns connection construction and
//! passes settings explicitly.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{AppError, AppResult};

/// Settings for a metadata introspector instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct IntrospectionConfig {
    /// Active schema override. When unset, the dialect default is used and
    /// MySQL-family servers are asked for their current database.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 64, message = "Schema name must be 1-64 characters"))]
    pub schema: Option<String>,

    /// Schemas excluded from schema-wide listings in addition to the
    /// dialect's built-in system schemas.
    #[serde(default)]
    pub excluded_schemas: Vec<String>,
}

impl IntrospectionConfig {
    /// Creates a config pinned to a specific schema.
    pub fn with_schema(schema: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            excluded_schemas: Vec::new(),
        }
    }

    /// Validates the config, mapping validator output into the workspace
    /// error model.
    pub fn check(&self) -> AppResult<()> {
        self.validate()
            .map_err(|e| AppError::Validation(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(IntrospectionConfig::default().check().is_ok());
    }

    #[test]
    fn test_empty_schema_is_rejected() {
        let config = IntrospectionConfig::with_schema("");
        assert!(config.check().is_err());
    }

    #[test]
    fn test_overlong_schema_is_rejected() {
        let config = IntrospectionConfig::with_schema("a".repeat(65));
        assert!(config.check().is_err());
    }

    #[test]
    fn test_round_trips_through_json() {
        let config = IntrospectionConfig {
            schema: Some("appdb".to_string()),
            excluded_schemas: vec!["staging".to_string()],
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: IntrospectionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.schema.as_deref(), Some("appdb"));
        assert_eq!(back.excluded_schemas, vec!["staging"]);
    }
}
