//! Contact domain type
//!
//! A contact is a typed address that a sender of the matching type can
//! deliver notices to. Validated on construction.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Contact descriptor for self-state notices
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Contact {
    /// Sender type that delivers to this contact (e.g. `stderr`, `file`)
    #[serde(rename = "type")]
    pub contact_type: String,
    /// Sender-specific address
    pub value: String,
}

impl Contact {
    /// Create a new contact with validation
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` if the type or value is blank
    pub fn new(
        contact_type: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let contact = Self {
            contact_type: contact_type.into().trim().to_string(),
            value: value.into(),
        };
        contact.validate()?;
        Ok(contact)
    }

    /// Check that both fields are present
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.contact_type.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "contacts.type".to_string(),
                message: "contact type must not be empty".to_string(),
            });
        }
        if self.value.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "contacts.value".to_string(),
                message: format!("contact of type '{}' has an empty value", self.contact_type),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.contact_type, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_contact() {
        let contact = Contact::new(" stderr ", "ops").unwrap();
        assert_eq!(contact.contact_type, "stderr");
        assert_eq!(contact.to_string(), "stderr:ops");
    }

    #[test]
    fn test_blank_type_rejected() {
        assert!(matches!(
            Contact::new("", "ops"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_blank_value_rejected() {
        let err = Contact::new("file", "  ").unwrap_err();
        assert!(err.to_string().contains("empty value"));
    }

    #[test]
    fn test_deserialize_type_field() {
        let contact: Contact = toml::from_str("type = \"file\"\nvalue = \"/tmp/notices\"").unwrap();
        assert_eq!(contact.contact_type, "file");
        assert_eq!(contact.value, "/tmp/notices");
    }
}
