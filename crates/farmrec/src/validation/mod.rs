//! Field validation for user input.
//!
//! Every rule reports the offending field through [`Error::Validation`], so
//! both the CLI and the interactive menu can show the message as-is.
//!
//! # Example
//!
//! ```
//! use farmrec::config::ValidationConfig;
//! use farmrec::validation::Validator;
//!
//! let validator = Validator::new(&ValidationConfig::default()).unwrap();
//!
//! assert!(validator.contact("9876543210").is_ok());
//! assert!(validator.password("weak").is_err());
//! ```

mod rules;

use tracing::trace;

use crate::config::ValidationConfig;
use crate::error::{Error, Result};

pub use rules::{contact_pattern, password_charset, password_patterns, FieldPattern};

/// Validates and normalizes user-supplied fields.
#[derive(Debug)]
pub struct Validator {
    min_name_length: usize,
    min_field_size_acres: f64,
    contact: FieldPattern,
    password_charset: FieldPattern,
    password_classes: Vec<FieldPattern>,
}

impl Validator {
    /// Build a validator from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured rule does not compile.
    pub fn new(config: &ValidationConfig) -> Result<Self> {
        Ok(Self {
            min_name_length: config.min_name_length,
            min_field_size_acres: config.min_field_size_acres,
            contact: contact_pattern(config.contact_digits)?,
            password_charset: password_charset(
                &config.password_specials,
                config.password_min_length,
            )?,
            password_classes: password_patterns(&config.password_specials)?,
        })
    }

    /// Trim a required field and reject it if empty.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the trimmed value is empty.
    pub fn required(&self, field: &'static str, value: &str) -> Result<String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(Error::validation(field, "is required"));
        }
        Ok(value.to_string())
    }

    /// Validate a person's name.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the name is empty or too short.
    pub fn name(&self, value: &str) -> Result<String> {
        let name = self.required("name", value)?;
        if name.chars().count() < self.min_name_length {
            return Err(Error::validation(
                "name",
                format!("must be at least {} characters", self.min_name_length),
            ));
        }
        Ok(name)
    }

    /// Validate a contact number.
    ///
    /// # Errors
    ///
    /// Returns a validation error unless the value is the configured number of digits.
    pub fn contact(&self, value: &str) -> Result<String> {
        let contact = value.trim();
        if !self.contact.matches(contact) {
            return Err(Error::validation("contact", self.contact.description.clone()));
        }
        Ok(contact.to_string())
    }

    /// Check password complexity.
    ///
    /// # Errors
    ///
    /// Returns a validation error listing every requirement the password misses.
    pub fn password(&self, value: &str) -> Result<()> {
        let mut missing: Vec<&str> = self
            .password_classes
            .iter()
            .filter(|rule| !rule.matches(value))
            .map(|rule| {
                trace!(rule = rule.name, "password rule not met");
                rule.description.as_str()
            })
            .collect();

        if !self.password_charset.matches(value) {
            missing.push(&self.password_charset.description);
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::validation(
                "password",
                format!("must contain {}", missing.join(", ")),
            ))
        }
    }

    /// Check a password against its confirmation.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the two differ.
    pub fn password_confirmation(&self, password: &str, confirmation: &str) -> Result<()> {
        if password == confirmation {
            Ok(())
        } else {
            Err(Error::validation("password", "passwords don't match"))
        }
    }

    /// Validate a field size in acres.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the size is not a number at or above the minimum.
    pub fn field_size(&self, acres: f64) -> Result<f64> {
        if !acres.is_finite() || acres < self.min_field_size_acres {
            return Err(Error::validation(
                "field_size",
                format!("must be at least {} acres", self.min_field_size_acres),
            ));
        }
        Ok(acres)
    }

    /// Validate a money amount such as a profit or a price.
    ///
    /// # Errors
    ///
    /// Returns a validation error for negative or non-finite amounts.
    pub fn amount(&self, field: &'static str, value: f64) -> Result<f64> {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::validation(field, "must be zero or a positive number"));
        }
        Ok(value)
    }

    /// Parse and validate a money amount typed by the user.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the text is not a non-negative number.
    pub fn parse_amount(&self, field: &'static str, text: &str) -> Result<f64> {
        let value = text
            .trim()
            .replace(',', "")
            .parse::<f64>()
            .map_err(|_| Error::validation(field, format!("'{}' is not a number", text.trim())))?;
        self.amount(field, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> Validator {
        Validator::new(&ValidationConfig::default()).unwrap()
    }

    #[test]
    fn test_required_trims() {
        let v = validator();
        assert_eq!(v.required("location", "  Pune ").unwrap(), "Pune");
        assert!(v.required("location", "   ").is_err());
    }

    #[test]
    fn test_name_length() {
        let v = validator();
        assert!(v.name("Al").is_ok());

        let err = v.name("A").unwrap_err();
        assert_eq!(err.to_string(), "name: must be at least 2 characters");
    }

    #[test]
    fn test_contact() {
        let v = validator();
        assert_eq!(v.contact(" 9876543210 ").unwrap(), "9876543210");

        let err = v.contact("12345").unwrap_err();
        assert_eq!(err.to_string(), "contact: must be exactly 10 digits");
    }

    #[test]
    fn test_password_accepts_complex() {
        assert!(validator().password("Harvest@2024").is_ok());
    }

    #[test]
    fn test_password_lists_missing_rules() {
        let err = validator().password("harvest").unwrap_err().to_string();

        assert!(err.contains("one uppercase letter"));
        assert!(err.contains("one digit"));
        assert!(err.contains("one special character"));
        assert!(err.contains("at least 8 characters"));
        assert!(!err.contains("lowercase"));
    }

    #[test]
    fn test_password_rejects_disallowed_characters() {
        let err = validator().password("Harvest#2024@").unwrap_err().to_string();
        assert!(err.contains("only letters, digits"));
    }

    #[test]
    fn test_password_confirmation() {
        let v = validator();
        assert!(v.password_confirmation("a", "a").is_ok());
        assert!(v.password_confirmation("a", "b").is_err());
    }

    #[test]
    fn test_field_size() {
        let v = validator();
        assert!(v.field_size(0.01).is_ok());
        assert!(v.field_size(12.5).is_ok());
        assert!(v.field_size(0.0).is_err());
        assert!(v.field_size(f64::NAN).is_err());
    }

    #[test]
    fn test_parse_amount() {
        let v = validator();
        assert!((v.parse_amount("profit", "25,000.50").unwrap() - 25_000.5).abs() < 1e-9);
        assert!(v.parse_amount("profit", "-1").is_err());
        assert!(v.parse_amount("profit", "lots").is_err());
    }

    #[test]
    fn test_custom_contact_digits() {
        let config = ValidationConfig {
            contact_digits: 8,
            ..ValidationConfig::default()
        };
        let v = Validator::new(&config).unwrap();

        assert!(v.contact("12345678").is_ok());
        assert!(v.contact("9876543210").is_err());
    }
}
