//! Configuration management for farmrec.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "farmrec";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "farm.db";

/// Prefix for environment overrides.
const ENV_PREFIX: &str = "FARMREC_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FARMREC_`, `__` between sections)
/// 2. TOML config file at `~/.config/farmrec/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Field validation rules.
    pub validation: ValidationConfig,
    /// Output configuration.
    pub display: DisplayConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/farmrec/farm.db`
    pub database_path: Option<PathBuf>,
}

/// Field validation rules applied to user input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Minimum length of a person's name.
    pub min_name_length: usize,
    /// Exact number of digits in a contact number.
    pub contact_digits: usize,
    /// Minimum password length.
    pub password_min_length: usize,
    /// Special characters a password may (and must) contain.
    pub password_specials: String,
    /// Smallest field size accepted for a crop entry, in acres.
    pub min_field_size_acres: f64,
}

/// Output-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Number of rows shown in the dashboard's "recent" sections.
    pub recent_limit: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_name_length: 2,
            contact_digits: 10,
            password_min_length: 8,
            password_specials: "@$!%*?&".to_string(),
            min_field_size_acres: 0.01,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { recent_limit: 5 }
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        // FARMREC_USER and FARMREC_PASSWORD are CLI credentials, not config keys
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["user", "password"]).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let rules = &self.validation;

        if rules.contact_digits == 0 {
            return Err(Error::ConfigValidation {
                message: "contact_digits must be greater than 0".to_string(),
            });
        }

        if rules.password_specials.is_empty() {
            return Err(Error::ConfigValidation {
                message: "password_specials must list at least one character".to_string(),
            });
        }

        if let Some(c) = rules
            .password_specials
            .chars()
            .find(char::is_ascii_alphanumeric)
        {
            return Err(Error::ConfigValidation {
                message: format!("password_specials may not contain letters or digits ('{c}')"),
            });
        }

        // One lowercase, one uppercase, one digit, one special
        if rules.password_min_length < 4 {
            return Err(Error::ConfigValidation {
                message: format!(
                    "password_min_length ({}) must be at least 4",
                    rules.password_min_length
                ),
            });
        }

        if !rules.min_field_size_acres.is_finite() || rules.min_field_size_acres <= 0.0 {
            return Err(Error::ConfigValidation {
                message: format!(
                    "min_field_size_acres ({}) must be a positive number",
                    rules.min_field_size_acres
                ),
            });
        }

        if self.display.recent_limit == 0 {
            return Err(Error::ConfigValidation {
                message: "recent_limit must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_validation_config() {
        let rules = ValidationConfig::default();

        assert_eq!(rules.min_name_length, 2);
        assert_eq!(rules.contact_digits, 10);
        assert_eq!(rules.password_min_length, 8);
        assert_eq!(rules.password_specials, "@$!%*?&");
        assert!((rules.min_field_size_acres - 0.01).abs() < f64::EPSILON);
    }

    #[test]
    fn test_default_display_config() {
        assert_eq!(DisplayConfig::default().recent_limit, 5);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_contact_digits() {
        let mut config = Config::default();
        config.validation.contact_digits = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("contact_digits"));
    }

    #[test]
    fn test_validate_alphanumeric_specials() {
        let mut config = Config::default();
        config.validation.password_specials = "@a".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("password_specials"));
    }

    #[test]
    fn test_validate_short_password_minimum() {
        let mut config = Config::default();
        config.validation.password_min_length = 3;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("password_min_length"));
    }

    #[test]
    fn test_validate_non_positive_field_size() {
        let mut config = Config::default();
        config.validation.min_field_size_acres = 0.0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("min_field_size_acres"));
    }

    #[test]
    fn test_validate_zero_recent_limit() {
        let mut config = Config::default();
        config.display.recent_limit = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        assert!(config.database_path().to_string_lossy().contains("farm.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/farm.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/farm.sqlite")
        );
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("farmrec"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config.validation, ValidationConfig::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[storage]\ndatabase_path = \"/srv/farm.db\"\n\n[validation]\ncontact_digits = 11\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.database_path(), PathBuf::from("/srv/farm.db"));
        assert_eq!(config.validation.contact_digits, 11);
        assert_eq!(config.validation.min_name_length, 2);
    }

    #[test]
    fn test_load_rejects_invalid_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[display]\nrecent_limit = 0\n").unwrap();

        let err = Config::load_from(Some(path)).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
    }

    #[test]
    fn test_validation_config_deserialize_partial() {
        let json = r#"{"contact_digits": 8}"#;
        let rules: ValidationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(rules.contact_digits, 8);
        assert_eq!(rules.password_min_length, 8);
    }
}
