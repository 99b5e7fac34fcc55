//! Regex rules for password complexity and contact numbers.

use regex::Regex;

use crate::error::{Error, Result};

/// A compiled character-class requirement.
#[derive(Debug)]
pub struct FieldPattern {
    /// Name of the rule for identification.
    pub name: &'static str,

    /// What the rule requires, phrased for an error message.
    pub description: String,

    regex: Regex,
}

impl FieldPattern {
    /// Compile a new rule.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigValidation`] if the pattern does not compile.
    pub fn new(name: &'static str, description: impl Into<String>, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| Error::ConfigValidation {
            message: format!("invalid {name} pattern: {e}"),
        })?;
        Ok(Self {
            name,
            description: description.into(),
            regex,
        })
    }

    /// Check if the value satisfies this rule.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

/// Character-class escape for each allowed special character.
fn special_class(specials: &str) -> String {
    specials
        .chars()
        .map(|c| regex::escape(&c.to_string()))
        .collect()
}

/// Rules a password must satisfy, one per required character class.
///
/// The `regex` crate has no lookahead, so each class is its own pattern.
///
/// # Errors
///
/// Returns an error if a pattern built from `specials` does not compile.
pub fn password_patterns(specials: &str) -> Result<Vec<FieldPattern>> {
    Ok(vec![
        FieldPattern::new("lowercase", "one lowercase letter", "[a-z]")?,
        FieldPattern::new("uppercase", "one uppercase letter", "[A-Z]")?,
        FieldPattern::new("digit", "one digit", "[0-9]")?,
        FieldPattern::new(
            "special",
            format!("one special character ({specials})"),
            &format!("[{}]", special_class(specials)),
        )?,
    ])
}

/// The whole-string rule: allowed characters only, at least `min_length` long.
///
/// # Errors
///
/// Returns an error if the pattern does not compile.
pub fn password_charset(specials: &str, min_length: usize) -> Result<FieldPattern> {
    FieldPattern::new(
        "charset",
        format!("at least {min_length} characters using only letters, digits and {specials}"),
        &format!("^[A-Za-z0-9{}]{{{min_length},}}$", special_class(specials)),
    )
}

/// The contact number rule: exactly `digits` ASCII digits.
///
/// # Errors
///
/// Returns an error if the pattern does not compile.
pub fn contact_pattern(digits: usize) -> Result<FieldPattern> {
    FieldPattern::new(
        "contact",
        format!("must be exactly {digits} digits"),
        &format!("^[0-9]{{{digits}}}$"),
    )
}
