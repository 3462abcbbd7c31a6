//! SQL identifier validation.
//!
//! Caller-supplied table names reach catalog queries as bound parameters,
//! but they are still checked against a strict allow-list first so that a
//! rejected name surfaces as a typed error instead of an empty result.

use crate::errors::AppError;

/// Validates caller-supplied SQL identifiers.
pub struct IdentifierValidator;

/// Maximum identifier length accepted (MySQL and Postgres both cap at 64
/// bytes for ordinary identifiers).
const MAX_IDENTIFIER_LEN: usize = 64;

impl IdentifierValidator {
    /// Validates an identifier against the allow-list.
    ///
    /// Accepted: ASCII letters, digits, `_` and `$`, not starting with a
    /// digit, 1-64 characters.
    ///
    /// # Errors
    /// Returns `AppError::InvalidIdentifier` when the name falls outside
    /// the allow-list.
    pub fn validate(name: &str) -> Result<(), AppError> {
        if name.is_empty() {
            return Err(AppError::InvalidIdentifier("empty name".to_string()));
        }
        if name.len() > MAX_IDENTIFIER_LEN {
            return Err(AppError::InvalidIdentifier(format!(
                "{} exceeds {} characters",
                name, MAX_IDENTIFIER_LEN
            )));
        }
        let mut chars = name.chars();
        let first = chars.next().unwrap_or('0');
        if first.is_ascii_digit() {
            return Err(AppError::InvalidIdentifier(format!(
                "{} starts with a digit",
                name
            )));
        }
        if !Self::is_allowed(first) || !chars.all(Self::is_allowed) {
            return Err(AppError::InvalidIdentifier(name.to_string()));
        }
        Ok(())
    }

    /// Quotes an identifier for MySQL-family SQL, doubling embedded
    /// backticks.
    pub fn quote_mysql(name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    /// Quotes an identifier for Postgres SQL, doubling embedded double
    /// quotes.
    pub fn quote_postgres(name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn is_allowed(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '_' || c == '$'
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name_is_allowed() {
        assert!(IdentifierValidator::validate("users").is_ok());
        assert!(IdentifierValidator::validate("order_items_2024").is_ok());
        assert!(IdentifierValidator::validate("_private$tmp").is_ok());
    }

    #[test]
    fn test_empty_name_is_rejected() {
        assert!(IdentifierValidator::validate("").is_err());
    }

    #[test]
    fn test_injection_text_is_rejected() {
        assert!(IdentifierValidator::validate("users; DROP TABLE users").is_err());
        assert!(IdentifierValidator::validate("users' OR '1'='1").is_err());
        assert!(IdentifierValidator::validate("users`").is_err());
    }

    #[test]
    fn test_leading_digit_is_rejected() {
        assert!(IdentifierValidator::validate("1users").is_err());
    }

    #[test]
    fn test_length_limit() {
        assert!(IdentifierValidator::validate(&"a".repeat(64)).is_ok());
        assert!(IdentifierValidator::validate(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_quote_mysql_doubles_backticks() {
        assert_eq!(IdentifierValidator::quote_mysql("simple"), "`simple`");
        assert_eq!(
            IdentifierValidator::quote_mysql("with`tick"),
            "`with``tick`"
        );
    }

    #[test]
    fn test_quote_postgres_doubles_quotes() {
        assert_eq!(IdentifierValidator::quote_postgres("simple"), "\"simple\"");
        assert_eq!(
            IdentifierValidator::quote_postgres("wi\"th"),
            "\"wi\"\"th\""
        );
    }
}
