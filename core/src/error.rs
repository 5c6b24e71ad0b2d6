//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! The taxonomy mirrors the compiler's failure classes:
//! - `Schema`: a contract failed its structural preconditions. Fatal for that
//!   contract's artifact only.
//! - `Emission`: composing a single field's fragment failed.
//! - `Io`, `Json`, `Yaml`: directory/file and serialization failures, propagated as-is.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// JSON (de)serialization failure.
    #[display("JSON Error: {_0}")]
    Json(serde_json::Error),

    /// YAML (de)serialization failure.
    #[display("YAML Error: {_0}")]
    Yaml(serde_yaml::Error),

    /// Structural precondition failure on a contract.
    #[from(ignore)]
    #[display("Schema Error: {_0}")]
    Schema(String),

    /// Failure while composing the fragment of a single field.
    #[from(ignore)]
    #[display("Emission Error on field '{field}': {message}")]
    Emission {
        /// The `propertyKey` of the failing field.
        field: String,
        /// What went wrong.
        message: String,
    },

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

impl AppError {
    /// Builds a `Schema` error.
    pub fn schema(msg: impl Into<String>) -> Self {
        AppError::Schema(msg.into())
    }

    /// Builds an `Emission` error for the given field.
    pub fn emission(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Emission {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns true for structural contract failures.
    pub fn is_schema(&self) -> bool {
        matches!(self, AppError::Schema(_))
    }
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_conversion() {
        let io_err = Error::new(ErrorKind::Other, "test");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
    }

    #[test]
    fn test_string_conversion() {
        // String must land in General, never in Schema
        let msg = String::from("something wrong");
        let app_err: AppError = msg.into();
        match app_err {
            AppError::General(s) => assert_eq!(s, "something wrong"),
            _ => panic!("String should convert to AppError::General"),
        }
    }

    #[test]
    fn test_schema_display() {
        let app_err = AppError::schema("contractName is required");
        assert!(app_err.is_schema());
        assert_eq!(
            format!("{}", app_err),
            "Schema Error: contractName is required"
        );
    }

    #[test]
    fn test_emission_display() {
        let app_err = AppError::emission("email", "bad tuple");
        assert!(!app_err.is_schema());
        assert_eq!(
            format!("{}", app_err),
            "Emission Error on field 'email': bad tuple"
        );
    }
}
