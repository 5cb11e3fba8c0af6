//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    EmptyField,
    InvalidFormat,

    // Not found errors
    ProductNotFound,

    // Pricing errors
    InvalidPricing,

    // Upstream errors
    UpstreamUnavailable,
    Unauthorized,

    // Infrastructure errors
    DatabaseError,
    CacheError,
    InternalError,
}

impl ErrorCode {
    /// Stable wire representation used in JSON error bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::EmptyField => "EMPTY_FIELD",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::ProductNotFound => "PRODUCT_NOT_FOUND",
            ErrorCode::InvalidPricing => "INVALID_PRICING",
            ErrorCode::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::CacheError => "CACHE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message).with_detail("field", field.into())
    }

    /// Creates an empty field error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(ErrorCode::EmptyField, format!("Field '{}' cannot be empty", field))
            .with_detail("field", field)
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::ProductNotFound, "Bike 42 not found");
        assert_eq!(format!("{}", err), "[PRODUCT_NOT_FOUND] Bike 42 not found");
    }

    #[test]
    fn validation_error_records_field() {
        let err = DomainError::validation("email", "Email is malformed");
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.details.get("field"), Some(&"email".to_string()));
    }

    #[test]
    fn empty_field_error_names_field() {
        let err = DomainError::empty_field("name");
        assert_eq!(err.message, "Field 'name' cannot be empty");
        assert_eq!(err.code, ErrorCode::EmptyField);
    }
}
