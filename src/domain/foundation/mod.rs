//! Foundation module - Shared domain primitives.
//!
//! Contains value objects and error types that form the vocabulary of the
//! rental booking domain.

mod errors;
mod money;
mod timestamp;

pub use errors::{DomainError, ErrorCode};
pub use money::Money;
pub use timestamp::Timestamp;
