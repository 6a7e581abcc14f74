//! Glossary domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by repositories and services.
//! - Own input normalization and validation rules for writable records.
//!
//! # Invariants
//! - Every persisted record is identified by an integer surrogate key.
//! - Timestamps are Unix epoch milliseconds.
//! - History entries are append-only snapshots, never structured diffs.

pub mod category;
pub mod history;
pub mod term;
pub mod user;

use self::category::CategoryValidationError;
use self::term::TermValidationError;
use self::user::UserValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failure of any writable record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Term(TermValidationError),
    User(UserValidationError),
    Category(CategoryValidationError),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Term(err) => write!(f, "{err}"),
            Self::User(err) => write!(f, "{err}"),
            Self::Category(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Term(err) => Some(err),
            Self::User(err) => Some(err),
            Self::Category(err) => Some(err),
        }
    }
}

impl From<TermValidationError> for ValidationError {
    fn from(value: TermValidationError) -> Self {
        Self::Term(value)
    }
}

impl From<UserValidationError> for ValidationError {
    fn from(value: UserValidationError) -> Self {
        Self::User(value)
    }
}

impl From<CategoryValidationError> for ValidationError {
    fn from(value: CategoryValidationError) -> Self {
        Self::Category(value)
    }
}
