//! User identity model.
//!
//! Users are created on first login by username and never deleted.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Surrogate key of a `users` row.
pub type UserId = i64;

/// Minimum username length in characters, counted after trimming.
pub const USERNAME_MIN_CHARS: usize = 2;

/// Role assigned to a user. Authorization is enforced by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

impl UserRole {
    /// Storage/wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    /// Parses the storage representation.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "user" => Some(Self::User),
            _ => None,
        }
    }
}

/// Persisted user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Unique and case-sensitive.
    pub username: String,
    pub role: UserRole,
    pub created_at: i64,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Rejected username input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Username is shorter than [`USERNAME_MIN_CHARS`] after trimming.
    UsernameTooShort { min_chars: usize },
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UsernameTooShort { min_chars } => {
                write!(f, "username must be at least {min_chars} characters")
            }
        }
    }
}

impl Error for UserValidationError {}

/// Trims a login username and checks its minimum length.
pub fn normalize_username(username: &str) -> Result<String, UserValidationError> {
    let trimmed = username.trim();
    if trimmed.chars().count() < USERNAME_MIN_CHARS {
        return Err(UserValidationError::UsernameTooShort {
            min_chars: USERNAME_MIN_CHARS,
        });
    }
    Ok(trimmed.to_string())
}
