//! Category model.
//!
//! Categories have their own lifecycle; deleting one only removes its links
//! to terms.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Surrogate key of a `categories` row.
pub type CategoryId = i64;

/// Color assigned when a draft leaves it blank.
pub const DEFAULT_CATEGORY_COLOR: &str = "#3498db";

/// Persisted category record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    /// Unique across categories.
    pub name: String,
    pub description: String,
    /// Opaque display hint.
    pub color: String,
}

/// Caller-supplied category state for create/update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    pub description: String,
    pub color: Option<String>,
}

impl CategoryDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns trimmed `(name, description, color)` ready for persistence.
    pub fn normalized(&self) -> Result<(String, String, String), CategoryValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CategoryValidationError::EmptyName);
        }
        let color = self
            .color
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_CATEGORY_COLOR);
        Ok((
            name.to_string(),
            self.description.trim().to_string(),
            color.to_string(),
        ))
    }
}

impl From<&Category> for CategoryDraft {
    fn from(value: &Category) -> Self {
        Self {
            name: value.name.clone(),
            description: value.description.clone(),
            color: Some(value.color.clone()),
        }
    }
}

/// Rejected category input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyName,
}

impl Display for CategoryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "category name must not be blank"),
        }
    }
}

impl Error for CategoryValidationError {}
