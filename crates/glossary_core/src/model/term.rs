//! Term aggregate model.
//!
//! # Responsibility
//! - Define the `Term` aggregate (term row + synonym set + category links).
//! - Normalize caller drafts into persistable field values.
//! - Compute field-level differences between two aggregate states.
//!
//! # Invariants
//! - `name` and `definition` are non-empty after trimming.
//! - `example` is `None` rather than blank.
//! - Synonyms are trimmed, non-empty and unique by exact (case-sensitive)
//!   comparison. Their order carries no meaning.
//! - Category links never participate in field diffs.

use crate::model::category::{Category, CategoryId};
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Surrogate key of a `terms` row.
pub type TermId = i64;

/// Separator used when a synonym set is rendered into one history value.
pub const SYNONYM_RENDER_SEPARATOR: &str = ", ";

/// Fully hydrated glossary term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: TermId,
    pub name: String,
    pub definition: String,
    pub example: Option<String>,
    /// `None` once the creating user no longer resolves.
    pub created_by: Option<UserId>,
    /// Username of `created_by`, when it resolves.
    pub creator_name: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    /// Sorted for deterministic output only.
    pub synonyms: Vec<String>,
    /// Linked categories sorted by name.
    pub categories: Vec<Category>,
}

impl Term {
    /// Ids of the linked categories.
    pub fn category_ids(&self) -> Vec<CategoryId> {
        self.categories.iter().map(|category| category.id).collect()
    }

    /// Whether any synonym equals `value` exactly.
    pub fn has_synonym(&self, value: &str) -> bool {
        self.synonyms.iter().any(|synonym| synonym == value)
    }
}

/// Caller-supplied desired state of a term.
///
/// Category links travel separately because they are not part of the diffed
/// field set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TermDraft {
    pub name: String,
    pub definition: String,
    pub example: Option<String>,
    pub synonyms: Vec<String>,
}

impl TermDraft {
    pub fn new(name: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definition: definition.into(),
            ..Self::default()
        }
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    pub fn with_synonyms<I, S>(mut self, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonyms = synonyms.into_iter().map(Into::into).collect();
        self
    }

    /// Validates and normalizes this draft.
    ///
    /// # Errors
    /// - `EmptyName` / `EmptyDefinition` when the field is blank after trim.
    pub fn normalize(&self) -> Result<TermFields, TermValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(TermValidationError::EmptyName);
        }
        let definition = self.definition.trim();
        if definition.is_empty() {
            return Err(TermValidationError::EmptyDefinition);
        }

        Ok(TermFields {
            name: name.to_string(),
            definition: definition.to_string(),
            example: normalize_example(self.example.as_deref()),
            synonyms: normalize_synonyms(&self.synonyms),
        })
    }
}

impl From<&Term> for TermDraft {
    fn from(value: &Term) -> Self {
        Self {
            name: value.name.clone(),
            definition: value.definition.clone(),
            example: value.example.clone(),
            synonyms: value.synonyms.clone(),
        }
    }
}

/// Normalized, diffable field state of a term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermFields {
    pub name: String,
    pub definition: String,
    pub example: Option<String>,
    pub synonyms: BTreeSet<String>,
}

impl TermFields {
    /// Computes field-level changes from `self` (stored) to `next` (desired).
    ///
    /// Scalars compare by string equality, synonyms by set equality. At most
    /// one change is produced per field, in `name, definition, example,
    /// synonyms` order.
    pub fn diff(&self, next: &TermFields) -> Vec<FieldChange> {
        let mut changes = Vec::new();

        if self.name != next.name {
            changes.push(FieldChange {
                field: TermField::Name,
                old_value: Some(self.name.clone()),
                new_value: Some(next.name.clone()),
            });
        }
        if self.definition != next.definition {
            changes.push(FieldChange {
                field: TermField::Definition,
                old_value: Some(self.definition.clone()),
                new_value: Some(next.definition.clone()),
            });
        }
        if self.example != next.example {
            changes.push(FieldChange {
                field: TermField::Example,
                old_value: self.example.clone(),
                new_value: next.example.clone(),
            });
        }
        if self.synonyms != next.synonyms {
            changes.push(FieldChange {
                field: TermField::Synonyms,
                old_value: render_synonyms(&self.synonyms),
                new_value: render_synonyms(&next.synonyms),
            });
        }

        changes
    }
}

impl From<&Term> for TermFields {
    fn from(value: &Term) -> Self {
        Self {
            name: value.name.clone(),
            definition: value.definition.clone(),
            example: value.example.clone(),
            synonyms: value.synonyms.iter().cloned().collect(),
        }
    }
}

/// Term field tracked by the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermField {
    Name,
    Definition,
    Example,
    Synonyms,
}

impl TermField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Definition => "definition",
            Self::Example => "example",
            Self::Synonyms => "synonyms",
        }
    }
}

/// One detected field change, recorded as one `update` history row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: TermField,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

/// Rejected term input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermValidationError {
    EmptyName,
    EmptyDefinition,
}

impl Display for TermValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "term name must not be blank"),
            Self::EmptyDefinition => write!(f, "term definition must not be blank"),
        }
    }
}

impl Error for TermValidationError {}

/// Trims synonyms, drops blanks and collapses exact duplicates.
pub fn normalize_synonyms(synonyms: &[String]) -> BTreeSet<String> {
    synonyms
        .iter()
        .map(|synonym| synonym.trim())
        .filter(|synonym| !synonym.is_empty())
        .map(str::to_string)
        .collect()
}

/// Renders a synonym set as one history value; `None` for an empty set.
pub fn render_synonyms(synonyms: &BTreeSet<String>) -> Option<String> {
    if synonyms.is_empty() {
        return None;
    }
    Some(
        synonyms
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(SYNONYM_RENDER_SEPARATOR),
    )
}

fn normalize_example(example: Option<&str>) -> Option<String> {
    example
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::{normalize_synonyms, render_synonyms, TermDraft, TermField, TermValidationError};
    use std::collections::BTreeSet;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn rendered_set(value: Option<&str>) -> BTreeSet<String> {
        value
            .unwrap_or_default()
            .split(", ")
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn synonyms_are_trimmed_deduplicated_and_case_sensitive() {
        let normalized = normalize_synonyms(&strings(&["a", "A", "a ", "  ", ""]));
        assert_eq!(normalized, set(&["a", "A"]));
    }

    #[test]
    fn normalize_rejects_blank_name_before_definition() {
        let draft = TermDraft::new("  ", "");
        assert_eq!(draft.normalize(), Err(TermValidationError::EmptyName));

        let draft = TermDraft::new("API", " \n");
        assert_eq!(draft.normalize(), Err(TermValidationError::EmptyDefinition));
    }

    #[test]
    fn normalize_drops_blank_example() {
        let fields = TermDraft::new(" API ", " interface ")
            .with_example("   ")
            .normalize()
            .unwrap();
        assert_eq!(fields.name, "API");
        assert_eq!(fields.definition, "interface");
        assert_eq!(fields.example, None);
    }

    #[test]
    fn diff_reports_only_changed_fields() {
        let old = TermDraft::new("KPI", "key indicator")
            .with_synonyms(["metric"])
            .normalize()
            .unwrap();
        let new = TermDraft::new("KPI", "key indicator")
            .with_example("revenue growth")
            .with_synonyms(["metric "])
            .normalize()
            .unwrap();

        let changes = old.diff(&new);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, TermField::Example);
        assert_eq!(changes[0].old_value, None);
        assert_eq!(changes[0].new_value.as_deref(), Some("revenue growth"));
    }

    #[test]
    fn diff_compares_synonyms_as_sets() {
        let old = TermDraft::new("KPI", "d")
            .with_synonyms(["b", "a"])
            .normalize()
            .unwrap();
        let same = TermDraft::new("KPI", "d")
            .with_synonyms(["a", "b", "a"])
            .normalize()
            .unwrap();
        assert!(old.diff(&same).is_empty());

        let changed = TermDraft::new("KPI", "d")
            .with_synonyms(["a"])
            .normalize()
            .unwrap();
        let changes = old.diff(&changed);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, TermField::Synonyms);
        assert_eq!(rendered_set(changes[0].old_value.as_deref()), set(&["a", "b"]));
        assert_eq!(rendered_set(changes[0].new_value.as_deref()), set(&["a"]));
    }

    #[test]
    fn empty_synonym_set_renders_as_none() {
        assert_eq!(render_synonyms(&BTreeSet::new()), None);
    }
}
