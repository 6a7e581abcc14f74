//! Term history (audit trail) model.
//!
//! # Invariants
//! - Entries are append-only and never mutated after insert.
//! - `term_id` may reference a term that no longer exists; `term_name_snapshot`
//!   keeps the name the term had when the entry was written.
//! - `changed_by` may no longer resolve to a user.

use crate::model::term::{FieldChange, TermId};
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};

/// Surrogate key of a `term_history` row.
pub type HistoryId = i64;

/// Field name recorded on `create` and `delete` entries.
pub const TERM_FIELD_NAME: &str = "term";

/// Display name used when `changed_by` no longer resolves.
pub const UNKNOWN_USER_LABEL: &str = "unknown";

/// Prefix applied to the snapshot name when the term no longer exists.
pub const DELETED_TERM_PREFIX: &str = "(deleted) ";

/// Kind of mutation an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Create,
    Update,
    Delete,
}

impl HistoryAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "create" => Some(Self::Create),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

/// Audit row annotated for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: HistoryId,
    pub term_id: TermId,
    /// Term name at the time of the change.
    pub term_name_snapshot: String,
    pub action: HistoryAction,
    pub field_name: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub changed_by: Option<UserId>,
    pub changed_at: i64,
    /// Username of `changed_by`, or [`UNKNOWN_USER_LABEL`].
    pub changer_name: String,
    /// Current term name, or the snapshot behind [`DELETED_TERM_PREFIX`].
    pub term_name: String,
}

impl HistoryEntry {
    /// Whether the described term was gone when this entry was read.
    pub fn term_deleted(&self) -> bool {
        self.term_name.starts_with(DELETED_TERM_PREFIX)
    }
}

/// Audit row about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHistoryEntry {
    pub term_id: TermId,
    pub term_name: String,
    pub action: HistoryAction,
    pub field_name: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub changed_by: UserId,
    pub changed_at: i64,
}

impl NewHistoryEntry {
    /// Entry recording creation of `term_name`.
    pub fn created(term_id: TermId, term_name: &str, changed_by: UserId, changed_at: i64) -> Self {
        Self {
            term_id,
            term_name: term_name.to_string(),
            action: HistoryAction::Create,
            field_name: Some(TERM_FIELD_NAME.to_string()),
            old_value: None,
            new_value: Some(term_name.to_string()),
            changed_by,
            changed_at,
        }
    }

    /// Entry recording one field change of an update.
    pub fn updated(
        term_id: TermId,
        term_name: &str,
        change: FieldChange,
        changed_by: UserId,
        changed_at: i64,
    ) -> Self {
        Self {
            term_id,
            term_name: term_name.to_string(),
            action: HistoryAction::Update,
            field_name: Some(change.field.as_str().to_string()),
            old_value: change.old_value,
            new_value: change.new_value,
            changed_by,
            changed_at,
        }
    }

    /// Entry recording deletion of `term_name`.
    pub fn deleted(term_id: TermId, term_name: &str, changed_by: UserId, changed_at: i64) -> Self {
        Self {
            term_id,
            term_name: term_name.to_string(),
            action: HistoryAction::Delete,
            field_name: Some(TERM_FIELD_NAME.to_string()),
            old_value: Some(term_name.to_string()),
            new_value: None,
            changed_by,
            changed_at,
        }
    }
}
