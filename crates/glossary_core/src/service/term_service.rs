//! Term use-case service.
//!
//! # Responsibility
//! - Provide create/update/delete/get/list entry points for callers.
//! - Read back written aggregates so callers see hydrated state.
//!
//! # Invariants
//! - Service APIs never bypass repository validation or transactions.
//! - Service layer remains storage-agnostic.

use crate::model::category::CategoryId;
use crate::model::term::{Term, TermDraft, TermId};
use crate::model::user::UserId;
use crate::model::ValidationError;
use crate::repo::term_repo::{RepoError, RepoResult, TermListQuery, TermRepository};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for term use-cases.
#[derive(Debug)]
pub enum TermServiceError {
    /// Required field is blank.
    Invalid(ValidationError),
    /// Target term does not exist.
    TermNotFound(TermId),
    /// Persistence-layer failure; nothing was committed.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for TermServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "invalid term: {err}"),
            Self::TermNotFound(id) => write!(f, "term not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent term state: {details}"),
        }
    }
}

impl Error for TermServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TermServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Invalid(err),
            RepoError::NotFound { entity: "term", id } => Self::TermNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Result of an update use-case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermUpdate {
    /// Hydrated state after the update.
    pub term: Term,
    /// History rows written; zero for a no-op update.
    pub history_rows: usize,
}

/// Term service facade over repository implementations.
pub struct TermService<R: TermRepository> {
    repo: R,
}

impl<R: TermRepository> TermService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Borrows the wrapped repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Creates a term and returns its hydrated state.
    pub fn create_term(
        &mut self,
        draft: &TermDraft,
        editor_id: UserId,
        category_ids: &[CategoryId],
    ) -> Result<Term, TermServiceError> {
        let term_id = self.repo.create_term(draft, editor_id, category_ids)?;
        self.repo
            .get_term(term_id)?
            .ok_or(TermServiceError::InconsistentState(
                "created term not found in read-back",
            ))
    }

    /// Replaces a term's state and returns the hydrated result.
    pub fn update_term(
        &mut self,
        id: TermId,
        draft: &TermDraft,
        editor_id: UserId,
        category_ids: &[CategoryId],
    ) -> Result<TermUpdate, TermServiceError> {
        let history_rows = self.repo.update_term(id, draft, editor_id, category_ids)?;
        let term = self
            .repo
            .get_term(id)?
            .ok_or(TermServiceError::InconsistentState(
                "updated term not found in read-back",
            ))?;
        Ok(TermUpdate { term, history_rows })
    }

    /// Deletes a term; returns `false` when it did not exist.
    pub fn delete_term(&mut self, id: TermId, editor_id: UserId) -> Result<bool, TermServiceError> {
        Ok(self.repo.delete_term(id, editor_id)?)
    }

    /// Gets one hydrated term by id.
    pub fn get_term(&self, id: TermId) -> RepoResult<Option<Term>> {
        self.repo.get_term(id)
    }

    /// Lists terms matching `search_text`, optionally within one category.
    pub fn list_terms(
        &self,
        search_text: &str,
        category_id: Option<CategoryId>,
    ) -> RepoResult<Vec<Term>> {
        let query = TermListQuery {
            search_text: search_text.to_string(),
            category_id,
        };
        self.repo.list_terms(&query)
    }
}
