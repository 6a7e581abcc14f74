//! History use-case service.
//!
//! # Invariants
//! - Global history listing always applies a bounded limit.

use crate::model::history::HistoryEntry;
use crate::model::term::TermId;
use crate::repo::history_repo::HistoryRepository;
use crate::repo::term_repo::RepoResult;

const HISTORY_DEFAULT_LIMIT: u32 = 100;
const HISTORY_LIMIT_MAX: u32 = 1000;

/// Recent-history envelope used by service callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryListResult {
    /// Entries sorted newest first.
    pub items: Vec<HistoryEntry>,
    /// Effective normalized limit used by the query.
    pub applied_limit: u32,
}

/// History service facade over repository implementations.
pub struct HistoryService<R: HistoryRepository> {
    repo: R,
}

impl<R: HistoryRepository> HistoryService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists the newest entries across all terms.
    ///
    /// `None` or `Some(0)` falls back to 100; larger limits clamp to 1000.
    pub fn list_recent(&self, limit: Option<u32>) -> RepoResult<HistoryListResult> {
        let applied_limit = normalize_history_limit(limit);
        let items = self.repo.list_all(applied_limit)?;
        Ok(HistoryListResult {
            items,
            applied_limit,
        })
    }

    /// Lists every entry recorded for `term_id`, newest first.
    pub fn list_for_term(&self, term_id: TermId) -> RepoResult<Vec<HistoryEntry>> {
        self.repo.list_by_term(term_id)
    }
}

/// Normalizes a global history limit.
pub fn normalize_history_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => HISTORY_DEFAULT_LIMIT,
        Some(value) if value > HISTORY_LIMIT_MAX => HISTORY_LIMIT_MAX,
        Some(value) => value,
    }
}
