use std::collections::HashMap;

use crate::postings::{DocId, PostingSet};

/// Query identifier from the queries file.
pub type QueryId = u32;

/// True when the fraction of clauses containing `doc` exceeds `tau`.
/// Zero matching clauses is never relevant, whatever the threshold.
pub fn overlap_relevant<S: PostingSet>(doc: DocId, clauses: &[S], tau: f64) -> bool {
    let hits = clauses.iter().filter(|clause| clause.contains(doc)).count();
    if hits == 0 {
        return false;
    }
    hits as f64 / clauses.len() as f64 > tau
}

/// Evaluated queries keyed by query id. Exact-mode results are stored as a
/// single clause; soft-mode results keep one set per top-level OR clause.
#[derive(Debug, Default)]
pub struct SearchResults<S> {
    by_query: HashMap<QueryId, Vec<S>>,
}

impl<S: PostingSet> SearchResults<S> {
    pub fn new() -> Self {
        Self {
            by_query: HashMap::new(),
        }
    }

    pub fn insert(&mut self, query: QueryId, clauses: Vec<S>) {
        self.by_query.insert(query, clauses);
    }

    pub fn get(&self, query: QueryId) -> Option<&[S]> {
        self.by_query.get(&query).map(Vec::as_slice)
    }

    /// Exact-mode relevance: membership in the evaluated result.
    /// `None` when the query was never evaluated (unknown or malformed id).
    pub fn member(&self, query: QueryId, doc: DocId) -> Option<bool> {
        self.get(query)
            .map(|clauses| clauses.iter().any(|clause| clause.contains(doc)))
    }

    /// Soft-mode relevance: clause overlap ratio against `tau`.
    pub fn overlap(&self, query: QueryId, doc: DocId, tau: f64) -> Option<bool> {
        self.get(query)
            .map(|clauses| overlap_relevant(doc, clauses, tau))
    }

    pub fn len(&self) -> usize {
        self.by_query.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_query.is_empty()
    }
}
