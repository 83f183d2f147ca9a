pub mod index;
pub mod postings;
pub mod query;
pub mod score;

pub use index::InvertedIndex;
pub use postings::{DocId, HashedPostings, PostingSet, SortedPostings};
pub use query::{
    evaluate, evaluate_clauses, evaluate_postfix, to_postfix, tokenize, Op, Postfix, QueryError,
    Token,
};
pub use score::{overlap_relevant, QueryId, SearchResults};
