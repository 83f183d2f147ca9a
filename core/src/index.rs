use std::collections::HashMap;

use crate::postings::{DocId, PostingSet};

/// Term-to-postings map. Built once from the corpus and read-only
/// afterwards; every query evaluation shares it by reference.
#[derive(Debug)]
pub struct InvertedIndex<S> {
    postings: HashMap<String, S>,
    empty: S,
    doc_count: u32,
}

impl<S: PostingSet> InvertedIndex<S> {
    pub fn new() -> Self {
        Self {
            postings: HashMap::new(),
            empty: S::default(),
            doc_count: 0,
        }
    }

    /// Indexes one document. Fragments are split on whitespace; a term
    /// occurring several times in the same document contributes a single
    /// posting. Documents must be added in id order.
    pub fn add_document<'a>(
        &mut self,
        doc_id: DocId,
        fragments: impl IntoIterator<Item = &'a str>,
    ) {
        for fragment in fragments {
            for term in fragment.split_whitespace() {
                if let Some(postings) = self.postings.get_mut(term) {
                    postings.insert(doc_id);
                } else {
                    let mut postings = S::default();
                    postings.insert(doc_id);
                    self.postings.insert(term.to_owned(), postings);
                }
            }
        }
        self.doc_count = self.doc_count.max(doc_id);
    }

    /// Returns the postings for `term`, or the empty set for a term that was
    /// never indexed. An absent term matches nothing; it is not an error.
    pub fn lookup(&self, term: &str) -> &S {
        self.postings.get(term).unwrap_or(&self.empty)
    }

    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    pub fn doc_count(&self) -> u32 {
        self.doc_count
    }
}

impl<S: PostingSet> Default for InvertedIndex<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postings::SortedPostings;

    #[test]
    fn postings_follow_document_order() {
        let mut index = InvertedIndex::<SortedPostings>::new();
        index.add_document(1, ["foo bar"]);
        index.add_document(2, ["foo baz"]);
        assert_eq!(index.lookup("foo").as_slice(), &[1, 2]);
        assert_eq!(index.lookup("bar").as_slice(), &[1]);
        assert_eq!(index.doc_count(), 2);
        assert_eq!(index.term_count(), 3);
    }

    #[test]
    fn repeated_term_in_one_document_posts_once() {
        let mut index = InvertedIndex::<SortedPostings>::new();
        index.add_document(1, ["foo foo", "foo"]);
        assert_eq!(index.lookup("foo").as_slice(), &[1]);
    }

    #[test]
    fn missing_term_is_the_empty_set() {
        let mut index = InvertedIndex::<SortedPostings>::new();
        index.add_document(1, ["foo"]);
        assert!(index.lookup("qux").is_empty());
    }
}
