use boolsearch::{evaluate, HashedPostings, InvertedIndex, PostingSet, SortedPostings};

fn tiny_index<S: PostingSet>() -> InvertedIndex<S> {
    let mut index = InvertedIndex::new();
    index.add_document(1, ["foo bar"]);
    index.add_document(2, ["foo baz"]);
    index
}

fn check_retrieval<S: PostingSet>() {
    let index = tiny_index::<S>();

    let both: S = [1, 2].into_iter().collect();
    let first: S = [1].into_iter().collect();

    assert_eq!(evaluate("foo", &index).unwrap(), both);
    assert_eq!(evaluate("foo bar", &index).unwrap(), first);
    assert_eq!(evaluate("bar | baz", &index).unwrap(), both);

    // a term absent from the corpus matches nothing and is not an error
    let qux = evaluate("qux", &index).unwrap();
    assert!(qux.is_empty());
}

#[test]
fn retrieval_with_sorted_postings() {
    check_retrieval::<SortedPostings>();
}

#[test]
fn retrieval_with_hashed_postings() {
    check_retrieval::<HashedPostings>();
}

#[test]
fn representations_agree_on_membership() {
    let sorted = tiny_index::<SortedPostings>();
    let hashed = tiny_index::<HashedPostings>();
    for query in ["foo", "foo bar", "bar | baz", "foo (bar | baz)"] {
        let a = evaluate(query, &sorted).unwrap();
        let b = evaluate(query, &hashed).unwrap();
        for doc in 1..=3 {
            assert_eq!(a.contains(doc), b.contains(doc), "query {query:?}, doc {doc}");
        }
    }
}
