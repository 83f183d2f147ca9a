use boolsearch::{evaluate, InvertedIndex, SortedPostings};
use criterion::{criterion_group, criterion_main, Criterion};

fn bench_evaluate(c: &mut Criterion) {
    let mut index = InvertedIndex::<SortedPostings>::new();
    for doc in 1..=10_000u32 {
        let body = format!("term{} term{} shared", doc % 50, doc % 7);
        index.add_document(doc, [body.as_str()]);
    }
    c.bench_function("evaluate_boolean", |b| {
        b.iter(|| evaluate("term1 shared | (term2 term3)", &index))
    });
}

criterion_group!(benches, bench_evaluate);
criterion_main!(benches);
