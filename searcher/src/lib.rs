use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use boolsearch::{
    evaluate, evaluate_clauses, DocId, HashedPostings, InvertedIndex, PostingSet, QueryError,
    QueryId, SearchResults, SortedPostings,
};
use clap::{Parser, ValueEnum};
use lazy_static::lazy_static;
use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref TRAILING_DIGITS: Regex = Regex::new(r"\d+$").expect("valid regex");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Whole-expression evaluation; relevance is set membership
    Exact,
    /// Per-clause evaluation; relevance is the clause overlap ratio
    Soft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Representation {
    /// Sorted doc-id vectors with merge-based set algebra
    Sorted,
    /// Hash sets with native set algebra
    Hashed,
}

#[derive(Parser)]
#[command(name = "searcher")]
#[command(about = "Boolean search over a TSV corpus", long_about = None)]
pub struct Args {
    /// Corpus file: one document per line, tab-separated fragments
    #[arg(long, default_value = "docs.txt")]
    pub docs_file: PathBuf,
    /// Queries file: one "<id>\t<boolean expression>" per line
    #[arg(long, default_value = "queries.numerate.txt")]
    pub queries_file: PathBuf,
    /// Judgment file: objectId,queryId,documentId rows
    #[arg(long, default_value = "objects.numerate.txt")]
    pub objects_file: PathBuf,
    /// Output CSV with ObjectId,Relevance rows
    #[arg(long, default_value = "output.csv")]
    pub submission_file: PathBuf,
    /// Relevance decision rule
    #[arg(long, value_enum, default_value = "soft")]
    pub mode: Mode,
    /// Minimum fraction of matching clauses in soft mode
    #[arg(long, default_value_t = 0.2)]
    pub tau: f64,
    /// Posting set representation
    #[arg(long, value_enum, default_value = "sorted")]
    pub postings: Representation,
}

pub fn run(args: &Args) -> Result<()> {
    match args.postings {
        Representation::Sorted => run_with::<SortedPostings>(args),
        Representation::Hashed => run_with::<HashedPostings>(args),
    }
}

fn run_with<S: PostingSet>(args: &Args) -> Result<()> {
    let index = read_corpus::<S>(&args.docs_file)?;
    let results = process_queries(&args.queries_file, &index, args.mode)?;
    write_submission(
        &args.objects_file,
        &args.submission_file,
        &results,
        args.mode,
        args.tau,
    )
}

/// Builds the index from the corpus. Field 0 of every line is the raw
/// document key and is skipped; doc ids come from line order, starting at 1.
pub fn read_corpus<S: PostingSet>(path: &Path) -> Result<InvertedIndex<S>> {
    let file = File::open(path).with_context(|| format!("opening corpus {}", path.display()))?;
    let mut index = InvertedIndex::new();
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("reading corpus {}", path.display()))?;
        let doc_id = (line_no + 1) as DocId;
        let mut fields = line.split('\t');
        fields.next();
        index.add_document(doc_id, fields);
    }
    tracing::info!(
        docs = index.doc_count(),
        terms = index.term_count(),
        "corpus indexed"
    );
    Ok(index)
}

/// Evaluates every query against the shared index. Queries are independent,
/// so evaluation fans out across the rayon pool; a malformed query is
/// logged and left out of the store.
pub fn process_queries<S: PostingSet>(
    path: &Path,
    index: &InvertedIndex<S>,
    mode: Mode,
) -> Result<SearchResults<S>> {
    let file = File::open(path).with_context(|| format!("opening queries {}", path.display()))?;
    let mut queries: Vec<(QueryId, String)> = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.with_context(|| format!("reading queries {}", path.display()))?;
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split('\t');
        let id = fields.next().and_then(|field| field.parse::<QueryId>().ok());
        match (id, fields.next()) {
            (Some(id), Some(expression)) => queries.push((id, expression.to_owned())),
            _ => tracing::warn!(line = %line, "skipping malformed query line"),
        }
    }

    let evaluated: Vec<(QueryId, Result<Vec<S>, QueryError>)> = queries
        .par_iter()
        .map(|(id, expression)| {
            let outcome = match mode {
                Mode::Exact => evaluate(expression, index).map(|set| vec![set]),
                Mode::Soft => evaluate_clauses(expression, index),
            };
            (*id, outcome)
        })
        .collect();

    let mut results = SearchResults::new();
    for (id, outcome) in evaluated {
        match outcome {
            Ok(clauses) => results.insert(id, clauses),
            Err(error) => tracing::warn!(query = id, %error, "skipping malformed query"),
        }
    }
    tracing::info!(queries = results.len(), "queries evaluated");
    Ok(results)
}

#[derive(Serialize)]
struct SubmissionRow<'a> {
    #[serde(rename = "ObjectId")]
    object_id: &'a str,
    #[serde(rename = "Relevance")]
    relevance: u8,
}

/// Scores each judgment row against the stored results. Rows with a
/// non-integer object id (the header among them), a document id without a
/// trailing digit run, or a query that was never evaluated are skipped,
/// never emitted with a defaulted relevance.
pub fn write_submission<S: PostingSet>(
    objects_path: &Path,
    submission_path: &Path,
    results: &SearchResults<S>,
    mode: Mode,
    tau: f64,
) -> Result<()> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(objects_path)
        .with_context(|| format!("opening judgments {}", objects_path.display()))?;
    let mut writer = csv::Writer::from_path(submission_path)
        .with_context(|| format!("creating submission {}", submission_path.display()))?;

    for record in reader.records() {
        let record =
            record.with_context(|| format!("reading judgments {}", objects_path.display()))?;
        let (Some(object_id), Some(query_id), Some(document_id)) =
            (record.get(0), record.get(1), record.get(2))
        else {
            tracing::warn!(row = ?record, "skipping short judgment row");
            continue;
        };
        if object_id.is_empty() || !object_id.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        let Ok(query_id) = query_id.trim().parse::<QueryId>() else {
            tracing::warn!(object_id, "skipping row with non-integer query id");
            continue;
        };
        let Some(doc_id) = parse_doc_id(document_id) else {
            tracing::warn!(object_id, document_id, "skipping row without document digits");
            continue;
        };
        let relevant = match mode {
            Mode::Exact => results.member(query_id, doc_id),
            Mode::Soft => results.overlap(query_id, doc_id, tau),
        };
        let Some(relevant) = relevant else {
            tracing::warn!(object_id, query = query_id, "skipping row for unevaluated query");
            continue;
        };
        writer.serialize(SubmissionRow {
            object_id,
            relevance: relevant as u8,
        })?;
    }
    writer
        .flush()
        .with_context(|| format!("writing submission {}", submission_path.display()))?;
    Ok(())
}

/// Judgment document ids can be arbitrary strings ending in the numeric id;
/// the trailing digit run is the id.
fn parse_doc_id(raw: &str) -> Option<DocId> {
    TRAILING_DIGITS
        .find(raw.trim())
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_id_is_the_trailing_digit_run() {
        assert_eq!(parse_doc_id("doc123"), Some(123));
        assert_eq!(parse_doc_id("17"), Some(17));
        assert_eq!(parse_doc_id(" d5x9 "), Some(9));
        assert_eq!(parse_doc_id("doc12a"), None);
        assert_eq!(parse_doc_id(""), None);
    }
}
