// Unit tests for corpus loading, normalization and vectorizing.
//
// Tests the text path from raw files to the document-term matrix: file
// ordering, the fixed normalization order, whole-word stopword removal,
// idempotence, and the vocabulary produced from small corpora.

use std::fs;

use proptest::prelude::*;

use topictrend::corpus::loader::load_corpus;
use topictrend::corpus::normalize::Normalizer;
use topictrend::corpus::{Document, NormalizedDocument};
use topictrend::matrix::{DocumentTermMatrix, DEFAULT_MIN_WORD_LEN};

fn doc(id: &str, text: &str) -> Document {
    Document {
        id: id.to_string(),
        text: text.to_string(),
    }
}

// ============================================================
// Loader
// ============================================================

#[test]
fn loader_orders_by_file_name() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b.txt"), "second").unwrap();
    fs::write(dir.path().join("a.txt"), "first").unwrap();
    fs::write(dir.path().join("c.txt"), "third").unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();

    let docs = load_corpus(dir.path()).unwrap();
    let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["a.txt", "b.txt", "c.txt"]);
    assert_eq!(docs[0].text, "first");
}

#[test]
fn loader_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_corpus(&dir.path().join("nope")).is_err());
}

// ============================================================
// Normalizer
// ============================================================

#[test]
fn english_stoplist_removes_function_words() {
    let normalizer = Normalizer::new(&[]);
    assert!(normalizer.is_stopword("the"));
    assert!(normalizer.is_stopword("and"));
    assert!(!normalizer.is_stopword("cat"));
}

#[test]
fn normalization_strips_digits_and_punctuation() {
    let normalizer = Normalizer::with_stopwords(["the"]);
    assert_eq!(
        normalizer.normalize("The 3 Wars, of 1914-1918!"),
        "wars of"
    );
}

#[test]
fn normalization_collapses_whitespace() {
    let normalizer = Normalizer::with_stopwords(Vec::<String>::new());
    assert_eq!(normalizer.normalize("  one \t two\n\nthree  "), "one two three");
}

#[test]
fn normalize_corpus_keeps_ids_and_order() {
    let normalizer = Normalizer::with_stopwords(["and"]);
    let out = normalizer.normalize_corpus(&[doc("x", "Salt AND Pepper"), doc("y", "")]);
    assert_eq!(
        out,
        vec![
            NormalizedDocument {
                id: "x".into(),
                text: "salt pepper".into()
            },
            NormalizedDocument {
                id: "y".into(),
                text: String::new()
            },
        ]
    );
}

proptest! {
    #[test]
    fn normalization_is_idempotent(text in "[a-zA-Z0-9 ,.;'!?éÉ-]{0,80}") {
        let normalizer = Normalizer::with_stopwords(["the", "and", "a", "of", "don't"]);
        let once = normalizer.normalize(&text);
        let twice = normalizer.normalize(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalized_text_has_no_digits_or_stopwords(text in "[a-z0-9 ]{0,60}") {
        let normalizer = Normalizer::with_stopwords(["the", "and"]);
        let out = normalizer.normalize(&text);
        prop_assert!(!out.chars().any(|c| c.is_ascii_digit()));
        prop_assert!(out.split_whitespace().all(|w| w != "the" && w != "and"));
    }
}

// ============================================================
// Vectorizer scenarios
// ============================================================

#[test]
fn stopwords_absent_and_no_stemming() {
    let normalizer = Normalizer::new(&[]);
    let docs = normalizer.normalize_corpus(&[
        doc("1.txt", "the cat sat"),
        doc("2.txt", "the dog ran"),
        doc("3.txt", "cats and dogs"),
    ]);
    let dtm = DocumentTermMatrix::from_documents(&docs, DEFAULT_MIN_WORD_LEN);
    let terms = dtm.terms();

    assert!(!terms.iter().any(|t| t == "the"));
    assert!(!terms.iter().any(|t| t == "and"));
    assert!(terms.iter().any(|t| t == "cat"));
    assert!(terms.iter().any(|t| t == "cats"));

    let mut sorted = terms.to_vec();
    sorted.sort();
    assert_eq!(sorted, terms);
}

#[test]
fn row_sums_match_kept_tokens() {
    let normalizer = Normalizer::with_stopwords(["the"]);
    let docs = normalizer.normalize_corpus(&[
        doc("a", "river river bank"),
        doc("b", "the bank of the river"),
    ]);
    let dtm = DocumentTermMatrix::from_documents(&docs, DEFAULT_MIN_WORD_LEN);

    // "of" is shorter than the minimum word length
    assert_eq!(dtm.terms(), &["bank".to_string(), "river".to_string()]);
    assert_eq!(dtm.document_lengths(), vec![3, 2]);
    assert_eq!(dtm.term_frequencies(), vec![2, 3]);
    assert_eq!(dtm.document_frequencies(), vec![2, 2]);
}
