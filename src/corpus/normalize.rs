// Text normalization ahead of vectorizing.
//
// The pass order is fixed: lowercase, stopwords, digits, punctuation,
// whitespace. Changing it changes the vocabulary (stopwords glued to
// punctuation, hyphenated numerics), so downstream results are only
// reproducible when the order holds.
//
// Stopwords are removed as whole words, bounded by non-word characters in
// the *lowercased* text, the same way a `\b(word|...)\b` replacement would.
// Entries such as "don't" therefore match across their apostrophe.

use std::collections::HashSet;

use regex_lite::Regex;
use stop_words::{get, LANGUAGE};
use tracing::info;

use super::{Document, NormalizedDocument};

/// Normalizer holding the compiled stoplist and character-class patterns.
pub struct Normalizer {
    stopwords: HashSet<String>,
    /// Longest stopword, in chars; bounds the match window
    max_stopword_chars: usize,
    digits: Regex,
    punctuation: Regex,
    whitespace: Regex,
}

impl Normalizer {
    /// English stopwords from the `stop-words` crate plus `extra` terms.
    pub fn new(extra: &[String]) -> Self {
        let english: Vec<String> = get(LANGUAGE::English);
        let normalizer = Self::with_stopwords(english.iter().chain(extra.iter()));
        info!(
            stopwords = normalizer.stopwords.len(),
            extra = extra.len(),
            "Stoplist ready"
        );
        normalizer
    }

    /// Build a normalizer from an explicit stoplist only.
    pub fn with_stopwords<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stopwords: HashSet<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        let max_stopword_chars = stopwords
            .iter()
            .map(|w| w.chars().count())
            .max()
            .unwrap_or(0);

        Self {
            stopwords,
            max_stopword_chars,
            digits: Regex::new(r"[[:digit:]]+").expect("static pattern"),
            punctuation: Regex::new(r"[[:punct:]]+").expect("static pattern"),
            whitespace: Regex::new(r"[[:space:]]+").expect("static pattern"),
        }
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// Normalize one text.
    ///
    /// The ordered pass is repeated until it no longer changes the text:
    /// digit or punctuation removal can expose a stopword ("t1he" -> "the"),
    /// and a second pass must not find anything left to remove. After the
    /// first pass every change strictly shortens the text, so this ends.
    pub fn normalize(&self, text: &str) -> String {
        let mut current = self.pass(text);
        loop {
            let next = self.pass(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    pub fn normalize_corpus(&self, documents: &[Document]) -> Vec<NormalizedDocument> {
        documents
            .iter()
            .map(|doc| NormalizedDocument {
                id: doc.id.clone(),
                text: self.normalize(&doc.text),
            })
            .collect()
    }

    fn pass(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let without_stopwords = self.remove_stopwords(&lowered);
        let without_digits = self.digits.replace_all(&without_stopwords, "");
        let without_punct = self.punctuation.replace_all(&without_digits, "");
        let without_punct: String = without_punct
            .chars()
            .filter(|c| !is_general_punctuation(*c))
            .collect();
        self.whitespace
            .replace_all(&without_punct, " ")
            .trim()
            .to_string()
    }

    fn remove_stopwords(&self, text: &str) -> String {
        if self.stopwords.is_empty() {
            return text.to_string();
        }

        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut out = String::with_capacity(text.len());
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i].1;
            let at_word_start = is_word_char(c) && (i == 0 || !is_word_char(chars[i - 1].1));
            if at_word_start {
                if let Some(end) = self.longest_stopword_at(text, &chars, i) {
                    i = end;
                    continue;
                }
            }
            out.push(c);
            i += 1;
        }

        out
    }

    /// Index (in `chars`) just past the longest stopword starting at `i`
    /// that also ends on a word boundary.
    fn longest_stopword_at(&self, text: &str, chars: &[(usize, char)], i: usize) -> Option<usize> {
        let start = chars[i].0;
        let limit = (i + self.max_stopword_chars).min(chars.len());
        let mut best = None;

        for j in (i + 1)..=limit {
            let ends_word = is_word_char(chars[j - 1].1);
            let followed_by_boundary = j == chars.len() || !is_word_char(chars[j].1);
            if ends_word && followed_by_boundary {
                let end = chars.get(j).map(|(b, _)| *b).unwrap_or(text.len());
                if self.stopwords.contains(&text[start..end]) {
                    best = Some(j);
                }
            }
        }

        best
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Typographic punctuation outside ASCII: curly quotes, dashes, ellipses,
/// guillemets and inverted marks.
fn is_general_punctuation(c: char) -> bool {
    matches!(c, '\u{2010}'..='\u{2027}' | '\u{2030}'..='\u{205E}' | '«' | '»' | '¡' | '¿' | '·')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Normalizer {
        Normalizer::with_stopwords(["the", "and", "a", "don't", "of"])
    }

    #[test]
    fn test_order_of_passes() {
        let n = small();
        assert_eq!(n.normalize("The  Cat, sat!"), "cat sat");
        // Digits go before punctuation: "1-2-3" leaves only hyphens, then nothing
        assert_eq!(n.normalize("route 1-2-3 north"), "route north");
        // Hyphenated words are joined, not split
        assert_eq!(n.normalize("well-known"), "wellknown");
    }

    #[test]
    fn test_stopwords_whole_words_only() {
        let n = small();
        assert_eq!(n.normalize("theory andes"), "theory andes");
        assert_eq!(n.normalize("I don't know"), "i know");
    }

    #[test]
    fn test_exposed_stopword_removed() {
        let n = small();
        assert_eq!(n.normalize("t1he cat"), "cat");
    }

    #[test]
    fn test_no_stemming() {
        let n = small();
        assert_eq!(n.normalize("cats and dogs"), "cats dogs");
    }

    #[test]
    fn test_typographic_punctuation() {
        let n = small();
        assert_eq!(n.normalize("“quoted” — text…"), "quoted text");
    }

    #[test]
    fn test_extra_stopwords_are_lowercased() {
        let n = Normalizer::with_stopwords(["Journal", " Press "]);
        assert_eq!(n.normalize("journal of the press"), "of the");
    }
}
