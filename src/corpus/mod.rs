// Corpus loading and text normalization.

pub mod loader;
pub mod normalize;

/// A raw document as read from disk. Immutable after load.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// File name, used as the document identifier everywhere downstream
    pub id: String,
    pub text: String,
}

/// A document after the normalization pass. Derived from a `Document`,
/// never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDocument {
    pub id: String,
    pub text: String,
}

impl NormalizedDocument {
    /// Whitespace tokens of the normalized text.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.text.split_whitespace()
    }
}
