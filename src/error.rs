// Labelled failure modes of the topic pipeline.
//
// Application code works in anyhow::Result; these variants exist so the
// conditions that used to surface as index faults or library crashes have a
// name, and so callers (and tests) can downcast to them.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    #[error("corpus directory {0} contains no documents")]
    EmptyCorpus(String),

    #[error("document {0} has no terms left; drop empty rows before fitting")]
    EmptyDocument(String),

    #[error("metadata not found for document {document}: {reason}")]
    MetadataNotFound { document: String, reason: String },

    #[error("year element for document {document} is not an integer: {value:?}")]
    InvalidYear { document: String, value: String },

    #[error("topic count must be at least 2, got {0}")]
    InvalidTopicCount(usize),

    #[error("at least one sampling iteration is required")]
    NoIterations,

    #[error("{name} prior must be positive and finite, got {value}")]
    InvalidPrior { name: &'static str, value: f64 },

    #[error("sparsity threshold must lie strictly between 0 and 1, got {0}")]
    InvalidSparsity(f64),

    #[error("series for topic {topic} has {len} points; decomposition needs at least {needed}")]
    SeriesTooShort {
        topic: usize,
        len: usize,
        needed: usize,
    },
}
