// topictrend: topic modeling and topic-trend analysis for dated corpora.
//
// This is the library root. Each module corresponds to one stage of the
// corpus -> topic model -> trend pipeline.

pub mod config;
pub mod corpus;
pub mod error;
pub mod matrix;
pub mod metadata;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod status;
pub mod temporal;
pub mod tuning;
