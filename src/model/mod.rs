// Topic model: Gibbs-sampled LDA and its tidy distribution tables.

pub mod lda;
pub mod special;
pub mod tidy;

pub use lda::{LdaModel, LdaParams};
pub use tidy::{top_terms_from_beta, BetaRow, GammaRow, TopicTerms};
