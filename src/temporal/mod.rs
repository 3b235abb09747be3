// Topic trends over publication years.

pub mod aggregate;
pub mod series;

pub use aggregate::{aggregate_by_year, by_year, TopicYearMean};
pub use series::{Decomposition, YearSeries};
