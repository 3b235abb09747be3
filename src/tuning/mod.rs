// Topic-count selection: fit metrics and the concurrent candidate sweep.

pub mod metrics;
pub mod sweep;

pub use metrics::{Direction, Metric};
pub use sweep::{run_sweep, SweepConfig, SweepRow, SweepTable};
