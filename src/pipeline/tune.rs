// Topic-count sweep over the prepared corpus.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use super::{prepare_matrix, SWEEP_CSV};
use crate::config::Config;
use crate::output::tables::write_sweep_csv;
use crate::tuning::{run_sweep, SweepTable};

/// Prepare the matrix, run the sweep, and write `sweep.csv`.
pub async fn tune(config: &Config) -> Result<SweepTable> {
    let prepared = prepare_matrix(config)?;
    let dtm = Arc::new(prepared.matrix);

    let table = run_sweep(dtm, &config.sweep_config()).await?;

    let path = config.output_dir.join(SWEEP_CSV);
    write_sweep_csv(&path, &table.rows())?;
    info!(path = %path.display(), "Sweep scores written");

    Ok(table)
}
