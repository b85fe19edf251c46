//! CSV output backend.
//!
//! Creates `results.csv` in the configured output directory.

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::Writer;
use tracing::debug;

use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult, RunResultRow};

/// File name created inside the output directory.
pub const RESULTS_FILE: &str = "results.csv";

/// Column names, in write order.
pub const HEADER: [&str; 8] = [
    "strategy",
    "road_length",
    "density",
    "sim_steps",
    "v_max",
    "p_slowdown",
    "num_units",
    "elapsed_secs",
];

/// Writes run results to a single CSV file.
pub struct CsvWriter {
    path:     PathBuf,
    results:  Writer<File>,
    rows:     usize,
    finished: bool,
}

impl CsvWriter {
    /// Create `dir` if needed, then create (or truncate) `results.csv` in it
    /// and write the header row.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(RESULTS_FILE);
        let mut results = Writer::from_path(&path)?;
        results.write_record(HEADER)?;

        Ok(Self {
            path,
            results,
            rows: 0,
            finished: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Data rows written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }
}

impl OutputWriter for CsvWriter {
    fn write_result(&mut self, row: &RunResultRow) -> OutputResult<()> {
        if self.finished {
            return Err(OutputError::Finished);
        }
        self.results.write_record(&[
            row.strategy.clone(),
            row.road_length.to_string(),
            row.density.to_string(),
            row.sim_steps.to_string(),
            row.v_max.to_string(),
            row.p_slowdown.to_string(),
            row.num_units.to_string(),
            format!("{:.6}", row.elapsed_secs),
        ])?;
        self.rows += 1;
        // Flushed per row so a sweep aborted midway keeps what it measured.
        self.results.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.results.flush()?;
        debug!(path = %self.path.display(), rows = self.rows, "results closed");
        Ok(())
    }
}
