//! `nasch-output` — run-timing result writers.
//!
//! | Module     | Contents                                            |
//! |------------|-----------------------------------------------------|
//! | [`row`]    | `RunResultRow`, one line per timed run              |
//! | [`writer`] | `OutputWriter` trait                                |
//! | [`csv`]    | `CsvWriter`, creates `results.csv`                  |
//! | [`error`]  | `OutputError`                                       |
//!
//! # Usage
//!
//! ```rust,ignore
//! use nasch_output::{CsvWriter, OutputWriter, RunResultRow};
//!
//! let mut writer = CsvWriter::new(Path::new("./output"))?;
//! writer.write_result(&RunResultRow::new("Sequential", &config, elapsed_secs))?;
//! writer.finish()?;
//! ```

pub mod csv;
pub mod error;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use row::RunResultRow;
pub use writer::OutputWriter;
