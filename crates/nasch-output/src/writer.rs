//! The `OutputWriter` trait implemented by result backends.

use crate::{OutputResult, RunResultRow};

pub trait OutputWriter {
    /// Append one result row.
    fn write_result(&mut self, row: &RunResultRow) -> OutputResult<()>;

    /// Flush and close the underlying files.
    ///
    /// Idempotent.  Writing after `finish` is an error.
    fn finish(&mut self) -> OutputResult<()>;
}
