//! Integration tests for nasch-output.

#[cfg(test)]
mod csv_tests {
    use nasch_core::RunConfig;
    use tempfile::TempDir;

    use crate::csv::{CsvWriter, HEADER, RESULTS_FILE};
    use crate::row::RunResultRow;
    use crate::writer::OutputWriter;
    use crate::OutputError;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn row(strategy: &str, units: usize, elapsed_secs: f64) -> RunResultRow {
        RunResultRow::new(strategy, &RunConfig::new(1_000, 0.3, 200, units), elapsed_secs)
    }

    fn read_back(dir: &TempDir) -> (Vec<String>, Vec<csv::StringRecord>) {
        let mut rdr = csv::Reader::from_path(dir.path().join(RESULTS_FILE)).unwrap();
        let headers = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        let rows = rdr.records().map(|r| r.unwrap()).collect();
        (headers, rows)
    }

    #[test]
    fn csv_file_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join(RESULTS_FILE).exists());
    }

    #[test]
    fn creates_missing_directory() {
        let dir = tmp();
        let nested = dir.path().join("a").join("b");
        let w = CsvWriter::new(&nested).unwrap();
        assert_eq!(w.path(), nested.join(RESULTS_FILE));
        assert!(w.path().exists());
    }

    #[test]
    fn csv_header_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let (headers, rows) = read_back(&dir);
        assert_eq!(headers, HEADER);
        assert!(rows.is_empty());
    }

    #[test]
    fn csv_result_rows() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_result(&row("Sequential", 1, 0.25)).unwrap();
        w.write_result(&row("Shared memory (4 units)", 4, 0.125)).unwrap();
        assert_eq!(w.rows(), 2);
        w.finish().unwrap();

        let (_, rows) = read_back(&dir);
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "Sequential");
        assert_eq!(&rows[0][1], "1000");  // road_length
        assert_eq!(&rows[0][2], "0.3");   // density
        assert_eq!(&rows[0][3], "200");   // sim_steps
        assert_eq!(&rows[0][4], "5");     // v_max
        assert_eq!(&rows[0][5], "0.3");   // p_slowdown
        assert_eq!(&rows[0][6], "1");     // num_units
        assert_eq!(&rows[0][7], "0.250000");
        assert_eq!(&rows[1][0], "Shared memory (4 units)");
        assert_eq!(&rows[1][6], "4");
    }

    #[test]
    fn rows_visible_before_finish() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_result(&row("Sequential", 1, 1.0)).unwrap();

        let (_, rows) = read_back(&dir);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn write_after_finish_rejected() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        assert!(matches!(w.write_result(&row("Sequential", 1, 0.0)), Err(OutputError::Finished)));
    }

    #[test]
    fn row_copies_config() {
        let cfg = RunConfig::new(5_000, 0.1, 50, 2).with_p_slowdown(0.5).with_v_max(7);
        let r = RunResultRow::new("Distributed (2 units)", &cfg, 3.5);
        assert_eq!(r.road_length, 5_000);
        assert_eq!(r.density, 0.1);
        assert_eq!(r.sim_steps, 50);
        assert_eq!(r.v_max, 7);
        assert_eq!(r.p_slowdown, 0.5);
        assert_eq!(r.num_units, 2);
        assert_eq!(r.elapsed_secs, 3.5);
    }
}
