use crate::structs::{HeartbeatSample, Result, RunSegment};
use csv::ReaderBuilder;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

/// Heartbeat telemetry plus the run mapping that segments it
#[derive(Debug, Clone, Default)]
pub struct TelemetryTables {
    pub samples: Vec<HeartbeatSample>,
    pub segments: Vec<RunSegment>,
}

impl TelemetryTables {
    /// Load both tables from CSV or TSV files
    ///
    /// # Errors
    /// Returns error if either file is unreadable or has a malformed row
    pub fn from_files(heartbeat: &Path, mapping: &Path, is_tsv: bool) -> Result<Self> {
        let samples: Vec<HeartbeatSample> = read_records(heartbeat, is_tsv)?;
        if let (Some(first), Some(last)) = (samples.first(), samples.last()) {
            debug!(
                first_tick = ?first.tick_number,
                last_tick = ?last.tick_number,
                first_elapsed_ns = ?first.elapsed_ns,
                last_elapsed_ns = ?last.elapsed_ns,
                "heartbeat table"
            );
        }

        Ok(Self {
            samples,
            segments: read_records(mapping, is_tsv)?,
        })
    }

    /// Interval durations of one segment, in row order
    ///
    /// Rows are 1-indexed and the range is inclusive. Rows beyond the end
    /// of the heartbeat table are ignored.
    #[must_use]
    pub fn segment_intervals(&self, segment: &RunSegment) -> Vec<f64> {
        let start = segment.hb_start_row.saturating_sub(1);
        let end = segment.hb_end_row.min(self.samples.len());
        if start >= end {
            return Vec::new();
        }
        self.samples[start..end]
            .iter()
            .map(|s| s.tick_interval_ns)
            .collect()
    }

    /// Interval sequences of every run belonging to `workload`
    #[must_use]
    pub fn workload_runs(&self, workload: &str) -> Vec<Vec<f64>> {
        self.segments
            .iter()
            .filter(|s| s.matches(workload))
            .map(|s| {
                let intervals = self.segment_intervals(s);
                debug!(
                    workload,
                    run_id = %s.run_id,
                    replicate = %s.replicate,
                    rows = intervals.len(),
                    "segment"
                );
                intervals
            })
            .collect()
    }
}

/// Deserialize every row of a delimited file into `T`, by header name
fn read_records<T: DeserializeOwned>(path: &Path, is_tsv: bool) -> Result<Vec<T>> {
    let delimiter = if is_tsv { b'\t' } else { b',' };

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::TwoCycleError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp file");
        file.write_all(content.as_bytes()).expect("write content");
        file
    }

    fn heartbeat_csv() -> NamedTempFile {
        create_test_csv(
            "tick_number,elapsed_ns,tick_interval_ns,cache_hits_delta\n\
             1,100,5000000000,0\n\
             2,200,1000,3\n\
             3,300,1002,1\n\
             4,400,998,0\n\
             5,500,1001,2\n\
             6,600,999,0\n",
        )
    }

    fn mapping_csv() -> NamedTempFile {
        create_test_csv(
            "run_id,init_script,replicate,hb_start_row,hb_end_row\n\
             1,init-stable.4th,1,1,3\n\
             2,init-omni.4th,1,4,6\n\
             3,init-stable.4th,2,5,9\n",
        )
    }

    #[test]
    fn test_load_tables() {
        let hb = heartbeat_csv();
        let map = mapping_csv();
        let tables = TelemetryTables::from_files(hb.path(), map.path(), false).expect("load");

        assert_eq!(tables.samples.len(), 6);
        assert_eq!(tables.segments.len(), 3);
        assert_eq!(tables.samples[1].tick_interval_ns, 1000.0);
        assert_eq!(tables.segments[1].init_script, "init-omni.4th");
    }

    #[test]
    fn test_segment_range_is_inclusive() {
        let hb = heartbeat_csv();
        let map = mapping_csv();
        let tables = TelemetryTables::from_files(hb.path(), map.path(), false).expect("load");

        let first = tables.segment_intervals(&tables.segments[0]);
        assert_eq!(first, vec![5_000_000_000.0, 1000.0, 1002.0]);

        // End row past the table is clipped
        let last = tables.segment_intervals(&tables.segments[2]);
        assert_eq!(last, vec![1001.0, 999.0]);
    }

    #[test]
    fn test_workload_runs_by_substring() {
        let hb = heartbeat_csv();
        let map = mapping_csv();
        let tables = TelemetryTables::from_files(hb.path(), map.path(), false).expect("load");

        assert_eq!(tables.workload_runs("stable").len(), 2);
        assert_eq!(tables.workload_runs("omni").len(), 1);
        assert!(tables.workload_runs("volatile").is_empty());
    }

    #[test]
    fn test_interval_only_heartbeat_table() {
        let hb = create_test_csv("tick_interval_ns\n1000\n1002\n");
        let map = mapping_csv();
        let tables = TelemetryTables::from_files(hb.path(), map.path(), false).expect("load");

        assert_eq!(tables.samples.len(), 2);
        assert_eq!(tables.samples[0].tick_number, None);
        assert_eq!(tables.samples[0].elapsed_ns, None);
        assert_eq!(tables.workload_runs("stable")[0], vec![1000.0, 1002.0]);

        let hb = create_test_csv("tick_number,tick_interval_ns\n1,1000\n2,1002\n");
        let tables = TelemetryTables::from_files(hb.path(), map.path(), false).expect("load");
        assert_eq!(tables.samples[1].tick_number, Some(2));
        assert_eq!(tables.samples[1].tick_interval_ns, 1002.0);
    }

    #[test]
    fn test_non_numeric_interval_is_fatal() {
        let hb = create_test_csv("tick_number,elapsed_ns,tick_interval_ns\n1,100,abc\n");
        let map = mapping_csv();
        let err = TelemetryTables::from_files(hb.path(), map.path(), false).unwrap_err();
        assert!(matches!(err, TwoCycleError::Csv(_)));
    }

    #[test]
    fn test_parse_tsv() {
        let hb = create_test_csv("tick_number\telapsed_ns\ttick_interval_ns\n1\t10\t1000\n");
        let map = create_test_csv(
            "run_id\tinit_script\treplicate\thb_start_row\thb_end_row\n1\tomni\t1\t1\t1\n",
        );
        let tables = TelemetryTables::from_files(hb.path(), map.path(), true).expect("load");
        assert_eq!(tables.workload_runs("omni"), vec![vec![1000.0]]);
    }
}
