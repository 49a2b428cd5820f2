//! Hand-off of a finished dataset to storage

use crate::data::{Candle, CombinedDataset};
use crate::error::{PullError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// One stored row: the candle plus its sequential index
#[derive(Debug, Serialize)]
pub struct IndexedRow<'a> {
    pub index: usize,
    pub time: &'a DateTime<Utc>,
    pub low: f64,
    pub high: f64,
    pub open: f64,
    pub close: f64,
    pub volume: f64,
}

impl<'a> IndexedRow<'a> {
    fn new(index: usize, candle: &'a Candle) -> Self {
        Self {
            index,
            time: &candle.time,
            low: candle.low,
            high: candle.high,
            open: candle.open,
            close: candle.close,
            volume: candle.volume,
        }
    }
}

/// Write one JSON object per row. Returns the number of rows written.
pub fn write_json_lines<W: Write>(dataset: &CombinedDataset, mut writer: W) -> Result<usize> {
    for (index, candle) in dataset.rows() {
        serde_json::to_writer(&mut writer, &IndexedRow::new(index, candle))?;
        writer
            .write_all(b"\n")
            .map_err(|e| PullError::io(format!("Failed to write row {}", index), e))?;
    }
    writer.flush().map_err(|e| PullError::io("Failed to flush rows", e))?;
    Ok(dataset.len())
}

/// Write the dataset as JSON lines to a file, replacing it if present
pub fn write_json_lines_to_path(dataset: &CombinedDataset, path: &Path) -> Result<usize> {
    let file = File::create(path)
        .map_err(|e| PullError::io(format!("Failed to create {}", path.display()), e))?;
    let written = write_json_lines(dataset, BufWriter::new(file))?;

    info!("Wrote {} rows for {} to {}", written, dataset.symbol(), path.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ChunkCandles, Granularity};
    use crate::planner::Chunk;
    use chrono::TimeZone;

    fn dataset() -> CombinedDataset {
        let start = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2021, 1, 1, 0, 2, 0).unwrap();
        let candles = vec![
            Candle::new(start + chrono::Duration::minutes(1), 2.0, 4.0, 3.0, 3.5, 10.0),
            Candle::new(start, 1.0, 3.0, 2.0, 2.5, 5.0),
        ];
        CombinedDataset::from_chunks(
            "BTC-USD",
            Granularity::OneMinute,
            start,
            end,
            vec![ChunkCandles {
                chunk: Chunk { index: 0, start, end },
                candles,
            }],
        )
    }

    #[test]
    fn test_write_json_lines() {
        let mut buf = Vec::new();
        let written = write_json_lines(&dataset(), &mut buf).unwrap();
        assert_eq!(written, 2);

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["index"], 0);
        assert_eq!(lines[0]["time"], "2021-01-01T00:00:00Z");
        assert_eq!(lines[0]["close"], 2.5);
        assert_eq!(lines[1]["index"], 1);
        assert_eq!(lines[1]["volume"], 10.0);
    }

    #[test]
    fn test_write_json_lines_to_path() {
        let path = std::env::temp_dir().join(format!("gdax_history_storage_{}.jsonl", std::process::id()));
        let written = write_json_lines_to_path(&dataset(), &path).unwrap();
        assert_eq!(written, 2);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let path = std::env::temp_dir().join("gdax_history_missing_dir").join("rows.jsonl");
        let err = write_json_lines_to_path(&dataset(), &path).unwrap_err();
        match err {
            PullError::Io { context, source } => {
                assert!(context.contains("rows.jsonl"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected Io, got {:?}", other),
        }
    }
}
