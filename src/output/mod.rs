//! Record output: JSON lines appended to a timestamped file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tracing::debug;

use crate::models::Record;

/// Suffix of every output file name.
pub const OUTPUT_SUFFIX: &str = "-WODS.json";

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Output I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Destination for extracted records.
#[async_trait]
pub trait RecordSink: Send {
    async fn write(&mut self, record: &Record) -> Result<(), SinkError>;

    /// Flush buffered output.
    async fn finish(&mut self) -> Result<(), SinkError>;
}

/// Output file name for a run started at `at`: unix seconds with a
/// microsecond fraction, then the suffix.
pub fn output_file_name(at: DateTime<Utc>) -> String {
    format!(
        "{}.{:06}{}",
        at.timestamp(),
        at.timestamp_subsec_micros(),
        OUTPUT_SUFFIX
    )
}

/// One JSON object per line, opened in append mode.
pub struct JsonLinesSink {
    path: PathBuf,
    writer: BufWriter<File>,
    written: u64,
}

impl JsonLinesSink {
    /// Create a sink in `dir` named after the current time.
    pub async fn create(dir: &Path) -> Result<Self, SinkError> {
        Self::open(&dir.join(output_file_name(Utc::now()))).await
    }

    /// Open (or create) `path` for appending. Missing parent directories are
    /// created.
    pub async fn open(path: &Path) -> Result<Self, SinkError> {
        let io_err = |source| SinkError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(io_err)?;

        debug!("Writing records to {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records written through this sink.
    pub fn written(&self) -> u64 {
        self.written
    }

    fn io_err(&self, source: std::io::Error) -> SinkError {
        SinkError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl RecordSink for JsonLinesSink {
    async fn write(&mut self, record: &Record) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        if let Err(e) = self.writer.write_all(&line).await {
            return Err(self.io_err(e));
        }
        self.written += 1;
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), SinkError> {
        if let Err(e) = self.writer.flush().await {
            return Err(self.io_err(e));
        }
        Ok(())
    }
}

/// Write every record from `rx` until the channel closes, then flush.
///
/// `on_record` sees the running count after each write. Returns the number
/// of records written.
pub async fn drain<S, F>(
    rx: &mut mpsc::Receiver<Record>,
    sink: &mut S,
    mut on_record: F,
) -> Result<u64, SinkError>
where
    S: RecordSink + ?Sized,
    F: FnMut(u64) + Send,
{
    let mut count = 0;
    while let Some(record) = rx.recv().await {
        sink.write(&record).await?;
        count += 1;
        on_record(count);
    }
    sink.finish().await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScoreFacets, DATA_SOURCE};
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn record(id: &str) -> Record {
        Record {
            id: id.to_string(),
            title: Some(serde_json::Value::from("Fran")),
            facets: ScoreFacets {
                time: true,
                ..Default::default()
            },
            description: "21-15-9\nThrusters".to_string(),
            uploaded_at: None,
            datasource: DATA_SOURCE.to_string(),
        }
    }

    #[test]
    fn test_output_file_name() {
        let at = Utc.timestamp_opt(1_700_000_000, 42_000).unwrap();
        assert_eq!(output_file_name(at), "1700000000.000042-WODS.json");
    }

    #[tokio::test]
    async fn test_drain_writes_json_lines() {
        let dir = tempdir().unwrap();
        let mut sink = JsonLinesSink::create(dir.path()).await.unwrap();
        assert!(sink
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .ends_with(OUTPUT_SUFFIX));

        let (tx, mut rx) = mpsc::channel(4);
        tx.send(record("a")).await.unwrap();
        tx.send(record("b")).await.unwrap();
        drop(tx);

        let mut seen = Vec::new();
        assert_eq!(
            drain(&mut rx, &mut sink, |n| seen.push(n)).await.unwrap(),
            2
        );
        assert_eq!(seen, [1, 2]);
        assert_eq!(sink.written(), 2);

        let contents = std::fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<serde_json::Value> = contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["wod_id"], "a");
        assert_eq!(lines[1]["time_score"], true);
        assert_eq!(lines[1]["meta_datasource"], "wodwell");
    }

    #[tokio::test]
    async fn test_open_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("out-WODS.json");

        let mut sink = JsonLinesSink::open(&path).await.unwrap();
        sink.write(&record("a")).await.unwrap();
        sink.finish().await.unwrap();

        let mut sink = JsonLinesSink::open(&path).await.unwrap();
        sink.write(&record("b")).await.unwrap();
        sink.finish().await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
