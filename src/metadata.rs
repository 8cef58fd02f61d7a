//! # Metadata Module
//!
//! Records what a run recovered: one JSONL line per dumped segment plus a
//! run summary, so results can be audited without re-scanning the inputs.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use serde::Serialize;
use thiserror::Error;

/// Error recording metadata.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Writer lock was poisoned (another thread panicked while holding it)
    #[error("metadata writer poisoned")]
    Poisoned,
}

/// One recovered segment, as recorded in `segments.jsonl`.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentRecord {
    pub run_id: String,
    /// Host file the segment was recovered from
    pub source: String,
    /// Detection order within the host file
    pub seq: u32,
    /// Absolute start offset in the host file
    pub global_start: u64,
    /// Bytes dumped
    pub size: u64,
    /// `le` or `be`, from the scan's root signature
    pub byte_order: &'static str,
    /// Sanitized label, when one was recovered
    pub label: Option<String>,
    /// Output file, relative to the run directory
    pub path: String,
    /// Hex SHA-256 of the dumped bytes
    pub sha256: String,
}

/// End-of-run totals, as recorded in `run.jsonl`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub files_processed: u64,
    pub segments_found: u64,
    pub segments_written: u64,
    pub bytes_written: u64,
}

/// Sink for run metadata. Implementations must tolerate concurrent calls;
/// the pipeline records from its worker threads.
pub trait MetadataSink: Send + Sync {
    fn record_segment(&self, record: &SegmentRecord) -> Result<(), MetadataError>;
    fn record_summary(&self, summary: &RunSummary) -> Result<(), MetadataError>;
}

/// JSON-lines sink writing `segments.jsonl` and `run.jsonl` into the run
/// output directory.
pub struct JsonlSink {
    tool_version: String,
    config_hash: String,
    segments: Mutex<BufWriter<File>>,
    run: Mutex<BufWriter<File>>,
}

#[derive(Serialize)]
struct SegmentLine<'a> {
    #[serde(flatten)]
    record: &'a SegmentRecord,
    tool_version: &'a str,
    config_hash: &'a str,
}

#[derive(Serialize)]
struct SummaryLine<'a> {
    #[serde(flatten)]
    summary: &'a RunSummary,
    tool_version: &'a str,
    config_hash: &'a str,
}

impl JsonlSink {
    pub fn create(
        dir: &Path,
        tool_version: &str,
        config_hash: &str,
    ) -> Result<Self, MetadataError> {
        let segments = BufWriter::new(File::create(dir.join("segments.jsonl"))?);
        let run = BufWriter::new(File::create(dir.join("run.jsonl"))?);
        Ok(Self {
            tool_version: tool_version.to_string(),
            config_hash: config_hash.to_string(),
            segments: Mutex::new(segments),
            run: Mutex::new(run),
        })
    }

    fn write_line<T: Serialize>(
        writer: &Mutex<BufWriter<File>>,
        line: &T,
    ) -> Result<(), MetadataError> {
        let json = serde_json::to_string(line)?;
        let mut guard = writer.lock().map_err(|_| MetadataError::Poisoned)?;
        writeln!(guard, "{json}")?;
        guard.flush()?;
        Ok(())
    }
}

impl MetadataSink for JsonlSink {
    fn record_segment(&self, record: &SegmentRecord) -> Result<(), MetadataError> {
        Self::write_line(
            &self.segments,
            &SegmentLine {
                record,
                tool_version: &self.tool_version,
                config_hash: &self.config_hash,
            },
        )
    }

    fn record_summary(&self, summary: &RunSummary) -> Result<(), MetadataError> {
        Self::write_line(
            &self.run,
            &SummaryLine {
                summary,
                tool_version: &self.tool_version,
                config_hash: &self.config_hash,
            },
        )
    }
}
