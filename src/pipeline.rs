//! # Pipeline Module
//!
//! Orchestrates the extraction run: one independent pass per input host
//! file. Each pass owns its buffer and derives its own byte order, so the
//! passes share nothing and run in parallel on a bounded worker pool. All
//! side effects happen in the sinks (segment files, metadata); the scanning
//! core stays pure.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::Config;
use crate::metadata::{MetadataSink, RunSummary, SegmentRecord};
use crate::segment::{self, StreamSegment};
use crate::writer;

/// Pipeline statistics collected during a run
#[derive(Debug, Clone)]
pub struct PipelineStats {
    pub files_processed: u64,
    pub files_failed: u64,
    pub segments_found: u64,
    pub segments_written: u64,
    pub bytes_written: u64,
}

/// Run the extraction pipeline over `inputs`.
///
/// A failure on one input file, or on one segment's write, is logged and
/// skipped; the run continues. Only setup failures (worker pool, metadata
/// sink) abort the whole run.
pub fn run_extract(
    cfg: &Config,
    inputs: &[PathBuf],
    run_output_dir: &Path,
    sink: &dyn MetadataSink,
) -> Result<PipelineStats> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(cfg.workers.max(1))
        .build()
        .context("building worker pool")?;

    let files_processed = AtomicU64::new(0);
    let files_failed = AtomicU64::new(0);
    let segments_found = AtomicU64::new(0);
    let segments_written = AtomicU64::new(0);
    let bytes_written = AtomicU64::new(0);

    pool.install(|| {
        inputs.par_iter().for_each(|input| {
            match process_file(cfg, input, run_output_dir, sink) {
                Ok(counts) => {
                    files_processed.fetch_add(1, Ordering::Relaxed);
                    segments_found.fetch_add(counts.found, Ordering::Relaxed);
                    segments_written.fetch_add(counts.written, Ordering::Relaxed);
                    bytes_written.fetch_add(counts.bytes, Ordering::Relaxed);
                }
                Err(err) => {
                    files_failed.fetch_add(1, Ordering::Relaxed);
                    warn!("skipping {}: {err:#}", input.display());
                }
            }
        });
    });

    let stats = PipelineStats {
        files_processed: files_processed.load(Ordering::Relaxed),
        files_failed: files_failed.load(Ordering::Relaxed),
        segments_found: segments_found.load(Ordering::Relaxed),
        segments_written: segments_written.load(Ordering::Relaxed),
        bytes_written: bytes_written.load(Ordering::Relaxed),
    };

    let summary = RunSummary {
        run_id: cfg.run_id.clone(),
        files_processed: stats.files_processed,
        segments_found: stats.segments_found,
        segments_written: stats.segments_written,
        bytes_written: stats.bytes_written,
    };
    if let Err(err) = sink.record_summary(&summary) {
        warn!("failed to record run summary: {err}");
    }

    info!(
        "run_summary files_processed={} files_failed={} segments_found={} segments_written={} bytes_written={}",
        stats.files_processed,
        stats.files_failed,
        stats.segments_found,
        stats.segments_written,
        stats.bytes_written
    );

    Ok(stats)
}

struct FileCounts {
    found: u64,
    written: u64,
    bytes: u64,
}

/// One full pass over one host file: load, segment, dump, record.
fn process_file(
    cfg: &Config,
    input: &Path,
    run_output_dir: &Path,
    sink: &dyn MetadataSink,
) -> Result<FileCounts> {
    let buf = std::fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let segments = segment::segment_streams(&buf, cfg.length_mode, cfg.scan_labels);
    info!(
        "{}: {} candidate stream(s) in {} bytes",
        input.display(),
        segments.len(),
        buf.len()
    );

    let found = segments.len() as u64;
    if segments.is_empty() {
        return Ok(FileCounts {
            found,
            written: 0,
            bytes: 0,
        });
    }

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string());
    let file_dir = run_output_dir.join(&stem);
    std::fs::create_dir_all(&file_dir)
        .with_context(|| format!("creating {}", file_dir.display()))?;

    let mut written = 0u64;
    let mut bytes = 0u64;
    for seg in &segments {
        match writer::write_segment(&buf, seg, &file_dir, &cfg.suffix) {
            Ok(out) => {
                written += 1;
                bytes += out.size;
                record_segment(cfg, sink, input, seg, &stem, &out);
            }
            // One bad segment never aborts the file's pass.
            Err(err) => warn!(
                "{}: failed to write segment {}: {err}",
                input.display(),
                seg.seq
            ),
        }
    }

    Ok(FileCounts {
        found,
        written,
        bytes,
    })
}

fn record_segment(
    cfg: &Config,
    sink: &dyn MetadataSink,
    input: &Path,
    seg: &StreamSegment,
    stem: &str,
    out: &writer::WrittenSegment,
) {
    let record = SegmentRecord {
        run_id: cfg.run_id.clone(),
        source: input.display().to_string(),
        seq: seg.seq,
        global_start: seg.offset as u64,
        size: out.size,
        byte_order: seg.order.tag(),
        label: seg.label.clone(),
        path: format!("{stem}/{}", out.file_name),
        sha256: out.sha256.clone(),
    };
    if let Err(err) = sink.record_segment(&record) {
        warn!("{}: failed to record segment {}: {err}", input.display(), seg.seq);
    }
}
