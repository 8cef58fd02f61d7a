//! End-to-end extraction over a synthetic host file.

mod common;

use common::{chunk_le, labl_for_extractor_le, riff_le};

use riffcarve::config::Config;
use riffcarve::metadata::JsonlSink;
use riffcarve::pipeline;
use riffcarve::segment::LengthMode;

/// Host file: junk, a labeled stream, more junk, an unlabeled stream.
fn build_host() -> (Vec<u8>, Vec<u8>, Vec<u8>) {
    let mut labeled_children = labl_for_extractor_le(1, b"snare_3");
    labeled_children.extend_from_slice(&chunk_le(b"data", b"0123456789abcdef"));
    let labeled = riff_le(b"WAVE", &labeled_children);

    let unlabeled = riff_le(b"WAVE", &chunk_le(b"data", b"unlabeled sound data"));

    let mut host = vec![0x5au8; 101];
    host.extend_from_slice(&labeled);
    host.extend_from_slice(&[0xa5u8; 57]);
    host.extend_from_slice(&unlabeled);
    host.extend_from_slice(&[0x00u8; 23]);
    (host, labeled, unlabeled)
}

fn test_config(workers: usize) -> Config {
    Config {
        run_id: "test-run".to_string(),
        length_mode: LengthMode::Declared,
        scan_labels: true,
        suffix: ".riff".to_string(),
        workers,
    }
}

#[test]
fn extracts_both_streams_with_label_naming() {
    let temp = tempfile::tempdir().expect("tempdir");
    let (host, labeled, unlabeled) = build_host();
    let input = temp.path().join("bundle.pck");
    std::fs::write(&input, &host).expect("write host");

    let run_dir = temp.path().join("out");
    std::fs::create_dir_all(&run_dir).expect("run dir");
    let sink = JsonlSink::create(&run_dir, "test", "").expect("sink");

    let cfg = test_config(1);
    let stats =
        pipeline::run_extract(&cfg, &[input.clone()], &run_dir, &sink).expect("pipeline");

    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.files_failed, 0);
    assert_eq!(stats.segments_found, 2);
    assert_eq!(stats.segments_written, 2);
    assert_eq!(
        stats.bytes_written,
        (labeled.len() + unlabeled.len()) as u64
    );

    let first = run_dir.join("bundle").join("000000_snare_3.riff");
    let second = run_dir.join("bundle").join("000001.riff");
    assert_eq!(std::fs::read(&first).expect("first dump"), labeled);
    assert_eq!(std::fs::read(&second).expect("second dump"), unlabeled);
}

#[test]
fn metadata_lines_describe_each_segment() {
    let temp = tempfile::tempdir().expect("tempdir");
    let (host, labeled, _) = build_host();
    let input = temp.path().join("bundle.pck");
    std::fs::write(&input, &host).expect("write host");

    let run_dir = temp.path().join("out");
    std::fs::create_dir_all(&run_dir).expect("run dir");
    let sink = JsonlSink::create(&run_dir, "test", "deadbeef").expect("sink");

    let cfg = test_config(1);
    pipeline::run_extract(&cfg, &[input], &run_dir, &sink).expect("pipeline");

    let text =
        std::fs::read_to_string(run_dir.join("segments.jsonl")).expect("segments.jsonl");
    let records: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).expect("json line"))
        .collect();
    assert_eq!(records.len(), 2);

    let first = records.iter().find(|r| r["seq"] == 0).expect("seq 0");
    assert_eq!(first["global_start"], 101);
    assert_eq!(first["size"], labeled.len() as u64);
    assert_eq!(first["byte_order"], "le");
    assert_eq!(first["label"], "snare_3");
    assert_eq!(first["path"], "bundle/000000_snare_3.riff");
    assert_eq!(first["config_hash"], "deadbeef");

    let second = records.iter().find(|r| r["seq"] == 1).expect("seq 1");
    assert_eq!(second["label"], serde_json::Value::Null);

    let summary = std::fs::read_to_string(run_dir.join("run.jsonl")).expect("run.jsonl");
    let summary: serde_json::Value =
        serde_json::from_str(summary.trim()).expect("summary json");
    assert_eq!(summary["run_id"], "test-run");
    assert_eq!(summary["segments_written"], 2);
}

#[test]
fn unreadable_input_is_counted_not_fatal() {
    let temp = tempfile::tempdir().expect("tempdir");
    let (host, _, _) = build_host();
    let good = temp.path().join("good.pck");
    std::fs::write(&good, &host).expect("write host");
    let missing = temp.path().join("missing.pck");

    let run_dir = temp.path().join("out");
    std::fs::create_dir_all(&run_dir).expect("run dir");
    let sink = JsonlSink::create(&run_dir, "test", "").expect("sink");

    let cfg = test_config(2);
    let stats =
        pipeline::run_extract(&cfg, &[good, missing], &run_dir, &sink).expect("pipeline");
    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.files_failed, 1);
    assert_eq!(stats.segments_written, 2);
}

#[test]
fn file_without_signatures_yields_nothing() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input = temp.path().join("noise.bin");
    std::fs::write(&input, vec![0x42u8; 4096]).expect("write noise");

    let run_dir = temp.path().join("out");
    std::fs::create_dir_all(&run_dir).expect("run dir");
    let sink = JsonlSink::create(&run_dir, "test", "").expect("sink");

    let cfg = test_config(1);
    let stats = pipeline::run_extract(&cfg, &[input], &run_dir, &sink).expect("pipeline");
    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.segments_found, 0);
    assert_eq!(stats.segments_written, 0);
    // No per-file directory is created for an empty pass.
    assert!(!run_dir.join("noise").exists());
}

#[test]
fn heuristic_mode_splits_at_next_signature_despite_corrupt_size() {
    let temp = tempfile::tempdir().expect("tempdir");

    // First stream lies about its size; second is honest.
    let mut first = Vec::new();
    first.extend_from_slice(b"RIFF");
    first.extend_from_slice(&u32::MAX.to_le_bytes());
    first.extend_from_slice(b"WAVEcorrupt size");
    let second = riff_le(b"WAVE", &chunk_le(b"data", b"fine"));
    let mut host = first.clone();
    host.extend_from_slice(&second);

    let input = temp.path().join("corrupt.pck");
    std::fs::write(&input, &host).expect("write host");

    let run_dir = temp.path().join("out");
    std::fs::create_dir_all(&run_dir).expect("run dir");
    let sink = JsonlSink::create(&run_dir, "test", "").expect("sink");

    let mut cfg = test_config(1);
    cfg.length_mode = LengthMode::Heuristic;
    let stats = pipeline::run_extract(&cfg, &[input], &run_dir, &sink).expect("pipeline");
    assert_eq!(stats.segments_written, 2);

    let first_dump = std::fs::read(run_dir.join("corrupt").join("000000.riff")).expect("dump");
    assert_eq!(first_dump, first);
    let second_dump = std::fs::read(run_dir.join("corrupt").join("000001.riff")).expect("dump");
    assert_eq!(second_dump, second);
}
