//! Persisting recovered stream segments.
//!
//! The extraction personality's sink: given a segment's byte range and
//! naming hints, writes one file per segment and hands back a typed record
//! for the metadata trail. Naming and persistence live here so the scanning
//! core stays free of I/O.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::segment::StreamSegment;

/// Outcome of persisting one segment.
#[derive(Debug, Clone)]
pub struct WrittenSegment {
    /// File name within the per-input output directory
    pub file_name: String,
    /// Full path the segment was written to
    pub path: PathBuf,
    /// Bytes written
    pub size: u64,
    /// Hex SHA-256 of the written bytes
    pub sha256: String,
}

/// Filename for a segment: sequence id, then the recovered label if any.
///
/// The sequence id always leads so two segments with the same label cannot
/// overwrite each other.
pub fn segment_file_name(seg: &StreamSegment, suffix: &str) -> String {
    match &seg.label {
        Some(label) => format!("{:06}_{label}{suffix}", seg.seq),
        None => format!("{:06}{suffix}", seg.seq),
    }
}

/// Write one segment's bytes under `dir`.
///
/// The caller guarantees `seg` was produced from `buf`, so the range is in
/// bounds by construction; it is still re-checked here before slicing.
pub fn write_segment(
    buf: &[u8],
    seg: &StreamSegment,
    dir: &Path,
    suffix: &str,
) -> io::Result<WrittenSegment> {
    let end = seg.offset.saturating_add(seg.len);
    let bytes = buf.get(seg.offset..end).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("segment {}..{} out of bounds", seg.offset, end),
        )
    })?;

    let file_name = segment_file_name(seg, suffix);
    let path = dir.join(&file_name);
    let mut file = File::create(&path)?;
    file.write_all(bytes)?;
    file.flush()?;

    Ok(WrittenSegment {
        file_name,
        path,
        size: bytes.len() as u64,
        sha256: hex::encode(Sha256::digest(bytes)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endian::ByteOrder;

    fn segment(seq: u32, offset: usize, len: usize, label: Option<&str>) -> StreamSegment {
        StreamSegment {
            seq,
            offset,
            len,
            order: ByteOrder::Little,
            label: label.map(str::to_string),
        }
    }

    #[test]
    fn names_use_sequence_then_label() {
        assert_eq!(
            segment_file_name(&segment(3, 0, 8, Some("kick_01")), ".riff"),
            "000003_kick_01.riff"
        );
        assert_eq!(segment_file_name(&segment(12, 0, 8, None), ".riff"), "000012.riff");
    }

    #[test]
    fn writes_exact_byte_range() {
        let dir = tempfile::tempdir().expect("tempdir");
        let buf = b"aaaaRIFFxxxxpayloadzzzz";
        let seg = segment(0, 4, 15, None);

        let written = write_segment(buf, &seg, dir.path(), ".riff").expect("write");
        assert_eq!(written.size, 15);
        let on_disk = std::fs::read(&written.path).expect("read back");
        assert_eq!(on_disk, &buf[4..19]);
    }

    #[test]
    fn digest_matches_written_bytes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let buf = b"RIFF\x04\x00\x00\x00WAVE";
        let seg = segment(0, 0, buf.len(), None);

        let written = write_segment(buf, &seg, dir.path(), ".riff").expect("write");
        let expected = hex::encode(sha2::Sha256::digest(buf.as_slice()));
        assert_eq!(written.sha256, expected);
    }

    #[test]
    fn out_of_bounds_range_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let seg = segment(0, 4, 1000, None);
        assert!(write_segment(b"short", &seg, dir.path(), ".riff").is_err());
    }

    #[test]
    fn duplicate_labels_get_distinct_files() {
        let a = segment_file_name(&segment(0, 0, 8, Some("loop")), ".riff");
        let b = segment_file_name(&segment(1, 0, 8, Some("loop")), ".riff");
        assert_ne!(a, b);
    }
}
