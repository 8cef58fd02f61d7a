//! Embedded-stream enumeration over a host buffer.
//!
//! There is no trusted directory of what a host file contains, so candidate
//! streams are found by signature alone. The first `RIFF` or `RIFX` hit
//! (whichever occurs earliest) fixes the byte order and the signature for
//! the whole scan; each subsequent hit becomes a segment.
//!
//! After emitting a segment the scan resumes 4 bytes past the hit, not
//! past the segment's end. A stream whose tail happens to contain another
//! signature-like sequence therefore produces overlapping detections. That
//! is the intended false-positive-tolerant policy: on real game bundles it
//! recovers streams a tighter scan would skip, at the cost of the odd
//! duplicate dump. Do not tighten it.

use serde::Deserialize;

use crate::constants::{MIN_STREAM_BYTES, RESCAN_SKIP, SIGNATURE_LEN};
use crate::endian::ByteOrder;
use crate::fourcc::{self, FourCc};
use crate::label;
use crate::scanner;

/// How a candidate stream's length is determined.
///
/// This is a configuration choice, never auto-detected: `Declared` trusts
/// each stream's own size field (clamped to the buffer), `Heuristic`
/// measures the distance to the next signature hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthMode {
    Declared,
    Heuristic,
}

/// One candidate embedded stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSegment {
    /// Sequence id within the host file, in detection order
    pub seq: u32,
    /// Absolute start offset within the host buffer
    pub offset: usize,
    /// Selected length, clamped to the buffer
    pub len: usize,
    /// Byte order fixed by the scan's first hit
    pub order: ByteOrder,
    /// Sanitized label recovered from the segment, if any
    pub label: Option<String>,
}

/// Enumerate candidate streams in `buf`.
///
/// Zero segments when neither signature occurs. The scan ends when no
/// further hit exists or fewer than [`MIN_STREAM_BYTES`] remain past one.
/// Malformed size fields clamp; they never fail the scan.
pub fn segment_streams(buf: &[u8], mode: LengthMode, scan_labels: bool) -> Vec<StreamSegment> {
    let riff = scanner::find(buf, fourcc::RIFF.as_bytes(), 0);
    let rifx = scanner::find(buf, fourcc::RIFX.as_bytes(), 0);
    let (signature, order, first) = match (riff, rifx) {
        (Some(le), Some(be)) if le <= be => (fourcc::RIFF, ByteOrder::Little, le),
        (Some(le), None) => (fourcc::RIFF, ByteOrder::Little, le),
        (_, Some(be)) => (fourcc::RIFX, ByteOrder::Big, be),
        (None, None) => return Vec::new(),
    };

    let mut segments = Vec::new();
    let mut hit = Some(first);
    while let Some(offset) = hit {
        if buf.len() - offset < MIN_STREAM_BYTES {
            break;
        }
        let len = match mode {
            LengthMode::Declared => declared_len(buf, offset, order),
            LengthMode::Heuristic => heuristic_len(buf, offset, signature),
        };
        let label = if scan_labels {
            label::extract_label(&buf[offset..offset + len], order)
        } else {
            None
        };
        segments.push(StreamSegment {
            seq: segments.len() as u32,
            offset,
            len,
            order,
            label,
        });
        hit = scanner::find(buf, signature.as_bytes(), offset + RESCAN_SKIP);
    }
    segments
}

/// Header length plus the stream's own size field, clamped to the buffer.
fn declared_len(buf: &[u8], offset: usize, order: ByteOrder) -> usize {
    let available = buf.len() - offset;
    let declared = order
        .read_u32_at(buf, offset + SIGNATURE_LEN)
        .unwrap_or(0) as usize;
    declared.saturating_add(8).min(available)
}

/// Distance to the next same-signature hit, or the rest of the buffer.
fn heuristic_len(buf: &[u8], offset: usize, signature: FourCc) -> usize {
    match scanner::find(buf, signature.as_bytes(), offset + RESCAN_SKIP) {
        Some(next) => next - offset,
        None => buf.len() - offset,
    }
}
