//! Heuristic label recovery from a segment's bytes.
//!
//! Streams dumped from game bundles often carry a `labl` or `note` chunk
//! naming the asset. The segment is searched for the first such tag whose
//! declared length and termination look sane; the text is then sanitized
//! into something filename-safe. Absence of a usable label is normal, not
//! an error.

use crate::constants::{LABEL_MAX_LEN, LABEL_MIN_LEN, LABEL_TEXT_SKIP, SIGNATURE_LEN};
use crate::endian::ByteOrder;
use crate::fourcc;
use crate::scanner;

/// Search `segment` for a usable label, reading lengths in `order`.
///
/// The first acceptable candidate wins; rejected candidates only move the
/// search on. Returns the sanitized text, or `None` when no candidate in
/// the segment passes acceptance.
pub fn extract_label(segment: &[u8], order: ByteOrder) -> Option<String> {
    let mut cursor = 0;
    loop {
        let tag_at = next_candidate(segment, cursor)?;
        if let Some(text) = read_candidate(segment, tag_at, order) {
            return Some(sanitize(text));
        }
        cursor = tag_at + SIGNATURE_LEN;
    }
}

/// Earliest `labl` or `note` tag at or after `start`.
fn next_candidate(segment: &[u8], start: usize) -> Option<usize> {
    let labl = scanner::find(segment, fourcc::LABL.as_bytes(), start);
    let note = scanner::find(segment, fourcc::NOTE.as_bytes(), start);
    match (labl, note) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Validate the candidate at `tag_at` and return its raw text bytes.
///
/// Accepted iff the declared length (including the terminating NUL) is
/// within bounds, the first text byte is printable, and the byte at the
/// declared end is NUL. Text sits past the tag, the size field, and the
/// 4-byte cue id.
fn read_candidate(segment: &[u8], tag_at: usize, order: ByteOrder) -> Option<&[u8]> {
    let declared = order.read_u32_at(segment, tag_at + SIGNATURE_LEN)? as usize;
    if !(LABEL_MIN_LEN..=LABEL_MAX_LEN).contains(&declared) {
        return None;
    }
    let text_at = tag_at + SIGNATURE_LEN + LABEL_TEXT_SKIP;
    let nul_at = text_at.checked_add(declared)? - 1;
    if segment.get(nul_at).copied()? != 0 {
        return None;
    }
    let text = segment.get(text_at..nul_at)?;
    if !is_printable(*text.first()?) {
        return None;
    }
    Some(text)
}

fn is_printable(b: u8) -> bool {
    b.is_ascii_graphic() || b == b' '
}

/// Replace anything unsafe in a filename with `_`.
fn sanitize(text: &[u8]) -> String {
    text.iter()
        .map(|&b| {
            if !is_printable(b) || matches!(b, b'/' | b'\\' | b' ') {
                '_'
            } else {
                b as char
            }
        })
        .collect()
}
