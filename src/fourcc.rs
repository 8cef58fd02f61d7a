//! FourCC chunk tags.

use std::fmt;

/// RIFF container signature (little-endian integer fields)
pub const RIFF: FourCc = FourCc(*b"RIFF");
/// RIFX container signature (big-endian integer fields)
pub const RIFX: FourCc = FourCc(*b"RIFX");
/// Nested container chunk
pub const LIST: FourCc = FourCc(*b"LIST");
/// Label chunk (cue id + NUL-terminated text)
pub const LABL: FourCc = FourCc(*b"labl");
/// Note chunk, same layout as `labl`
pub const NOTE: FourCc = FourCc(*b"note");
/// Cue point table chunk
pub const CUE: FourCc = FourCc(*b"cue ");
/// Wave format chunk
pub const FMT: FourCc = FourCc(*b"fmt ");

/// Four-byte ASCII tag identifying a chunk's type.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCc(pub [u8; 4]);

impl FourCc {
    /// Read a tag from the first four bytes of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }
        Some(Self([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for FourCc {
    /// Renders non-printable bytes as `?` so corrupt tags stay one line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            let c = if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '?'
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCc(\"{self}\")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_tag_from_prefix() {
        assert_eq!(FourCc::from_bytes(b"RIFFxxxx"), Some(RIFF));
        assert_eq!(FourCc::from_bytes(b"fmt "), Some(FMT));
    }

    #[test]
    fn rejects_short_input() {
        assert_eq!(FourCc::from_bytes(b"RIF"), None);
        assert_eq!(FourCc::from_bytes(b""), None);
    }

    #[test]
    fn displays_printable_tags_verbatim() {
        assert_eq!(CUE.to_string(), "cue ");
        assert_eq!(RIFX.to_string(), "RIFX");
    }

    #[test]
    fn displays_garbage_bytes_as_question_marks() {
        let tag = FourCc([0x00, b'a', 0xff, b'b']);
        assert_eq!(tag.to_string(), "?a?b");
    }
}
