//! Recursive chunk-tree decoding for a single RIFF/RIFX stream.
//!
//! A decode pass walks one syntactically well-formed stream into an
//! immutable [`ChunkRecord`] tree. Every length and offset in the stream is
//! untrusted: each is validated against the bytes actually present before
//! any sub-view is taken, an oversized size field becomes a subtree-local
//! [`ChunkBody::Truncated`] marker instead of a panic or a wild slice, and
//! container nesting is capped so corrupted nesting cannot exhaust the
//! stack.

use thiserror::Error;

use crate::constants::{
    CHUNK_HEADER_LEN, CUE_ENTRY_LEN, FORMAT_FIXED_LEN, MAX_NESTING_DEPTH, MIN_CHUNK_SIZE,
    SIGNATURE_LEN,
};
use crate::endian::ByteOrder;
use crate::fourcc::{self, FourCc};

/// Fatal conditions at the decode entry point.
///
/// Everything else that can go wrong mid-stream is scoped to a subtree and
/// shows up as a marker node in the tree instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Root tag matches neither accepted container variant
    #[error("root tag \"{found}\" is not a RIFF/RIFX container")]
    NotAContainer { found: FourCc },

    /// Stream too short to hold even one chunk header
    #[error("stream too short for a chunk header ({len} bytes)")]
    TooShort { len: usize },
}

/// A contiguous byte range within the decoded stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
}

/// Fixed fields of a `fmt ` chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatFields {
    pub compression: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub avg_bytes_per_sec: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    /// Extra format bytes past the fixed fields, if the chunk carries any
    pub extension: Option<Span>,
}

/// One 24-byte `cue ` table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CuePoint {
    pub id: u32,
    pub position: u32,
    pub data_chunk: FourCc,
    pub chunk_start: u32,
    pub block_start: u32,
    pub sample_offset: u32,
}

/// Decoded payload of one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkBody {
    /// `RIFF`/`RIFX`/`LIST` with its form tag and decoded children.
    /// `trailing` is set on a root whose buffer extends past the declared
    /// payload; those bytes are reported but not decoded.
    Container {
        form: FourCc,
        children: Vec<ChunkRecord>,
        trailing: Option<Span>,
    },
    Format(FormatFields),
    /// Cue table; `declared` is the stream's own count, `entries` holds
    /// only those that fit inside the payload
    CuePoints {
        declared: u32,
        entries: Vec<CuePoint>,
    },
    Label { id: u32, text: String },
    /// Unrecognized tag: the payload as an opaque range
    Raw(Span),
    /// Declared size ran past the bytes actually present; the sibling run
    /// ends here because no further offset can be derived
    Truncated { available: usize },
    /// Container nesting exceeded [`MAX_NESTING_DEPTH`]
    TooDeep,
}

/// One decoded chunk: header fields plus interpreted payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRecord {
    pub tag: FourCc,
    /// Absolute offset of the chunk header within the stream buffer
    pub offset: usize,
    /// Declared payload size, excluding header and pad byte
    pub size: u32,
    /// Whether a pad byte follows the payload (odd declared size)
    pub padded: bool,
    pub body: ChunkBody,
}

/// Result of one decode pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedStream {
    /// Byte order resolved from the root tag, in force for the whole pass
    pub order: ByteOrder,
    /// Root record; `None` when the root chunk is degenerate (size < 2)
    pub root: Option<ChunkRecord>,
    /// Bytes of the stream the pass accounted for
    pub consumed: usize,
}

/// Decode the stream starting at `offset` within `buf`.
///
/// The root tag fixes the byte order for every numeric field in the pass.
/// A root tag that is neither `RIFF` nor `RIFX` is rejected; everything
/// past that point degrades to marker nodes rather than errors, so a
/// partial tree over corrupt input is normal output.
pub fn decode_stream(buf: &[u8], offset: usize) -> Result<DecodedStream, DecodeError> {
    let remaining = buf.len().saturating_sub(offset);
    if remaining < CHUNK_HEADER_LEN {
        return Err(DecodeError::TooShort { len: remaining });
    }
    let tag = match FourCc::from_bytes(&buf[offset..]) {
        Some(tag) => tag,
        None => return Err(DecodeError::TooShort { len: remaining }),
    };
    let order = ByteOrder::from_root_tag(tag).ok_or(DecodeError::NotAContainer { found: tag })?;

    match decode_chunk(buf, offset, remaining, order, 0) {
        Some((mut root, consumed)) => {
            // Bytes past the root's declared payload are reported as an
            // unstructured trailing span, never decoded.
            if consumed < remaining {
                if let ChunkBody::Container { trailing, .. } = &mut root.body {
                    *trailing = Some(Span {
                        offset: offset + consumed,
                        len: remaining - consumed,
                    });
                }
            }
            Ok(DecodedStream {
                order,
                root: Some(root),
                consumed,
            })
        }
        None => Ok(DecodedStream {
            order,
            root: None,
            consumed: 0,
        }),
    }
}

/// Decode one chunk at absolute `offset` with `remaining` bytes available.
///
/// Returns the record and the bytes consumed (header, payload, pad), or
/// `None` when the branch ends silently: not enough bytes for a header, or
/// a degenerate declared size. Invariant: `remaining <= buf.len() - offset`.
fn decode_chunk(
    buf: &[u8],
    offset: usize,
    remaining: usize,
    order: ByteOrder,
    depth: usize,
) -> Option<(ChunkRecord, usize)> {
    if remaining < CHUNK_HEADER_LEN {
        return None;
    }
    let tag = FourCc::from_bytes(&buf[offset..])?;
    let size = order.read_u32_at(buf, offset + SIGNATURE_LEN)?;
    if size < MIN_CHUNK_SIZE {
        return None;
    }
    let payload_at = offset + CHUNK_HEADER_LEN;
    let available = remaining - CHUNK_HEADER_LEN;
    let padded = size % 2 == 1;

    if size as usize > available {
        let record = ChunkRecord {
            tag,
            offset,
            size,
            padded,
            body: ChunkBody::Truncated { available },
        };
        return Some((record, remaining));
    }
    let size = size as usize;

    let body = if tag == fourcc::RIFF || tag == fourcc::RIFX || tag == fourcc::LIST {
        decode_container(buf, payload_at, size, order, depth)
    } else if tag == fourcc::LABL || tag == fourcc::NOTE {
        decode_label(buf, payload_at, size, order)
    } else if tag == fourcc::CUE {
        decode_cue(buf, payload_at, size, order)
    } else if tag == fourcc::FMT {
        decode_format(buf, payload_at, size, order)
    } else {
        ChunkBody::Raw(Span {
            offset: payload_at,
            len: size,
        })
    };

    // RIFF word alignment: an odd payload is followed by one pad byte,
    // consumed here and surfaced to the formatter as a structural marker.
    let mut consumed = CHUNK_HEADER_LEN + size;
    if padded && consumed < remaining {
        consumed += 1;
    }

    let record = ChunkRecord {
        tag,
        offset,
        size: size as u32,
        padded,
        body,
    };
    Some((record, consumed))
}

/// Container payload: 4-byte form tag, then a sibling run of child chunks.
fn decode_container(
    buf: &[u8],
    payload_at: usize,
    size: usize,
    order: ByteOrder,
    depth: usize,
) -> ChunkBody {
    if size < SIGNATURE_LEN {
        return ChunkBody::Raw(Span {
            offset: payload_at,
            len: size,
        });
    }
    let form = match FourCc::from_bytes(&buf[payload_at..]) {
        Some(form) => form,
        None => {
            return ChunkBody::Raw(Span {
                offset: payload_at,
                len: size,
            })
        }
    };
    if depth >= MAX_NESTING_DEPTH {
        return ChunkBody::TooDeep;
    }

    let children_at = payload_at + SIGNATURE_LEN;
    let budget = size - SIGNATURE_LEN;
    let mut children = Vec::new();
    let mut used = 0;
    while used < budget {
        match decode_chunk(buf, children_at + used, budget - used, order, depth + 1) {
            Some((child, consumed)) => {
                children.push(child);
                used += consumed;
            }
            None => break,
        }
    }

    ChunkBody::Container {
        form,
        children,
        trailing: None,
    }
}

/// `labl`/`note` payload: 4-byte cue id, then NUL-terminated text.
fn decode_label(buf: &[u8], payload_at: usize, size: usize, order: ByteOrder) -> ChunkBody {
    let id = match order.read_u32_at(buf, payload_at) {
        Some(id) if size >= 4 => id,
        _ => {
            return ChunkBody::Raw(Span {
                offset: payload_at,
                len: size,
            })
        }
    };
    let text_bytes = &buf[payload_at + 4..payload_at + size];
    let end = text_bytes
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(text_bytes.len());
    let text = String::from_utf8_lossy(&text_bytes[..end]).into_owned();
    ChunkBody::Label { id, text }
}

/// `cue ` payload: 4-byte count, then fixed 24-byte entries.
fn decode_cue(buf: &[u8], payload_at: usize, size: usize, order: ByteOrder) -> ChunkBody {
    let declared = match order.read_u32_at(buf, payload_at) {
        Some(count) if size >= 4 => count,
        _ => {
            return ChunkBody::Raw(Span {
                offset: payload_at,
                len: size,
            })
        }
    };
    // Only the entries the payload can actually hold are decoded; the
    // declared count is kept for the report.
    let fit = ((size - 4) / CUE_ENTRY_LEN) as u32;
    let count = declared.min(fit);

    let mut entries = Vec::with_capacity(count as usize);
    for i in 0..count as usize {
        let at = payload_at + 4 + i * CUE_ENTRY_LEN;
        let Some(entry) = read_cue_entry(buf, at, order) else {
            break;
        };
        entries.push(entry);
    }
    ChunkBody::CuePoints { declared, entries }
}

fn read_cue_entry(buf: &[u8], at: usize, order: ByteOrder) -> Option<CuePoint> {
    Some(CuePoint {
        id: order.read_u32_at(buf, at)?,
        position: order.read_u32_at(buf, at + 4)?,
        data_chunk: FourCc::from_bytes(buf.get(at + 8..at + 12)?)?,
        chunk_start: order.read_u32_at(buf, at + 12)?,
        block_start: order.read_u32_at(buf, at + 16)?,
        sample_offset: order.read_u32_at(buf, at + 20)?,
    })
}

/// `fmt ` payload: six fixed fields, then an optional extension.
fn decode_format(buf: &[u8], payload_at: usize, size: usize, order: ByteOrder) -> ChunkBody {
    if size < FORMAT_FIXED_LEN {
        return ChunkBody::Raw(Span {
            offset: payload_at,
            len: size,
        });
    }
    let fields = (
        order.read_u16_at(buf, payload_at),
        order.read_u16_at(buf, payload_at + 2),
        order.read_u32_at(buf, payload_at + 4),
        order.read_u32_at(buf, payload_at + 8),
        order.read_u16_at(buf, payload_at + 12),
        order.read_u16_at(buf, payload_at + 14),
    );
    let (Some(compression), Some(channels), Some(sample_rate), Some(avg), Some(align), Some(bits)) =
        fields
    else {
        return ChunkBody::Raw(Span {
            offset: payload_at,
            len: size,
        });
    };

    // Past the fixed fields: a 2-byte extension length, then that many
    // bytes, clamped to what the payload holds.
    let extension = if size >= FORMAT_FIXED_LEN + 2 {
        order
            .read_u16_at(buf, payload_at + FORMAT_FIXED_LEN)
            .map(|declared| {
                let at = payload_at + FORMAT_FIXED_LEN + 2;
                let fit = size - FORMAT_FIXED_LEN - 2;
                Span {
                    offset: at,
                    len: (declared as usize).min(fit),
                }
            })
    } else {
        None
    };

    ChunkBody::Format(FormatFields {
        compression,
        channels,
        sample_rate,
        avg_bytes_per_sec: avg,
        block_align: align,
        bits_per_sample: bits,
        extension,
    })
}
