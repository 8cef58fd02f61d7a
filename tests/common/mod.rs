//! Shared builders for synthetic RIFF/RIFX streams.
#![allow(dead_code)] // not every test binary uses every builder

/// One chunk: tag, little-endian size field, payload, pad byte if odd.
pub fn chunk_le(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(tag);
    buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    buf.extend_from_slice(payload);
    if payload.len() % 2 == 1 {
        buf.push(0);
    }
    buf
}

/// Same, big-endian size field.
pub fn chunk_be(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(tag);
    buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    buf.extend_from_slice(payload);
    if payload.len() % 2 == 1 {
        buf.push(0);
    }
    buf
}

/// A RIFF stream wrapping `children` under `form`.
pub fn riff_le(form: &[u8; 4], children: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(4 + children.len());
    payload.extend_from_slice(form);
    payload.extend_from_slice(children);
    chunk_le(b"RIFF", &payload)
}

/// A `labl` chunk payload: cue id + text + NUL.
pub fn labl_payload_le(id: u32, text: &[u8]) -> Vec<u8> {
    let mut p = Vec::new();
    p.extend_from_slice(&id.to_le_bytes());
    p.extend_from_slice(text);
    p.push(0);
    p
}

/// A `labl` blob in the shape the label extractor accepts: the length
/// field counts the text plus its NUL, and the NUL sits exactly at the
/// declared end.
pub fn labl_for_extractor_le(id: u32, text: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"labl");
    buf.extend_from_slice(&(text.len() as u32 + 1).to_le_bytes());
    buf.extend_from_slice(&id.to_le_bytes());
    buf.extend_from_slice(text);
    buf.push(0);
    buf
}

/// A minimal PCM `fmt ` payload (16 bytes, little-endian).
pub fn fmt_payload_le() -> Vec<u8> {
    let mut p = Vec::new();
    p.extend_from_slice(&1u16.to_le_bytes());
    p.extend_from_slice(&2u16.to_le_bytes());
    p.extend_from_slice(&44100u32.to_le_bytes());
    p.extend_from_slice(&176400u32.to_le_bytes());
    p.extend_from_slice(&4u16.to_le_bytes());
    p.extend_from_slice(&16u16.to_le_bytes());
    p
}
