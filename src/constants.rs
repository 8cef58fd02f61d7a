//! # Constants Module
//!
//! Centralized constants used throughout the riffcarve crate.
//! This avoids magic numbers scattered across the codebase.

/// Chunk header size: 4-byte FourCC tag plus 32-bit size field
pub const CHUNK_HEADER_LEN: usize = 8;

/// Container signature length (`RIFF` / `RIFX`)
pub const SIGNATURE_LEN: usize = 4;

/// Minimum bytes that must remain past a signature hit for a usable stream
/// (full header plus at least one payload byte)
pub const MIN_STREAM_BYTES: usize = 9;

/// Bytes skipped past a signature hit before rescanning, so the hit itself
/// is not re-matched
pub const RESCAN_SKIP: usize = 4;

/// Container nesting levels allowed before a subtree is failed as too deep
pub const MAX_NESTING_DEPTH: usize = 64;

/// Declared chunk sizes below this end a sibling run without comment
pub const MIN_CHUNK_SIZE: u32 = 2;

/// Label acceptance bounds, in bytes, including the terminating NUL
pub const LABEL_MIN_LEN: usize = 6;
/// Upper label acceptance bound
pub const LABEL_MAX_LEN: usize = 200;

/// Bytes between a label tag and its text: 4-byte size field plus 4-byte cue id
pub const LABEL_TEXT_SKIP: usize = 8;

/// Size of one `cue ` chunk entry
pub const CUE_ENTRY_LEN: usize = 24;

/// Fixed portion of a `fmt ` chunk payload
pub const FORMAT_FIXED_LEN: usize = 16;

/// Bytes rendered per hex-dump line
pub const HEX_BYTES_PER_LINE: usize = 16;

/// Filename suffix for dumped streams
pub const STREAM_SUFFIX: &str = ".riff";
