//! Report rendering for decoded chunk trees.
//!
//! The inspection personality's sink: takes the typed records and absolute
//! offsets the decoder produced and renders one line per field, with
//! 16-bytes-per-line hex-plus-ASCII dumps for opaque payloads. The decoder
//! never formats anything itself.

use std::fmt::Write as _;
use std::io::{self, Write};

use crate::constants::{CHUNK_HEADER_LEN, CUE_ENTRY_LEN, HEX_BYTES_PER_LINE, SIGNATURE_LEN};
use crate::decode::{ChunkBody, ChunkRecord, CuePoint, DecodedStream, FormatFields, Span};

/// Writes a field-level report of a decoded stream.
pub struct ReportWriter<W: Write> {
    out: W,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Header block naming the input before the chunk lines.
    pub fn file_header(&mut self, name: &str, size: usize) -> io::Result<()> {
        writeln!(self.out, "File name: {name}")?;
        writeln!(self.out, "File size: {size}")
    }

    /// Render the whole pass: the chunk tree, then any trailing bytes the
    /// root's declared payload did not cover.
    pub fn render_stream(&mut self, buf: &[u8], decoded: &DecodedStream) -> io::Result<()> {
        match &decoded.root {
            Some(root) => self.render_chunk(buf, root),
            None => writeln!(self.out, "(degenerate root chunk; nothing to decode)"),
        }
    }

    fn render_chunk(&mut self, buf: &[u8], rec: &ChunkRecord) -> io::Result<()> {
        writeln!(self.out)?;
        self.tag_line(rec.offset, "Chunk ID", rec.tag.to_string())?;
        self.field_line(rec.offset + SIGNATURE_LEN, 4, "Size", rec.size)?;

        match &rec.body {
            ChunkBody::Container {
                form,
                children,
                trailing,
            } => {
                self.tag_line(rec.offset + CHUNK_HEADER_LEN, "Form Type", form.to_string())?;
                for child in children {
                    self.render_chunk(buf, child)?;
                }
                if rec.padded {
                    self.pad_line(rec)?;
                }
                self.end_line(rec)?;
                if let Some(span) = trailing {
                    writeln!(
                        self.out,
                        "{:>10}  {:>14}: {} bytes past the declared payload",
                        span.offset, "trailing", span.len
                    )?;
                    self.hex_dump(buf, *span)?;
                }
                return Ok(());
            }
            ChunkBody::Format(fields) => {
                self.render_format(buf, rec.offset + CHUNK_HEADER_LEN, fields)?
            }
            ChunkBody::CuePoints { declared, entries } => {
                self.field_line(rec.offset + CHUNK_HEADER_LEN, 4, "# Cue points", declared)?;
                for (i, entry) in entries.iter().enumerate() {
                    let at = rec.offset + CHUNK_HEADER_LEN + 4 + i * CUE_ENTRY_LEN;
                    self.render_cue_point(at, entry)?;
                }
            }
            ChunkBody::Label { id, text } => {
                self.field_line(rec.offset + CHUNK_HEADER_LEN, 4, "Label ID", id)?;
                writeln!(
                    self.out,
                    "{:>10}  {:>14}: {}",
                    rec.offset + CHUNK_HEADER_LEN + 4,
                    "Label Text",
                    text
                )?;
            }
            ChunkBody::Raw(span) => self.hex_dump(buf, *span)?,
            ChunkBody::Truncated { available } => {
                writeln!(
                    self.out,
                    "{:>10}  {:>14}: declared {} bytes, only {} present",
                    rec.offset + CHUNK_HEADER_LEN,
                    "truncated",
                    rec.size,
                    available
                )?;
                // Whatever is actually there is still worth seeing.
                self.hex_dump(
                    buf,
                    Span {
                        offset: rec.offset + CHUNK_HEADER_LEN,
                        len: *available,
                    },
                )?;
                // No pad marker: the declared size never fit, so no pad
                // byte was consumed.
                return self.end_line(rec);
            }
            ChunkBody::TooDeep => {
                writeln!(
                    self.out,
                    "{:>10}  {:>14}: container nesting too deep; subtree skipped",
                    rec.offset + CHUNK_HEADER_LEN,
                    "anomaly"
                )?;
            }
        }

        if rec.padded {
            self.pad_line(rec)?;
        }
        self.end_line(rec)
    }

    fn render_format(&mut self, buf: &[u8], at: usize, fields: &FormatFields) -> io::Result<()> {
        self.field_line(at, 2, "Compression", fields.compression)?;
        self.field_line(at + 2, 2, "# Channels", fields.channels)?;
        self.field_line(at + 4, 4, "Sample Rate", fields.sample_rate)?;
        self.field_line(at + 8, 4, "Avg. Bytes/s", fields.avg_bytes_per_sec)?;
        self.field_line(at + 12, 2, "Block Align", fields.block_align)?;
        self.field_line(at + 14, 2, "Bits/sample", fields.bits_per_sample)?;
        if let Some(ext) = fields.extension {
            self.field_line(at + 16, 2, "Xtra fmt bytes", ext.len)?;
            self.hex_dump(buf, ext)?;
        }
        Ok(())
    }

    fn render_cue_point(&mut self, at: usize, entry: &CuePoint) -> io::Result<()> {
        self.field_line(at, 4, "Cue ID", entry.id)?;
        self.field_line(at + 4, 4, "Cue Position", entry.position)?;
        self.tag_line(at + 8, "Data Chunk ID", entry.data_chunk.to_string())?;
        self.field_line(at + 12, 4, "Chunk Start", entry.chunk_start)?;
        self.field_line(at + 16, 4, "Block Start", entry.block_start)?;
        self.field_line(at + 20, 4, "Sample Offset", entry.sample_offset)
    }

    fn field_line<V: std::fmt::Display>(
        &mut self,
        offset: usize,
        width: usize,
        name: &str,
        value: V,
    ) -> io::Result<()> {
        writeln!(self.out, "{offset:>10}  [{width}] {name:>14}: {value}")
    }

    fn tag_line(&mut self, offset: usize, name: &str, tag: String) -> io::Result<()> {
        writeln!(self.out, "{offset:>10}  [4] {name:>14}: {tag}")
    }

    fn pad_line(&mut self, rec: &ChunkRecord) -> io::Result<()> {
        let pad_at = rec.offset + CHUNK_HEADER_LEN + rec.size as usize;
        writeln!(self.out, "{:>10}  {:>14}: 1 byte", pad_at, "pad")
    }

    fn end_line(&mut self, rec: &ChunkRecord) -> io::Result<()> {
        writeln!(self.out, "{:>10}  {:>18}  [{} end]", "", "==============", rec.tag)
    }

    /// 16 bytes per line: offset, hex with a mid-row gap, printable ASCII.
    pub fn hex_dump(&mut self, buf: &[u8], span: Span) -> io::Result<()> {
        let end = span.offset.saturating_add(span.len).min(buf.len());
        let start = span.offset.min(end);
        for (i, row) in buf[start..end].chunks(HEX_BYTES_PER_LINE).enumerate() {
            let mut hex = String::with_capacity(HEX_BYTES_PER_LINE * 3 + 1);
            for (j, b) in row.iter().enumerate() {
                if j == HEX_BYTES_PER_LINE / 2 {
                    hex.push(' ');
                }
                let _ = write!(hex, "{b:02x} ");
            }
            let ascii: String = row
                .iter()
                .map(|&b| if b.is_ascii_graphic() { b as char } else { '.' })
                .collect();
            writeln!(
                self.out,
                "{:>10}  {:<49} {}",
                start + i * HEX_BYTES_PER_LINE,
                hex,
                ascii
            )?;
        }
        Ok(())
    }
}
