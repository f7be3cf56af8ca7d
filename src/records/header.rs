use crate::{
    buffer::{GrfBufReader, GrfBufWriter},
    decoder::DecodeError,
};

use super::{CHAR_COUNT, GRF_NONE, Layout};

/// Font-wide vertical metrics, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LineMetrics {
    pub ascender: i16,
    /// Negative when the descender reaches below the baseline
    pub descender: i16,
    pub line_height: i16,
}

/// The fixed-size header at the start of every file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrfHeader {
    pub layout: Layout,
    pub metrics: LineMetrics,
    /// Glyph record offsets relative to the end of the header
    pub glyph_offsets: [u32; CHAR_COUNT],
    /// Kerning block offsets relative to the end of the header.
    /// Always all [`GRF_NONE`] for the minimal layout.
    pub kern_offsets: [u32; CHAR_COUNT],
}

impl GrfHeader {
    /// A header with every table entry set to [`GRF_NONE`]
    pub fn new(layout: Layout, metrics: LineMetrics) -> Self {
        Self {
            layout,
            metrics,
            glyph_offsets: [GRF_NONE; CHAR_COUNT],
            kern_offsets: [GRF_NONE; CHAR_COUNT],
        }
    }

    /// Parses the magic and metrics, returning the layout they announce.
    ///
    /// Only the first ten bytes are read, the offset tables are left for
    /// on-demand lookups.
    pub(crate) fn read_prefix(data: &[u8]) -> Result<(Layout, LineMetrics), DecodeError> {
        let minimal_len = Layout::Minimal.header_len();
        if data.len() < minimal_len {
            return Err(DecodeError::ShortHeader(minimal_len, data.len()));
        }

        let mut reader = GrfBufReader::from_buffer(data);
        let magic = reader.read_u32()?;
        let layout = Layout::from_magic(magic).ok_or(DecodeError::InvalidMagic(magic))?;
        if data.len() < layout.header_len() {
            return Err(DecodeError::ShortHeader(layout.header_len(), data.len()));
        }

        let metrics = LineMetrics {
            ascender: reader.read_i16()?,
            descender: reader.read_i16()?,
            line_height: reader.read_i16()?,
        };

        Ok((layout, metrics))
    }

    /// Parses the complete header including both offset tables
    pub fn from_buffer(data: &[u8]) -> Result<Self, DecodeError> {
        let (layout, metrics) = Self::read_prefix(data)?;
        let mut header = Self::new(layout, metrics);

        let mut reader = GrfBufReader::from_buffer(data);
        reader.seek_to(layout.glyph_table_start() as u64)?;
        for offset in header.glyph_offsets.iter_mut() {
            *offset = reader.read_u32()?;
        }

        if let Some(start) = layout.kern_table_start() {
            reader.seek_to(start as u64)?;
            for offset in header.kern_offsets.iter_mut() {
                *offset = reader.read_u32()?;
            }
        }

        Ok(header)
    }

    pub(crate) fn write(&self, writer: &mut GrfBufWriter) {
        writer.write_u32(self.layout.magic());
        writer.write_i16(self.metrics.ascender);
        writer.write_i16(self.metrics.descender);
        writer.write_i16(self.metrics.line_height);

        for &offset in &self.glyph_offsets {
            writer.write_u32(offset);
        }
        if self.layout.has_kerning() {
            for &offset in &self.kern_offsets {
                writer.write_u32(offset);
            }
        }
    }
}
