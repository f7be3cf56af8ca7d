//! Read access to an encoded GRF buffer.
//!
//! [`GrfFont`] borrows the buffer and resolves lookups through the offset
//! tables, touching only the bytes of the requested record. Every read is
//! bounds-checked, so a truncated or corrupt buffer produces an error and
//! never a panic. The view holds no mutable state and may be shared freely
//! between threads.

use thiserror::Error;

use crate::{
    buffer::{GrfBufReader, GrfBufReaderError},
    document::FontDocument,
    records::{
        GRF_NONE, GlyphMetrics, GlyphRecord, GrfHeader, KernEntry, KerningBlock, Layout,
        LineMetrics, RecordError,
    },
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Not a GRF file, unrecognized magic {0:#010x}")]
    InvalidMagic(u32),

    #[error("The header requires {0} bytes, got {1} bytes")]
    ShortHeader(usize, usize),

    #[error("Truncated data: {0}")]
    TruncatedData(#[from] GrfBufReaderError),

    #[error("Malformed record: {0}")]
    InvalidRecord(#[from] RecordError),

    #[error("Character {0:?} is outside the single-byte character space")]
    CharOutOfRange(char),
}

impl DecodeError {
    /// Whether the buffer is not a GRF file at all, as opposed to a GRF file
    /// with a damaged record
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, Self::InvalidMagic(_) | Self::ShortHeader(..))
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::TruncatedData(_))
    }
}

/// Converts a `char` to the character code used to index the tables.
///
/// ```
/// assert_eq!(grf::decoder::char_code('A'), Ok(65));
/// assert_eq!(grf::decoder::char_code('é'), Ok(0xE9));
/// assert!(grf::decoder::char_code('€').is_err());
/// ```
pub fn char_code(ch: char) -> Result<u8, DecodeError> {
    u8::try_from(ch).map_err(|_| DecodeError::CharOutOfRange(ch))
}

/// A glyph record borrowed from the encoded buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphRef<'a> {
    metrics: GlyphMetrics,
    bitmap: &'a [u8],
}

impl<'a> GlyphRef<'a> {
    pub fn metrics(&self) -> &GlyphMetrics {
        &self.metrics
    }

    /// Exactly `width * height` coverage bytes, row-major
    pub fn bitmap(&self) -> &'a [u8] {
        self.bitmap
    }

    pub fn to_record(&self) -> GlyphRecord {
        // the reader sliced exactly metrics.bitmap_len() bytes
        GlyphRecord::from_parts(self.metrics, self.bitmap.to_vec())
    }
}

/// A validated view over an encoded GRF buffer.
#[derive(Debug, Clone, Copy)]
pub struct GrfFont<'a> {
    data: &'a [u8],
    layout: Layout,
    metrics: LineMetrics,
}

impl<'a> GrfFont<'a> {
    /// Checks the magic and that the whole header is present.
    ///
    /// Records are not inspected until they are looked up; use
    /// [`GrfFont::validate`] to check them all up front.
    pub fn from_bytes(data: &'a [u8]) -> Result<Self, DecodeError> {
        let (layout, metrics) = GrfHeader::read_prefix(data)?;
        Ok(Self {
            data,
            layout,
            metrics,
        })
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn metrics(&self) -> LineMetrics {
        self.metrics
    }

    pub fn ascender(&self) -> i16 {
        self.metrics.ascender
    }

    pub fn descender(&self) -> i16 {
        self.metrics.descender
    }

    pub fn line_height(&self) -> i16 {
        self.metrics.line_height
    }

    /// Parses the full header including both offset tables
    pub fn header(&self) -> Result<GrfHeader, DecodeError> {
        GrfHeader::from_buffer(self.data)
    }

    fn table_entry(&self, table_start: usize, code: u8) -> Result<Option<u32>, DecodeError> {
        let mut reader = GrfBufReader::from_buffer(self.data);
        reader.seek_to((table_start + 4 * usize::from(code)) as u64)?;
        let offset = reader.read_u32()?;
        Ok((offset != GRF_NONE).then_some(offset))
    }

    /// The glyph offset table entry for `code`, `None` for the sentinel
    pub fn glyph_offset(&self, code: u8) -> Result<Option<u32>, DecodeError> {
        self.table_entry(self.layout.glyph_table_start(), code)
    }

    /// The kerning offset table entry for `first`, `None` for the sentinel
    /// and always `None` for the minimal layout
    pub fn kern_offset(&self, first: u8) -> Result<Option<u32>, DecodeError> {
        match self.layout.kern_table_start() {
            Some(start) => self.table_entry(start, first),
            None => Ok(None),
        }
    }

    /// A reader positioned at `offset` bytes past the end of the header
    fn record_reader(&self, offset: u32) -> Result<GrfBufReader<'a>, DecodeError> {
        let mut reader = GrfBufReader::from_buffer(self.data);
        reader.seek_to(self.layout.header_len() as u64 + u64::from(offset))?;
        Ok(reader)
    }

    /// Resolves `code` to its glyph record in constant time.
    ///
    /// Fails with [`DecodeError::TruncatedData`] when the record runs past
    /// the end of the buffer.
    pub fn glyph(&self, code: u8) -> Result<Option<GlyphRef<'a>>, DecodeError> {
        let Some(offset) = self.glyph_offset(code)? else {
            return Ok(None);
        };

        let mut reader = self.record_reader(offset)?;
        let metrics = GlyphMetrics::from_reader(&mut reader)?;
        let bitmap = reader.read_bytes(metrics.bitmap_len())?;

        Ok(Some(GlyphRef { metrics, bitmap }))
    }

    /// A reader positioned at the first entry of `first`'s kerning block,
    /// along with the entry count
    fn kern_entries(&self, first: u8) -> Result<Option<(GrfBufReader<'a>, u16)>, DecodeError> {
        let Some(offset) = self.kern_offset(first)? else {
            return Ok(None);
        };

        let mut reader = self.record_reader(offset)?;
        let count = reader.read_u16()?;
        Ok(Some((reader, count)))
    }

    /// The adjustment to apply when `first` is immediately followed by
    /// `second`, or `None` for no adjustment
    pub fn kerning(&self, first: u8, second: u8) -> Result<Option<(i16, i16)>, DecodeError> {
        let Some((mut reader, count)) = self.kern_entries(first)? else {
            return Ok(None);
        };

        for _ in 0..count {
            let entry = KernEntry::from_reader(&mut reader)?;
            if entry.second == second {
                return Ok(Some(entry.offset()));
            }
        }
        Ok(None)
    }

    /// Reads the complete kerning block for `first`
    pub fn kerning_block(&self, first: u8) -> Result<Option<KerningBlock>, DecodeError> {
        let Some((mut reader, count)) = self.kern_entries(first)? else {
            return Ok(None);
        };

        let entries = (0..count)
            .map(|_| KernEntry::from_reader(&mut reader))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(KerningBlock::from_entries(entries)?)
    }

    /// Checks that every table entry resolves to a complete record
    pub fn validate(&self) -> Result<(), DecodeError> {
        for code in 0..=u8::MAX {
            self.glyph(code)?;
            self.kerning_block(code)?;
        }
        Ok(())
    }

    /// Copies every record out of the buffer
    pub fn to_document(&self) -> Result<FontDocument, DecodeError> {
        let mut document = FontDocument::new(self.metrics);
        for code in 0..=u8::MAX {
            document.set_glyph(code, self.glyph(code)?.map(|glyph| glyph.to_record()));
            document.set_kerning(code, self.kerning_block(code)?);
        }
        Ok(document)
    }
}

/// Decodes a whole buffer into an owned document
pub fn decode(data: &[u8]) -> Result<FontDocument, DecodeError> {
    GrfFont::from_bytes(data)?.to_document()
}

/// Looks up a single glyph without decoding anything else
pub fn lookup_glyph(data: &[u8], code: u8) -> Result<Option<GlyphRef<'_>>, DecodeError> {
    GrfFont::from_bytes(data)?.glyph(code)
}

/// Looks up a single kerning pair without decoding anything else
pub fn lookup_kerning(
    data: &[u8],
    first: u8,
    second: u8,
) -> Result<Option<(i16, i16)>, DecodeError> {
    GrfFont::from_bytes(data)?.kerning(first, second)
}
