use crate::buffer::{GrfBufReader, GrfBufReaderError, GrfBufWriter};

use super::{GLYPH_RECORD_HEADER_LEN, RecordError};

/// The fixed-size part of a glyph record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GlyphMetrics {
    /// Horizontal distance from the pen position to the left edge of the bitmap
    pub bearing_x: i16,
    /// Vertical distance from the baseline to the top edge of the bitmap
    pub bearing_y: i16,
    pub advance_x: i16,
    /// Usually 0
    pub advance_y: i16,
    pub width: u16,
    pub height: u16,
}

impl GlyphMetrics {
    /// Number of coverage bytes the bitmap holds
    pub fn bitmap_len(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }

    pub(crate) fn from_reader(reader: &mut GrfBufReader<'_>) -> Result<Self, GrfBufReaderError> {
        Ok(Self {
            bearing_x: reader.read_i16()?,
            bearing_y: reader.read_i16()?,
            advance_x: reader.read_i16()?,
            advance_y: reader.read_i16()?,
            width: reader.read_u16()?,
            height: reader.read_u16()?,
        })
    }

    pub(crate) fn write(&self, writer: &mut GrfBufWriter) {
        writer.write_i16(self.bearing_x);
        writer.write_i16(self.bearing_y);
        writer.write_i16(self.advance_x);
        writer.write_i16(self.advance_y);
        writer.write_u16(self.width);
        writer.write_u16(self.height);
    }
}

/// One rasterized glyph: metrics plus a row-major 8-bit coverage bitmap.
///
/// The bitmap always holds exactly `width * height` bytes; this is checked
/// on construction so an encoder never has to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlyphRecord {
    metrics: GlyphMetrics,
    bitmap: Vec<u8>,
}

impl GlyphRecord {
    pub fn new(metrics: GlyphMetrics, bitmap: Vec<u8>) -> Result<Self, RecordError> {
        let expected = metrics.bitmap_len();
        if bitmap.len() != expected {
            return Err(RecordError::BitmapSize {
                width: metrics.width,
                height: metrics.height,
                expected,
                got: bitmap.len(),
            });
        }

        Ok(Self { metrics, bitmap })
    }

    /// Skips the length check for callers that sliced the bitmap from the
    /// metrics themselves
    pub(crate) fn from_parts(metrics: GlyphMetrics, bitmap: Vec<u8>) -> Self {
        debug_assert_eq!(bitmap.len(), metrics.bitmap_len());
        Self { metrics, bitmap }
    }

    /// A record with a fully transparent bitmap of the declared size
    pub fn zeroed(metrics: GlyphMetrics) -> Self {
        Self {
            bitmap: vec![0; metrics.bitmap_len()],
            metrics,
        }
    }

    pub fn metrics(&self) -> &GlyphMetrics {
        &self.metrics
    }

    pub fn bitmap(&self) -> &[u8] {
        &self.bitmap
    }

    /// Size of this record once serialized
    pub fn encoded_len(&self) -> usize {
        GLYPH_RECORD_HEADER_LEN + self.bitmap.len()
    }

    pub(crate) fn write(&self, writer: &mut GrfBufWriter) {
        self.metrics.write(writer);
        writer.write_bytes(&self.bitmap);
    }
}
