//! Serialization of a [`FontDocument`] into the GRF byte layout.
//!
//! Glyph records and kerning blocks are appended to two growing regions in
//! ascending character order. Each offset is taken from the region length
//! *before* its record is appended, so no record is ever revisited.

use log::{debug, warn};
use thiserror::Error;

use crate::{
    buffer::GrfBufWriter,
    document::FontDocument,
    records::{GRF_NONE, GrfHeader, Layout},
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// An offset or region length does not fit the format's 32-bit fields.
    #[error("The {what} of {value} bytes does not fit a 32-bit offset")]
    Overflow { what: &'static str, value: usize },
}

/// Sizes of the three parts of an encoded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedLayout {
    pub layout: Layout,
    pub header_len: usize,
    pub glyph_region_len: usize,
    /// Always 0 for the minimal layout
    pub kern_region_len: usize,
    pub glyph_count: usize,
    pub kern_block_count: usize,
}

impl EncodedLayout {
    pub fn total_len(&self) -> usize {
        self.header_len + self.glyph_region_len + self.kern_region_len
    }
}

/// Converts a region position to a table offset. The sentinel value itself
/// is not a usable offset.
pub(crate) fn checked_offset(value: usize, what: &'static str) -> Result<u32, EncodeError> {
    match u32::try_from(value) {
        Ok(offset) if offset != GRF_NONE => Ok(offset),
        _ => Err(EncodeError::Overflow { what, value }),
    }
}

/// Encodes `document` with the given header layout.
///
/// The output is fully determined by the document: encoding the same
/// document twice yields identical bytes. Kerning is only representable in
/// [`Layout::Extended`]; it is dropped with a warning otherwise.
///
/// # Examples
///
/// ```
/// use grf::{FontDocument, Layout, LineMetrics, decoder::GrfFont};
/// use grf::records::{GlyphMetrics, GlyphRecord};
///
/// let mut document = FontDocument::new(LineMetrics { ascender: 7, descender: -2, line_height: 10 });
/// let metrics = GlyphMetrics { bearing_y: 6, advance_x: 6, width: 5, height: 7, ..Default::default() };
/// document.set_glyph(b'A', Some(GlyphRecord::zeroed(metrics)));
///
/// let bytes = grf::encode(&document, Layout::Extended).unwrap();
/// let font = GrfFont::from_bytes(&bytes).unwrap();
/// assert_eq!(font.glyph(b'A').unwrap().unwrap().bitmap(), &[0u8; 35]);
/// assert!(font.glyph(b'B').unwrap().is_none());
/// ```
pub fn encode(document: &FontDocument, layout: Layout) -> Result<Vec<u8>, EncodeError> {
    encode_with_report(document, layout).map(|(bytes, _)| bytes)
}

/// Like [`encode`], additionally reporting the size of each region
pub fn encode_with_report(
    document: &FontDocument,
    layout: Layout,
) -> Result<(Vec<u8>, EncodedLayout), EncodeError> {
    let mut header = GrfHeader::new(layout, document.metrics());

    let mut glyphs = GrfBufWriter::new();
    let mut glyph_count = 0;
    for (code, glyph) in document.glyphs() {
        let offset = checked_offset(glyphs.len(), "glyph offset")?;
        glyph.write(&mut glyphs);
        header.glyph_offsets[usize::from(code)] = offset;
        glyph_count += 1;

        debug!(
            "glyph {code:#04x}: {}x{} at {offset}",
            glyph.metrics().width,
            glyph.metrics().height
        );
    }
    // kerning offsets are computed on top of this length
    checked_offset(glyphs.len(), "glyph region length")?;

    let mut kerns = GrfBufWriter::new();
    let mut kern_block_count = 0;
    if layout.has_kerning() {
        for (first, block) in document.kerning_blocks() {
            let anchored = glyphs.len().checked_add(kerns.len()).ok_or(EncodeError::Overflow {
                what: "kerning offset",
                value: usize::MAX,
            })?;
            let offset = checked_offset(anchored, "kerning offset")?;
            block.write(&mut kerns)?;
            header.kern_offsets[usize::from(first)] = offset;
            kern_block_count += 1;

            debug!(
                "kerning block {first:#04x}: {} entries at {offset}",
                block.entries().len()
            );
        }
        let end = glyphs.len().saturating_add(kerns.len());
        checked_offset(end, "kerning region end")?;
    } else if document.has_kerning() {
        warn!("the {layout:?} layout cannot store kerning, dropping it");
    }

    let report = EncodedLayout {
        layout,
        header_len: layout.header_len(),
        glyph_region_len: glyphs.len(),
        kern_region_len: kerns.len(),
        glyph_count,
        kern_block_count,
    };

    let mut writer = GrfBufWriter::with_capacity(report.total_len());
    header.write(&mut writer);
    writer.write_bytes(&glyphs.into_inner());
    writer.write_bytes(&kerns.into_inner());

    debug!(
        "encoded {} glyphs ({} bytes) and {} kerning blocks ({} bytes)",
        report.glyph_count, report.glyph_region_len, report.kern_block_count, report.kern_region_len
    );

    Ok((writer.into_inner(), report))
}
