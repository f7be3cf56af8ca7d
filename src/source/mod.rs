//! Building a [`FontDocument`] from a scalable font.
//!
//! The encoder never sees a font engine; it only sees the [`GlyphSource`]
//! contract. [`FontdueSource`] rasterizes with `fontdue` and reads kerning
//! from the font's kerning table, [`ShapedKerning`] replaces the kerning
//! half of any source with adjustments measured by shaping each pair with
//! `rustybuzz`.

use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    GrfError,
    document::FontDocument,
    encoder::{self, EncodedLayout},
    records::{GlyphRecord, KernEntry, KerningBlock, Layout, LineMetrics, RecordError},
};

mod raster;
mod shaping;

pub use raster::FontdueSource;
pub use shaping::ShapedKerning;

/// Pixel size used when none is given
pub const DEFAULT_PIXEL_SIZE: u16 = 16;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to parse font: {0}")]
    InvalidFont(String),

    #[error("The font does not provide horizontal line metrics")]
    MissingLineMetrics,

    #[error("The {field} of {value} does not fit the format")]
    MetricOutOfRange { field: &'static str, value: f32 },

    #[error("Failed to shape {0:?}")]
    Shaping(String),

    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Rounds a pixel value to the nearest `i16`, failing when out of range
pub(crate) fn pixels_i16(field: &'static str, value: f32) -> Result<i16, SourceError> {
    let rounded = value.round();
    if rounded.is_finite() && rounded >= f32::from(i16::MIN) && rounded <= f32::from(i16::MAX) {
        Ok(rounded as i16)
    } else {
        Err(SourceError::MetricOutOfRange { field, value })
    }
}

/// Supplies rasterized glyphs and kerning adjustments for single-byte
/// character codes at a given pixel size.
///
/// Code `c` stands for the Unicode scalar `U+00c`.
pub trait GlyphSource {
    /// Font-wide metrics. Failure here aborts the conversion.
    fn line_metrics(&self, pixel_size: u16) -> Result<LineMetrics, SourceError>;

    /// `Ok(None)` when the font has no glyph for `code`
    fn rasterize(&self, code: u8, pixel_size: u16) -> Result<Option<GlyphRecord>, SourceError>;

    /// Whether probing pairs with [`GlyphSource::kerning_adjustment`] can
    /// yield anything at all
    fn has_kerning(&self) -> bool;

    /// The (Δx, Δy) pixel adjustment for `first` immediately followed by
    /// `second`, `Ok(None)` for no adjustment
    fn kerning_adjustment(
        &self,
        first: u8,
        second: u8,
        pixel_size: u16,
    ) -> Result<Option<(i16, i16)>, SourceError>;
}

impl<S: GlyphSource + ?Sized> GlyphSource for &S {
    fn line_metrics(&self, pixel_size: u16) -> Result<LineMetrics, SourceError> {
        (**self).line_metrics(pixel_size)
    }

    fn rasterize(&self, code: u8, pixel_size: u16) -> Result<Option<GlyphRecord>, SourceError> {
        (**self).rasterize(code, pixel_size)
    }

    fn has_kerning(&self) -> bool {
        (**self).has_kerning()
    }

    fn kerning_adjustment(
        &self,
        first: u8,
        second: u8,
        pixel_size: u16,
    ) -> Result<Option<(i16, i16)>, SourceError> {
        (**self).kerning_adjustment(first, second, pixel_size)
    }
}

impl FontDocument {
    /// Rasterizes every code and probes every pair of present glyphs.
    ///
    /// A glyph or pair the source fails on is logged and left out; only a
    /// failure to produce line metrics is returned as an error.
    pub fn from_source<S: GlyphSource + ?Sized>(
        source: &S,
        pixel_size: u16,
    ) -> Result<Self, SourceError> {
        let mut document = FontDocument::new(source.line_metrics(pixel_size)?);

        for code in 0..=u8::MAX {
            match source.rasterize(code, pixel_size) {
                Ok(glyph) => {
                    document.set_glyph(code, glyph);
                }
                Err(err) => warn!("skipping glyph {code:#04x}: {err}"),
            }
        }

        if !source.has_kerning() {
            debug!("source has no kerning, skipping pair probes");
            return Ok(document);
        }

        let present: Vec<u8> = document.glyphs().map(|(code, _)| code).collect();
        let mut scratch = Vec::with_capacity(present.len());
        for &first in &present {
            for &second in &present {
                match source.kerning_adjustment(first, second, pixel_size) {
                    Ok(Some((0, 0))) | Ok(None) => {}
                    Ok(Some((x, y))) => scratch.push(KernEntry::new(second, x, y)),
                    Err(err) => warn!("skipping kerning pair {first:#04x} {second:#04x}: {err}"),
                }
            }
            // drain keeps the scratch allocation for the next first character
            let block = KerningBlock::from_entries(scratch.drain(..))?;
            document.set_kerning(first, block);
        }

        Ok(document)
    }
}

/// Where kerning adjustments come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KerningMode {
    /// No kerning blocks are produced
    None,
    /// The font's own kerning table
    #[default]
    Native,
    /// Shaping each two-character run
    Shaped,
}

/// Parameters of a single conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    pub pixel_size: u16,
    pub layout: Layout,
    pub kerning: KerningMode,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            pixel_size: DEFAULT_PIXEL_SIZE,
            layout: Layout::default(),
            kerning: KerningMode::default(),
        }
    }
}

/// Converts a TrueType/OpenType font into an encoded GRF buffer
pub fn convert(
    font_data: &[u8],
    options: &ConvertOptions,
) -> Result<(Vec<u8>, EncodedLayout), GrfError> {
    let pixel_size = options.pixel_size;
    let source = FontdueSource::from_bytes(font_data, pixel_size)?;

    let document = match options.kerning {
        KerningMode::None => FontDocument::from_source(&source.without_kerning(), pixel_size)?,
        KerningMode::Native => FontDocument::from_source(&source, pixel_size)?,
        KerningMode::Shaped => {
            let shaped = ShapedKerning::new(&source, font_data)?;
            FontDocument::from_source(&shaped, pixel_size)?
        }
    };

    let (bytes, report) = encoder::encode_with_report(&document, options.layout)?;
    info!(
        "converted {} glyphs and {} kerning blocks at {pixel_size}px into {} bytes",
        report.glyph_count,
        report.kern_block_count,
        report.total_len()
    );

    Ok((bytes, report))
}
