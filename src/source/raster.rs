use fontdue::{Font, FontSettings};

use crate::records::{GlyphMetrics, GlyphRecord, LineMetrics};

use super::{GlyphSource, SourceError, pixels_i16};

/// A [`GlyphSource`] backed by the `fontdue` rasterizer.
///
/// Kerning comes from the font's own horizontal kerning data, without any
/// vertical component.
pub struct FontdueSource {
    font: Font,
    kerning: bool,
}

impl FontdueSource {
    /// Parses a TrueType/OpenType font. `pixel_size` only tunes the
    /// rasterizer's internal caching; every query still takes its own size.
    pub fn from_bytes(data: &[u8], pixel_size: u16) -> Result<Self, SourceError> {
        let settings = FontSettings {
            scale: f32::from(pixel_size),
            ..FontSettings::default()
        };
        let font = Font::from_bytes(data, settings)
            .map_err(|err| SourceError::InvalidFont(err.to_string()))?;

        Ok(Self {
            font,
            kerning: carries_kerning(data),
        })
    }

    /// Disables kerning probes altogether
    pub fn without_kerning(self) -> Self {
        Self {
            kerning: false,
            ..self
        }
    }
}

/// Whether the face has a `kern` or `GPOS` table to take pair adjustments
/// from. Fonts without either skip pair probing entirely.
fn carries_kerning(data: &[u8]) -> bool {
    rustybuzz::Face::from_slice(data, 0).is_some_and(|face| {
        let tables = face.tables();
        tables.kern.is_some() || tables.gpos.is_some()
    })
}

impl GlyphSource for FontdueSource {
    fn line_metrics(&self, pixel_size: u16) -> Result<LineMetrics, SourceError> {
        let metrics = self
            .font
            .horizontal_line_metrics(f32::from(pixel_size))
            .ok_or(SourceError::MissingLineMetrics)?;

        Ok(LineMetrics {
            ascender: pixels_i16("ascender", metrics.ascent)?,
            descender: pixels_i16("descender", metrics.descent)?,
            line_height: pixels_i16("line height", metrics.new_line_size)?,
        })
    }

    fn rasterize(&self, code: u8, pixel_size: u16) -> Result<Option<GlyphRecord>, SourceError> {
        let ch = char::from(code);
        if self.font.lookup_glyph_index(ch) == 0 {
            return Ok(None);
        }

        let (raster, bitmap) = self.font.rasterize(ch, f32::from(pixel_size));
        let width = u16::try_from(raster.width).map_err(|_| SourceError::MetricOutOfRange {
            field: "width",
            value: raster.width as f32,
        })?;
        let height = u16::try_from(raster.height).map_err(|_| SourceError::MetricOutOfRange {
            field: "height",
            value: raster.height as f32,
        })?;

        // fontdue reports the bottom edge, the format stores the top edge
        let top = raster.ymin as f32 + raster.height as f32;
        let metrics = GlyphMetrics {
            bearing_x: pixels_i16("horizontal bearing", raster.xmin as f32)?,
            bearing_y: pixels_i16("vertical bearing", top)?,
            advance_x: pixels_i16("horizontal advance", raster.advance_width)?,
            advance_y: pixels_i16("vertical advance", raster.advance_height)?,
            width,
            height,
        };

        Ok(Some(GlyphRecord::new(metrics, bitmap)?))
    }

    fn has_kerning(&self) -> bool {
        self.kerning
    }

    fn kerning_adjustment(
        &self,
        first: u8,
        second: u8,
        pixel_size: u16,
    ) -> Result<Option<(i16, i16)>, SourceError> {
        if !self.kerning {
            return Ok(None);
        }

        let Some(kern) =
            self.font
                .horizontal_kern(char::from(first), char::from(second), f32::from(pixel_size))
        else {
            return Ok(None);
        };

        match pixels_i16("kerning", kern)? {
            0 => Ok(None),
            dx => Ok(Some((dx, 0))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_font_is_rejected() {
        let result = FontdueSource::from_bytes(&[0u8; 64], 16);
        assert!(matches!(result, Err(SourceError::InvalidFont(_))));
    }

    #[test]
    fn unparseable_data_has_no_kerning() {
        assert!(!carries_kerning(&[]));
        assert!(!carries_kerning(&[0u8; 64]));
    }
}
