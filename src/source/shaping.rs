use rustybuzz::{Direction, Face, UnicodeBuffer};

use crate::records::{GlyphRecord, LineMetrics};

use super::{GlyphSource, SourceError, pixels_i16};

/// Wraps a [`GlyphSource`], replacing its kerning with adjustments derived
/// from shaping each two-character run.
///
/// The adjustment is how far the shaper moved the second glyph away from
/// where the first glyph's nominal advance would have put it. Results can
/// differ from the font's kerning table for scripts where shaping does more
/// than pair kerning.
pub struct ShapedKerning<'a, S> {
    inner: S,
    face: Face<'a>,
}

impl<'a, S: GlyphSource> ShapedKerning<'a, S> {
    pub fn new(inner: S, data: &'a [u8]) -> Result<Self, SourceError> {
        let face = Face::from_slice(data, 0)
            .ok_or_else(|| SourceError::InvalidFont("not a shapeable font face".to_string()))?;
        if units_to_pixels(1, face.units_per_em()).is_none() {
            return Err(SourceError::InvalidFont(format!(
                "units per em must be positive, got {}",
                face.units_per_em()
            )));
        }
        Ok(Self { inner, face })
    }
}

/// Scale factor from font units to pixels at `pixel_size`, `None` when the
/// face declares a non-positive em size
fn units_to_pixels(pixel_size: u16, units_per_em: i32) -> Option<f32> {
    (units_per_em > 0).then(|| f32::from(pixel_size) / units_per_em as f32)
}

impl<S: GlyphSource> GlyphSource for ShapedKerning<'_, S> {
    fn line_metrics(&self, pixel_size: u16) -> Result<LineMetrics, SourceError> {
        self.inner.line_metrics(pixel_size)
    }

    fn rasterize(&self, code: u8, pixel_size: u16) -> Result<Option<GlyphRecord>, SourceError> {
        self.inner.rasterize(code, pixel_size)
    }

    fn has_kerning(&self) -> bool {
        true
    }

    fn kerning_adjustment(
        &self,
        first: u8,
        second: u8,
        pixel_size: u16,
    ) -> Result<Option<(i16, i16)>, SourceError> {
        let run: String = [char::from(first), char::from(second)].into_iter().collect();
        let Some(first_glyph) = self.face.glyph_index(char::from(first)) else {
            return Ok(None);
        };
        let nominal = self
            .face
            .glyph_hor_advance(first_glyph)
            .ok_or_else(|| SourceError::Shaping(run.clone()))?;

        let mut buffer = UnicodeBuffer::new();
        buffer.push_str(&run);
        buffer.set_direction(Direction::LeftToRight);
        let shaped = rustybuzz::shape(&self.face, &[], buffer);

        // a ligature or decomposition has no pair to adjust
        let [first_pos, second_pos] = shaped.glyph_positions() else {
            return Ok(None);
        };

        let dx = first_pos.x_advance + second_pos.x_offset - i32::from(nominal);
        let dy = first_pos.y_advance + second_pos.y_offset;
        if dx == 0 && dy == 0 {
            return Ok(None);
        }

        let scale = units_to_pixels(pixel_size, self.face.units_per_em())
            .ok_or_else(|| SourceError::Shaping(run.clone()))?;
        let adjustment = (
            pixels_i16("shaped kerning", dx as f32 * scale)?,
            pixels_i16("shaped kerning", dy as f32 * scale)?,
        );

        Ok((adjustment != (0, 0)).then_some(adjustment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Never;

    impl GlyphSource for Never {
        fn line_metrics(&self, _: u16) -> Result<LineMetrics, SourceError> {
            Err(SourceError::MissingLineMetrics)
        }

        fn rasterize(&self, _: u8, _: u16) -> Result<Option<GlyphRecord>, SourceError> {
            Ok(None)
        }

        fn has_kerning(&self) -> bool {
            false
        }

        fn kerning_adjustment(
            &self,
            _: u8,
            _: u8,
            _: u16,
        ) -> Result<Option<(i16, i16)>, SourceError> {
            Ok(None)
        }
    }

    #[test]
    fn rejects_unparseable_face() {
        assert!(matches!(
            ShapedKerning::new(Never, b"GRF1"),
            Err(SourceError::InvalidFont(_))
        ));
    }

    #[test]
    fn font_units_scale_to_pixels() {
        assert_eq!(units_to_pixels(16, 1000), Some(0.016));
        assert_eq!(units_to_pixels(32, 2048), Some(0.015625));
    }

    #[test]
    fn degenerate_em_size_has_no_scale() {
        assert_eq!(units_to_pixels(16, 0), None);
        assert_eq!(units_to_pixels(16, -1000), None);
    }
}
