use crate::{
    encoder::{self, EncodeError},
    records::{CHAR_COUNT, GlyphRecord, KerningBlock, Layout, LineMetrics},
};

/// An in-memory bitmap font: font-wide metrics plus, for each of the 256
/// character codes, an optional glyph and an optional kerning block.
///
/// This is what the encoder consumes and what the decoder reconstructs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontDocument {
    metrics: LineMetrics,
    glyphs: [Option<GlyphRecord>; CHAR_COUNT],
    kerning: [Option<KerningBlock>; CHAR_COUNT],
}

impl FontDocument {
    /// An empty document with no glyphs and no kerning
    pub fn new(metrics: LineMetrics) -> Self {
        Self {
            metrics,
            glyphs: std::array::from_fn(|_| None),
            kerning: std::array::from_fn(|_| None),
        }
    }

    pub fn metrics(&self) -> LineMetrics {
        self.metrics
    }

    pub fn glyph(&self, code: u8) -> Option<&GlyphRecord> {
        self.glyphs[usize::from(code)].as_ref()
    }

    pub fn set_glyph(&mut self, code: u8, glyph: Option<GlyphRecord>) -> &mut Self {
        self.glyphs[usize::from(code)] = glyph;
        self
    }

    pub fn kerning_block(&self, first: u8) -> Option<&KerningBlock> {
        self.kerning[usize::from(first)].as_ref()
    }

    pub fn set_kerning(&mut self, first: u8, block: Option<KerningBlock>) -> &mut Self {
        self.kerning[usize::from(first)] = block;
        self
    }

    /// The adjustment for `first` immediately followed by `second`, if any
    pub fn kerning(&self, first: u8, second: u8) -> Option<(i16, i16)> {
        self.kerning_block(first)?.get(second)
    }

    /// Present glyphs in ascending code order
    pub fn glyphs(&self) -> impl Iterator<Item = (u8, &GlyphRecord)> {
        (0..=u8::MAX).zip(&self.glyphs).filter_map(|(code, glyph)| Some((code, glyph.as_ref()?)))
    }

    /// Present kerning blocks in ascending first-character order
    pub fn kerning_blocks(&self) -> impl Iterator<Item = (u8, &KerningBlock)> {
        (0..=u8::MAX).zip(&self.kerning).filter_map(|(code, block)| Some((code, block.as_ref()?)))
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.iter().flatten().count()
    }

    pub fn has_kerning(&self) -> bool {
        self.kerning.iter().any(Option::is_some)
    }

    /// Serializes the document, see [`encoder::encode`]
    pub fn encode(&self, layout: Layout) -> Result<Vec<u8>, EncodeError> {
        encoder::encode(self, layout)
    }
}
