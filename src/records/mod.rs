//! Fixed layout of the GRF container and the records stored in it.
//!
//! A file is a header followed by a densely packed glyph region and, for the
//! extended layout, a kerning region:
//!
//! ```text
//! magic: u32 | ascender, descender, line_height: i16
//! glyph offsets: [u32; 256]
//! kern offsets: [u32; 256]          (extended layout only)
//! glyph records ...
//! kerning blocks ...                (extended layout only)
//! ```
//!
//! Offsets in both tables are relative to the first byte after the header.
//! All scalars are little-endian and no padding is inserted anywhere.

use thiserror::Error;

pub mod glyph;
pub mod header;
pub mod kern;

pub use glyph::{GlyphMetrics, GlyphRecord};
pub use header::{GrfHeader, LineMetrics};
pub use kern::{KernEntry, KerningBlock};

/// Magic of the minimal layout, ASCII "GRF0".
pub const GRF_MAGIC_V0: u32 = 0x4752_4630;

/// Magic of the extended layout, ASCII "GRF1".
pub const GRF_MAGIC_V1: u32 = 0x4752_4631;

/// Offset table value meaning "no entry".
pub const GRF_NONE: u32 = u32::MAX;

/// Size of the single-byte character space.
pub const CHAR_COUNT: usize = 256;

/// magic + ascender + descender + line height
pub(crate) const METRICS_LEN: usize = 4 + 3 * 2;
pub(crate) const OFFSET_TABLE_LEN: usize = CHAR_COUNT * 4;

/// Fixed part of a glyph record preceding the bitmap.
pub const GLYPH_RECORD_HEADER_LEN: usize = 4 * 2 + 2 * 2;

/// The entry count preceding the entries of a kerning block.
pub const KERN_BLOCK_HEADER_LEN: usize = 2;

/// secondChar + offsetX + offsetY
pub const KERN_ENTRY_LEN: usize = 1 + 2 * 2;

/// The header variant of a file.
///
/// The variant is identified by the magic number alone so that minimal files
/// stay byte-compatible with readers that predate kerning support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Layout {
    /// Format version 0: metrics and glyphs only.
    Minimal,
    /// Format version 1: adds the kerning offset table and region.
    #[default]
    Extended,
}

impl Layout {
    pub fn from_magic(magic: u32) -> Option<Self> {
        match magic {
            GRF_MAGIC_V0 => Some(Self::Minimal),
            GRF_MAGIC_V1 => Some(Self::Extended),
            _ => None,
        }
    }

    pub fn magic(self) -> u32 {
        match self {
            Self::Minimal => GRF_MAGIC_V0,
            Self::Extended => GRF_MAGIC_V1,
        }
    }

    pub fn has_kerning(self) -> bool {
        self == Self::Extended
    }

    /// Length of the header, which is also the anchor every offset is
    /// relative to.
    pub fn header_len(self) -> usize {
        match self {
            Self::Minimal => METRICS_LEN + OFFSET_TABLE_LEN,
            Self::Extended => METRICS_LEN + 2 * OFFSET_TABLE_LEN,
        }
    }

    pub(crate) fn glyph_table_start(self) -> usize {
        METRICS_LEN
    }

    pub(crate) fn kern_table_start(self) -> Option<usize> {
        self.has_kerning().then_some(METRICS_LEN + OFFSET_TABLE_LEN)
    }
}

/// Represents the errors which may occur when constructing records that
/// would violate the format's invariants
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("A {width}x{height} glyph requires a bitmap of {expected} bytes, got {got} bytes")]
    BitmapSize {
        width: u16,
        height: u16,
        expected: usize,
        got: usize,
    },

    #[error("Kerning block lists second character {0:#04x} more than once")]
    DuplicateKernEntry(u8),
}
