//! Encoder and zero-copy decoder for GRF, a pre-rasterized bitmap font
//! container for the 256 single-byte character codes.
//!
//! A GRF file holds a fixed header with two 256-entry offset tables followed
//! by variable-length glyph records and kerning blocks, so a reader can
//! resolve any character in constant time without an allocator. See
//! [`records`] for the byte layout.

use std::{io, path::Path};

use decoder::DecodeError;
use encoder::{EncodeError, EncodedLayout};
#[cfg(feature = "source")]
use source::SourceError;
use thiserror::Error;

pub mod buffer;
pub mod decoder;
pub mod document;
pub mod encoder;
pub mod records;
#[cfg(feature = "source")]
pub mod source;

pub use decoder::{GlyphRef, GrfFont, decode, lookup_glyph, lookup_kerning};
pub use document::FontDocument;
pub use encoder::encode;
pub use records::{Layout, LineMetrics};

#[derive(Debug, Error)]
pub enum GrfError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[cfg(feature = "source")]
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Reads and fully decodes the GRF file at `path`
pub fn read_grf(path: impl AsRef<Path>) -> Result<FontDocument, GrfError> {
    let bytes = std::fs::read(path)?;
    Ok(decode(&bytes)?)
}

/// Encodes `document` and writes it to `path`
pub fn write_grf(
    path: impl AsRef<Path>,
    document: &FontDocument,
    layout: Layout,
) -> Result<EncodedLayout, GrfError> {
    let (bytes, report) = encoder::encode_with_report(document, layout)?;
    std::fs::write(path, bytes)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_grf_round_trips_through_a_file() {
        let path = std::env::temp_dir().join(format!("grf-write-{}.grf", std::process::id()));
        let document = FontDocument::new(LineMetrics {
            ascender: 9,
            descender: -3,
            line_height: 14,
        });

        let report = write_grf(&path, &document, Layout::Minimal).unwrap();
        let len = std::fs::metadata(&path).unwrap().len();
        let decoded = read_grf(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(len as usize, report.total_len());
        assert_eq!(decoded, document);
    }

    #[test]
    fn reading_a_foreign_file_is_decode_error() {
        let path = std::env::temp_dir().join(format!("grf-foreign-{}.grf", std::process::id()));
        std::fs::write(&path, b"not a font").unwrap();
        let result = read_grf(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(
            result,
            Err(GrfError::Decode(DecodeError::ShortHeader(1034, 10)))
        ));
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let path = std::env::temp_dir()
            .join("grf-missing-dir")
            .join("nested")
            .join("out.grf");
        let document = FontDocument::new(LineMetrics::default());

        let err = write_grf(&path, &document, Layout::Extended).unwrap_err();
        assert!(matches!(err, GrfError::Io(_)));
    }
}
