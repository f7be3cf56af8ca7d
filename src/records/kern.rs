use crate::{
    buffer::{GrfBufReader, GrfBufReaderError, GrfBufWriter},
    encoder::EncodeError,
};

use super::{CHAR_COUNT, KERN_BLOCK_HEADER_LEN, KERN_ENTRY_LEN, RecordError};

/// Adjustment applied when the block's first character is immediately
/// followed by `second`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KernEntry {
    pub second: u8,
    pub offset_x: i16,
    pub offset_y: i16,
}

impl KernEntry {
    pub fn new(second: u8, offset_x: i16, offset_y: i16) -> Self {
        Self {
            second,
            offset_x,
            offset_y,
        }
    }

    pub fn offset(&self) -> (i16, i16) {
        (self.offset_x, self.offset_y)
    }

    pub(crate) fn from_reader(reader: &mut GrfBufReader<'_>) -> Result<Self, GrfBufReaderError> {
        Ok(Self {
            second: reader.read_u8()?,
            offset_x: reader.read_i16()?,
            offset_y: reader.read_i16()?,
        })
    }

    pub(crate) fn write(&self, writer: &mut GrfBufWriter) {
        writer.write_u8(self.second);
        writer.write_i16(self.offset_x);
        writer.write_i16(self.offset_y);
    }
}

/// All kerning adjustments keyed by one first character.
///
/// Entries keep their insertion order and each second character appears at
/// most once, so a block never holds more than 256 entries. A block is never
/// empty; an empty set of adjustments is represented by no block at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KerningBlock {
    entries: Vec<KernEntry>,
}

impl KerningBlock {
    /// Collects `entries` into a block, returning `None` when there are none.
    ///
    /// Entries with a `(0, 0)` adjustment carry nothing and are skipped.
    ///
    /// # Examples
    ///
    /// ```
    /// use grf::records::{KernEntry, KerningBlock};
    ///
    /// let block = KerningBlock::from_entries([KernEntry::new(b'V', -1, 0)])
    ///     .unwrap()
    ///     .unwrap();
    /// assert_eq!(block.get(b'V'), Some((-1, 0)));
    /// assert_eq!(block.get(b'B'), None);
    ///
    /// assert_eq!(KerningBlock::from_entries([]), Ok(None));
    /// assert_eq!(KerningBlock::from_entries([KernEntry::new(b'B', 0, 0)]), Ok(None));
    /// ```
    pub fn from_entries(
        entries: impl IntoIterator<Item = KernEntry>,
    ) -> Result<Option<Self>, RecordError> {
        let mut seen = [false; CHAR_COUNT];
        let mut collected = Vec::new();

        for entry in entries {
            if entry.offset() == (0, 0) {
                continue;
            }
            let slot = &mut seen[usize::from(entry.second)];
            if *slot {
                return Err(RecordError::DuplicateKernEntry(entry.second));
            }
            *slot = true;
            collected.push(entry);
        }

        if collected.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self { entries: collected }))
    }

    pub fn entries(&self) -> &[KernEntry] {
        &self.entries
    }

    pub fn get(&self, second: u8) -> Option<(i16, i16)> {
        self.entries
            .iter()
            .find(|entry| entry.second == second)
            .map(KernEntry::offset)
    }

    /// Size of this block once serialized
    pub fn encoded_len(&self) -> usize {
        KERN_BLOCK_HEADER_LEN + self.entries.len() * KERN_ENTRY_LEN
    }

    pub(crate) fn write(&self, writer: &mut GrfBufWriter) -> Result<(), EncodeError> {
        let count = u16::try_from(self.entries.len()).map_err(|_| EncodeError::Overflow {
            what: "kerning entry count",
            value: self.entries.len(),
        })?;

        writer.write_u16(count);
        for entry in &self.entries {
            entry.write(writer);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn duplicate_second_character_is_rejected() {
        let entries = [
            KernEntry::new(b'V', -1, 0),
            KernEntry::new(b'W', -1, 0),
            KernEntry::new(b'V', -2, 0),
        ];
        assert_eq!(
            KerningBlock::from_entries(entries),
            Err(RecordError::DuplicateKernEntry(b'V'))
        );
    }

    #[test]
    fn zero_adjustments_are_skipped() {
        let block = KerningBlock::from_entries([
            KernEntry::new(b'o', 0, 0),
            KernEntry::new(b'a', -1, 0),
            KernEntry::new(b'e', 0, 1),
        ])
        .unwrap()
        .unwrap();

        assert_eq!(
            block.entries(),
            &[KernEntry::new(b'a', -1, 0), KernEntry::new(b'e', 0, 1)]
        );
        assert_eq!(block.get(b'o'), None);
    }

    #[test]
    fn insertion_order_is_kept() {
        let block = KerningBlock::from_entries([
            KernEntry::new(b'y', -1, 0),
            KernEntry::new(b'T', -2, 0),
            KernEntry::new(b'a', 0, 1),
        ])
        .unwrap()
        .unwrap();

        let seconds: Vec<u8> = block.entries().iter().map(|e| e.second).collect();
        assert_eq!(seconds, b"yTa".to_vec());
        assert_eq!(block.get(b'a'), Some((0, 1)));
    }

    #[test]
    fn serialized_layout() {
        let block = KerningBlock::from_entries([
            KernEntry::new(b'V', -1, 0),
            KernEntry::new(b'W', -2, 3),
        ])
        .unwrap()
        .unwrap();
        let mut writer = GrfBufWriter::new();
        block.write(&mut writer).unwrap();

        let bytes = writer.into_inner();
        assert_eq!(bytes.len(), block.encoded_len());
        assert_eq!(
            bytes,
            vec![2, 0, b'V', 0xFF, 0xFF, 0, 0, b'W', 0xFE, 0xFF, 3, 0]
        );

        let mut reader = GrfBufReader::from_buffer(&bytes[KERN_BLOCK_HEADER_LEN..]);
        assert_eq!(
            KernEntry::from_reader(&mut reader).unwrap(),
            KernEntry::new(b'V', -1, 0)
        );
    }

    #[test]
    fn full_block_fits_the_count_field() {
        let entries = (0..=u8::MAX).map(|second| KernEntry::new(second, 1, 0));
        let block = KerningBlock::from_entries(entries).unwrap().unwrap();
        let mut writer = GrfBufWriter::new();
        block.write(&mut writer).unwrap();

        assert_eq!(writer.len(), KERN_BLOCK_HEADER_LEN + 256 * KERN_ENTRY_LEN);
    }
}
