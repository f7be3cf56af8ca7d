use thiserror::Error;

macro_rules! impl_read {
    ($fn_name:ident, $typ:ty) => {
        pub fn $fn_name(&mut self) -> Result<$typ, GrfBufReaderError> {
            Ok(<$typ>::from_le_bytes(self.read_array()?))
        }
    };
}

macro_rules! impl_write {
    ($fn_name:ident, $typ:ty) => {
        pub fn $fn_name(&mut self, value: $typ) {
            self.inner.extend_from_slice(&value.to_le_bytes());
        }
    };
}

/// Represents the possible errors that can occur when using `GrfBufReader`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrfBufReaderError {
    /// A read needed more bytes than remain in the buffer.
    #[error("Unexpected end of data: needed {needed} bytes at offset {pos}, buffer holds {len}")]
    UnexpectedEof { pos: usize, needed: usize, len: usize },

    /// A seek targeted a position past the end of the buffer.
    #[error("Failed to seek to offset {pos}, buffer holds {len}")]
    FailedToSeek { pos: u64, len: usize },
}

/// A cursor over an immutable byte slice.
///
/// Every read is bounds-checked; nothing here can index past the end
/// of the borrowed data. All scalars are little-endian.
#[derive(Debug, Clone)]
pub struct GrfBufReader<'a> {
    inner: &'a [u8],
    pos: usize,
}

impl<'a> GrfBufReader<'a> {
    /// Returns a new reader positioned at the start of `buffer`
    pub fn from_buffer(buffer: &'a [u8]) -> Self {
        Self {
            inner: buffer,
            pos: 0,
        }
    }

    /// Current cursor position from the start of the buffer
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Seeks to a specific place in the buffer
    /// from the start of the data
    ///
    /// # Examples
    ///
    /// ```
    /// use grf::buffer::GrfBufReader;
    ///
    /// let data = [10, 0, 0, 0, 20, 0, 0, 0]; // two little-endian u32 values
    /// let mut reader = GrfBufReader::from_buffer(&data);
    ///
    /// reader.seek_to(4).unwrap();
    /// assert_eq!(reader.read_u32().unwrap(), 20);
    /// assert!(reader.seek_to(9).is_err());
    /// ```
    pub fn seek_to(&mut self, pos: u64) -> Result<(), GrfBufReaderError> {
        let len = self.inner.len();
        match usize::try_from(pos) {
            Ok(target) if target <= len => {
                self.pos = target;
                Ok(())
            }
            _ => Err(GrfBufReaderError::FailedToSeek { pos, len }),
        }
    }

    /// Skips n bytes from the CURRENT cursor position
    pub fn skip(&mut self, n: usize) -> Result<(), GrfBufReaderError> {
        self.read_bytes(n).map(|_| ())
    }

    /// Borrows the next `n` bytes and advances past them
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], GrfBufReaderError> {
        let eof = GrfBufReaderError::UnexpectedEof {
            pos: self.pos,
            needed: n,
            len: self.inner.len(),
        };
        let end = self.pos.checked_add(n).ok_or_else(|| eof.clone())?;
        let bytes = self.inner.get(self.pos..end).ok_or(eof)?;
        self.pos = end;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], GrfBufReaderError> {
        let rest = self.inner.get(self.pos..).unwrap_or_default();
        let (head, _) = rest
            .split_first_chunk::<N>()
            .ok_or(GrfBufReaderError::UnexpectedEof {
                pos: self.pos,
                needed: N,
                len: self.inner.len(),
            })?;
        self.pos += N;
        Ok(*head)
    }

    impl_read!(read_u32, u32);
    impl_read!(read_i16, i16);
    impl_read!(read_u16, u16);
    impl_read!(read_u8, u8);
}

/// An append-only byte sink.
///
/// Bytes are never rewritten once appended, so a length taken before an
/// append stays a valid offset regardless of how the storage reallocates.
#[derive(Debug, Default, Clone)]
pub struct GrfBufWriter {
    inner: Vec<u8>,
}

impl GrfBufWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.inner.extend_from_slice(bytes);
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.inner
    }

    impl_write!(write_u32, u32);
    impl_write!(write_i16, i16);
    impl_write!(write_u16, u16);
    impl_write!(write_u8, u8);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_little_endian_scalars() {
        let data = [0x30, 0x46, 0x52, 0x47, 0xFE, 0xFF, 0x07, 0x00, 0x41];
        let mut reader = GrfBufReader::from_buffer(&data);

        assert_eq!(reader.read_u32().unwrap(), 0x4752_4630);
        assert_eq!(reader.read_i16().unwrap(), -2);
        assert_eq!(reader.read_u16().unwrap(), 7);
        assert_eq!(reader.read_u8().unwrap(), b'A');
        assert_eq!(reader.position(), data.len());
    }

    #[test]
    fn short_read_reports_position_and_does_not_advance() {
        let data = [1, 2, 3];
        let mut reader = GrfBufReader::from_buffer(&data);
        reader.skip(2).unwrap();

        assert_eq!(
            reader.read_u16(),
            Err(GrfBufReaderError::UnexpectedEof {
                pos: 2,
                needed: 2,
                len: 3
            })
        );
        assert_eq!(reader.position(), 2);
        assert_eq!(reader.read_u8().unwrap(), 3);
    }

    #[test]
    fn read_bytes_rejects_overflowing_lengths() {
        let data = [0u8; 4];
        let mut reader = GrfBufReader::from_buffer(&data);
        reader.seek_to(1).unwrap();

        assert!(reader.read_bytes(usize::MAX).is_err());
        assert_eq!(reader.read_bytes(3).unwrap(), &[0, 0, 0]);
    }

    #[test]
    fn seek_to_end_is_allowed_but_not_past_it() {
        let data = [0u8; 4];
        let mut reader = GrfBufReader::from_buffer(&data);

        assert!(reader.seek_to(4).is_ok());
        assert!(reader.read_u8().is_err());
        assert_eq!(
            reader.seek_to(5),
            Err(GrfBufReaderError::FailedToSeek { pos: 5, len: 4 })
        );
    }

    #[test]
    fn writer_appends_in_order() {
        let mut writer = GrfBufWriter::new();
        writer.write_u32(0x4752_4631);
        writer.write_i16(-1);
        writer.write_u16(0x0102);
        writer.write_u8(9);
        writer.write_bytes(&[7, 7]);

        assert_eq!(writer.len(), 11);
        assert_eq!(
            writer.into_inner(),
            vec![0x31, 0x46, 0x52, 0x47, 0xFF, 0xFF, 0x02, 0x01, 9, 7, 7]
        );
    }
}
