//! Read position over a byte buffer.

/// A byte buffer and the current read offset.
///
/// Reads never fail: bytes past the end of the buffer read as zero and the
/// caller is told the read was short.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn seek(&mut self, offset: usize) {
        self.offset = offset;
    }

    pub fn advance(&mut self, n: usize) {
        self.offset = self.offset.saturating_add(n);
    }

    /// Whether `width` bytes at the cursor lie inside the buffer.
    pub fn in_bounds(&self, width: usize) -> bool {
        self.offset
            .checked_add(width)
            .is_some_and(|end| end <= self.data.len())
    }

    /// Little-endian value of `width` bytes (at most 8) at the cursor,
    /// without advancing. The flag is false when the read ran short.
    pub fn peek_le(&self, width: usize) -> (u64, bool) {
        let width = width.min(8);
        let mut value = 0u64;
        for i in 0..width {
            let byte = self
                .offset
                .checked_add(i)
                .and_then(|at| self.data.get(at))
                .copied()
                .unwrap_or(0);
            value |= u64::from(byte) << (8 * i);
        }
        (value, self.in_bounds(width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_little_endian() {
        let data = [0x09, 0x00, 0x34, 0x12];
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.peek_le(2), (9, true));
        cursor.seek(2);
        assert_eq!(cursor.peek_le(2), (0x1234, true));
        assert_eq!(cursor.offset(), 2);
    }

    #[test]
    fn test_short_read_zero_fills() {
        let data = [0xff, 0x01];
        let mut cursor = Cursor::new(&data);
        cursor.advance(1);
        assert_eq!(cursor.peek_le(4), (0x01, false));
        cursor.seek(10);
        assert_eq!(cursor.peek_le(4), (0, false));
    }

    #[test]
    fn test_bounds() {
        let data = [0u8; 4];
        let mut cursor = Cursor::new(&data);
        assert!(cursor.in_bounds(4));
        assert!(!cursor.in_bounds(5));
        cursor.seek(usize::MAX);
        assert!(!cursor.in_bounds(1));
        assert_eq!(cursor.peek_le(1), (0, false));
        cursor.advance(10);
        assert_eq!(cursor.offset(), usize::MAX);
    }
}
