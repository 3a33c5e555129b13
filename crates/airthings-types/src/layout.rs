//! Little-endian fixed-layout field descriptions.
//!
//! A [`Layout`] is an ordered list of field widths/signedness. Unpacking a
//! buffer yields one `i64` per field, in order.

use bytes::Buf;

use crate::error::ParseError;

/// One field of a packed little-endian record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    U8,
    U16,
    I16,
    U32,
}

impl Field {
    /// Encoded width in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Field::U8 => 1,
            Field::U16 | Field::I16 => 2,
            Field::U32 => 4,
        }
    }
}

/// An ordered, packed (no padding) little-endian record description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    fields: &'static [Field],
}

impl Layout {
    #[must_use]
    pub const fn new(fields: &'static [Field]) -> Self {
        Self { fields }
    }

    /// Total encoded size in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        let mut total = 0;
        let mut i = 0;
        while i < self.fields.len() {
            total += self.fields[i].size();
            i += 1;
        }
        total
    }

    /// Number of fields produced by [`unpack`](Self::unpack).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Unpack `data`, which must be exactly [`size`](Self::size) bytes long.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::LengthMismatch`] for any other length.
    pub fn unpack(&self, data: &[u8]) -> Result<Vec<i64>, ParseError> {
        if data.len() != self.size() {
            return Err(ParseError::LengthMismatch {
                expected: self.size(),
                actual: data.len(),
            });
        }

        let mut buf = data;
        let values = self
            .fields
            .iter()
            .map(|field| match field {
                Field::U8 => i64::from(buf.get_u8()),
                Field::U16 => i64::from(buf.get_u16_le()),
                Field::I16 => i64::from(buf.get_i16_le()),
                Field::U32 => i64::from(buf.get_u32_le()),
            })
            .collect();
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIXED: Layout = Layout::new(&[Field::U8, Field::I16, Field::U32, Field::U16]);

    #[test]
    fn test_layout_size() {
        assert_eq!(MIXED.size(), 9);
        assert_eq!(MIXED.len(), 4);
        assert_eq!(Layout::new(&[]).size(), 0);
    }

    #[test]
    fn test_unpack_little_endian() {
        let data = [
            0x7F, // u8 = 127
            0xFE, 0xFF, // i16 = -2
            0x78, 0x56, 0x34, 0x12, // u32 = 0x12345678
            0x34, 0x12, // u16 = 0x1234
        ];
        let values = MIXED.unpack(&data).unwrap();
        assert_eq!(values, vec![127, -2, 0x1234_5678, 0x1234]);
    }

    #[test]
    fn test_unpack_rejects_short_and_long() {
        assert_eq!(
            MIXED.unpack(&[0; 8]),
            Err(ParseError::LengthMismatch {
                expected: 9,
                actual: 8
            })
        );
        assert!(MIXED.unpack(&[0; 10]).is_err());
    }
}
