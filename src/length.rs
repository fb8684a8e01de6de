//! Variable-width block length specifiers.
//!
//! The top two bits of the first byte select a width of one, two or three bytes;
//! the remaining bits hold the length, most significant byte first.

use crate::error::{Error, Result};
use crate::format::{LENGTH_SPECIFIER_SIZE_SHIFT, LENGTH_SPECIFIER_VALUE_MASK};

/// Width of an encoded length specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthWidth {
    One,
    Two,
    Three,
}

impl LengthWidth {
    /// All widths, narrowest first.
    pub const ALL: [LengthWidth; 3] = [LengthWidth::One, LengthWidth::Two, LengthWidth::Three];

    /// Width selected by a tag (top two bits of the first length byte).
    #[must_use]
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(LengthWidth::One),
            1 => Some(LengthWidth::Two),
            2 => Some(LengthWidth::Three),
            _ => None,
        }
    }

    #[must_use]
    pub fn tag(self) -> u8 {
        match self {
            LengthWidth::One => 0,
            LengthWidth::Two => 1,
            LengthWidth::Three => 2,
        }
    }

    /// Encoded size in bytes.
    #[must_use]
    pub fn bytes(self) -> usize {
        usize::from(self.tag()) + 1
    }

    /// Largest length this width can carry.
    #[must_use]
    pub fn max(self) -> usize {
        let bits = usize::from(LENGTH_SPECIFIER_SIZE_SHIFT) + 8 * (self.bytes() - 1);
        (1 << bits) - 1
    }

    /// Narrowest width that can carry `value`.
    pub fn for_value(value: usize) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|w| value <= w.max())
            .ok_or(Error::LengthOverflow {
                value,
                max: LengthWidth::Three.max(),
            })
    }
}

/// Largest payload length any block can declare.
pub const MAX_LENGTH: usize = (1 << 22) - 1;

/// Decode the length specifier at `buffer[offset..]`.
///
/// Returns `(length, bytes_consumed)`. Does not check that `length` bytes follow;
/// the block reader does that against the enclosing buffer.
pub fn decode_length(buffer: &[u8], offset: usize) -> Result<(usize, usize)> {
    let available = buffer.len().saturating_sub(offset);
    let first = *buffer.get(offset).ok_or(Error::TruncatedInput {
        offset,
        needed: 1,
        available,
    })?;
    let tag = first >> LENGTH_SPECIFIER_SIZE_SHIFT;
    let width = LengthWidth::from_tag(tag).ok_or(Error::InvalidLengthSpecifier { offset, tag })?;
    let n = width.bytes();
    if available < n {
        return Err(Error::TruncatedInput {
            offset,
            needed: n,
            available,
        });
    }

    let value = buffer[offset + 1..offset + n]
        .iter()
        .fold(usize::from(first & LENGTH_SPECIFIER_VALUE_MASK), |acc, &b| {
            (acc << 8) | usize::from(b)
        });
    Ok((value, n))
}

/// Encode `value` in the narrowest width that holds it.
pub fn encode_length(value: usize) -> Result<(LengthWidth, Vec<u8>)> {
    let width = LengthWidth::for_value(value)?;
    Ok((width, encode_length_with(value, width)?))
}

/// Encode `value` in exactly the given width.
pub fn encode_length_with(value: usize, width: LengthWidth) -> Result<Vec<u8>> {
    if value > width.max() {
        return Err(Error::LengthOverflow {
            value,
            max: width.max(),
        });
    }
    let n = width.bytes();
    let mut out = Vec::with_capacity(n);
    for i in (0..n).rev() {
        out.push((value >> (8 * i)) as u8);
    }
    out[0] |= width.tag() << LENGTH_SPECIFIER_SIZE_SHIFT;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn width_limits() {
        assert_eq!(LengthWidth::One.max(), 63);
        assert_eq!(LengthWidth::Two.max(), 16_383);
        assert_eq!(LengthWidth::Three.max(), MAX_LENGTH);
    }

    #[test]
    fn decodes_each_width() {
        assert_eq!(decode_length(&[0x2a], 0).unwrap(), (42, 1));
        assert_eq!(decode_length(&[0xff, 0x41, 0x02], 1).unwrap(), (0x102, 2));
        assert_eq!(decode_length(&[0x81, 0x00, 0x00], 0).unwrap(), (0x1_0000, 3));
    }

    #[test]
    fn tag_three_is_invalid() {
        assert!(matches!(
            decode_length(&[0xc0, 0, 0, 0], 0),
            Err(Error::InvalidLengthSpecifier { offset: 0, tag: 3 })
        ));
    }

    #[test]
    fn short_specifier_is_truncated() {
        assert!(matches!(
            decode_length(&[0x80, 0x00], 0),
            Err(Error::TruncatedInput { needed: 3, available: 2, .. })
        ));
        assert!(matches!(
            decode_length(&[], 0),
            Err(Error::TruncatedInput { needed: 1, available: 0, .. })
        ));
    }

    #[test]
    fn overflow_on_encode() {
        assert!(matches!(
            encode_length(MAX_LENGTH + 1),
            Err(Error::LengthOverflow { .. })
        ));
        assert!(matches!(
            encode_length_with(64, LengthWidth::One),
            Err(Error::LengthOverflow { value: 64, max: 63 })
        ));
    }

    proptest! {
        #[test]
        fn round_trips_in_range(value in 0usize..=MAX_LENGTH) {
            let (width, bytes) = encode_length(value).unwrap();
            prop_assert_eq!(bytes.len(), width.bytes());
            prop_assert_eq!(decode_length(&bytes, 0).unwrap(), (value, width.bytes()));
        }

        #[test]
        fn explicit_width_round_trips(value in 0usize..=63, wide in 0usize..3) {
            let width = LengthWidth::ALL[wide];
            let bytes = encode_length_with(value, width).unwrap();
            prop_assert_eq!(decode_length(&bytes, 0).unwrap(), (value, width.bytes()));
        }
    }
}
