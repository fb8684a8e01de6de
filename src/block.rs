//! Block reader: walks a buffer as a sequence of `(id, length, payload)` blocks.
//!
//! The reader only slices; it never interprets payloads. Top-level readers stop at
//! the END block and keep it for the integrity check, nested readers (rule bodies)
//! run until their slice is exhausted.

use tracing::trace;

use crate::error::{Error, Result};
use crate::format::{
    BlockId, BLOCK_HEADER_ID_MASK, BLOCK_HEADER_ID_VERSION_SHIFT, CRC_LEN, STATIC_DATA_VERSION,
};
use crate::length::{decode_length, encode_length};

/// One block as found in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawBlock<'a> {
    /// Block (or rule) id, with the format version bits already stripped.
    pub id: u8,
    /// Absolute offset of the id byte.
    pub offset: usize,
    /// Id byte plus length specifier.
    pub header_len: usize,
    pub payload: &'a [u8],
}

impl<'a> RawBlock<'a> {
    /// Absolute offset of the first payload byte.
    #[must_use]
    pub fn payload_offset(&self) -> usize {
        self.offset + self.header_len
    }

    /// Total size of the block in the buffer.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        self.header_len + self.payload.len()
    }
}

/// Lazy iterator over the blocks of a buffer.
///
/// Yields `Err` at most once; the iterator is fused after an error.
#[derive(Debug, Clone)]
pub struct BlockReader<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
    top_level: bool,
    first: bool,
    done: bool,
    end: Option<RawBlock<'a>>,
}

impl<'a> BlockReader<'a> {
    /// Reader for a whole blob: checks the format version in the first id byte
    /// and stops at the END block.
    #[must_use]
    pub fn top_level(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            base: 0,
            top_level: true,
            first: true,
            done: false,
            end: None,
        }
    }

    /// Reader for a block sequence nested in a payload that starts at `base`.
    #[must_use]
    pub fn nested(data: &'a [u8], base: usize) -> Self {
        Self {
            data,
            pos: 0,
            base,
            top_level: false,
            first: false,
            done: false,
            end: None,
        }
    }

    /// The END block, once the reader has reached it.
    #[must_use]
    pub fn end_block(&self) -> Option<&RawBlock<'a>> {
        self.end.as_ref()
    }

    /// The END block, or `TruncatedInput` if the buffer ran out before one.
    pub fn expect_end(&self) -> Result<&RawBlock<'a>> {
        self.end.as_ref().ok_or(Error::TruncatedInput {
            offset: self.base + self.data.len(),
            needed: 2 + CRC_LEN,
            available: 0,
        })
    }

    fn read_one(&mut self) -> Result<RawBlock<'a>> {
        let offset = self.base + self.pos;
        let raw_id = self.data[self.pos];
        let id = if self.first {
            let version = raw_id >> BLOCK_HEADER_ID_VERSION_SHIFT;
            if version != STATIC_DATA_VERSION {
                return Err(Error::UnsupportedVersion {
                    offset,
                    found: version,
                    supported: STATIC_DATA_VERSION,
                });
            }
            raw_id & BLOCK_HEADER_ID_MASK
        } else {
            raw_id
        };

        let (len, len_bytes) = decode_length(self.data, self.pos + 1).map_err(|e| match e {
            Error::TruncatedInput {
                offset: o,
                needed,
                available,
            } => Error::TruncatedInput {
                offset: self.base + o,
                needed,
                available,
            },
            Error::InvalidLengthSpecifier { offset: o, tag } => Error::InvalidLengthSpecifier {
                offset: self.base + o,
                tag,
            },
            other => other,
        })?;

        let header_len = 1 + len_bytes;
        let start = self.pos + header_len;
        let available = self.data.len() - start;
        if len > available {
            return Err(Error::TruncatedInput {
                offset: self.base + start,
                needed: len,
                available,
            });
        }

        self.pos = start + len;
        self.first = false;
        trace!(offset, id, len, "block");
        Ok(RawBlock {
            id,
            offset,
            header_len,
            payload: &self.data[start..start + len],
        })
    }
}

impl<'a> Iterator for BlockReader<'a> {
    type Item = Result<RawBlock<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos >= self.data.len() {
            return None;
        }

        let block = match self.read_one() {
            Ok(block) => block,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        if self.top_level && block.id == u8::from(BlockId::End) {
            self.done = true;
            if block.payload.len() != CRC_LEN {
                return Some(Err(Error::StructuralMismatch {
                    offset: block.payload_offset(),
                    reason: "end block payload is not a 4-byte CRC",
                }));
            }
            if self.pos != self.data.len() {
                return Some(Err(Error::StructuralMismatch {
                    offset: self.base + self.pos,
                    reason: "data after end block",
                }));
            }
            self.end = Some(block);
            return None;
        }

        Some(Ok(block))
    }
}

/// Append one block (id, narrowest length specifier, payload) to `out`.
pub fn write_block(out: &mut Vec<u8>, id: u8, payload: &[u8]) -> Result<()> {
    let (_, len) = encode_length(payload.len())?;
    out.push(id);
    out.extend_from_slice(&len);
    out.extend_from_slice(payload);
    Ok(())
}
