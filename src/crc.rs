//! Trailer checksum: CRC-32 (IEEE) over every byte before the last four, stored big-endian.

use crc32fast::Hasher;

use crate::error::{Error, Result};
use crate::format::CRC_LEN;

/// CRC of `data`.
#[must_use]
pub fn compute(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Check the trailer of a whole blob; returns the CRC on success.
pub fn verify(buffer: &[u8]) -> Result<u32> {
    if buffer.len() < CRC_LEN {
        return Err(Error::TruncatedInput {
            offset: 0,
            needed: CRC_LEN,
            available: buffer.len(),
        });
    }
    let (data, trailer) = buffer.split_at(buffer.len() - CRC_LEN);
    let stored = u32::from_be_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    let computed = compute(data);
    if stored != computed {
        return Err(Error::ChecksumMismatch { stored, computed });
    }
    Ok(computed)
}

/// Append the trailer CRC of everything already in `out`.
pub fn append(out: &mut Vec<u8>) {
    let crc = compute(out);
    out.extend_from_slice(&crc.to_be_bytes());
}
