//! Register lists: packed (address, length) descriptors each followed by the value bytes.
//!
//! A running address starts at zero. The one and two byte descriptors add a delta to
//! it, the three byte descriptor replaces it, and every entry advances it past the
//! registers it wrote.

use std::ops::Range;

use tracing::trace;

use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::format::{
    RegisterEncoding, REGS_2_ADDR_MASK, REGS_2_LEN_MASK, REGS_2_LEN_SHIFT, REGS_3_LEN_MASK,
    REGS_ADDR_MASK, REGS_LEN_MASK, REGS_LEN_SHIFT, REGS_SEL_SHIFT,
};

/// End of the 16-bit register address space.
const ADDRESS_SPACE: u32 = 0x1_0000;

/// One register write: `value.len()` consecutive 8-bit registers starting at `address`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegisterEntry {
    pub address: u16,
    pub value: Vec<u8>,
    /// Descriptor layout used on the wire.
    pub encoding: RegisterEncoding,
}

impl RegisterEntry {
    /// Entry using the absolute (three byte) descriptor; see [`assign_encodings`].
    #[must_use]
    pub fn new(address: u16, value: Vec<u8>) -> Self {
        Self {
            address,
            value,
            encoding: RegisterEncoding::Regs3,
        }
    }

    /// Split a write longer than one descriptor can carry into several entries.
    pub fn split_write(address: u16, bytes: &[u8]) -> Result<Vec<RegisterEntry>> {
        let max = RegisterEncoding::Regs3.max_len();
        if u32::from(address) + bytes.len() as u32 > ADDRESS_SPACE {
            return Err(Error::StructuralMismatch {
                offset: 0,
                reason: "register write past the 16-bit address space",
            });
        }
        Ok(bytes
            .chunks(max)
            .enumerate()
            .map(|(i, chunk)| RegisterEntry::new(address + (i * max) as u16, chunk.to_vec()))
            .collect())
    }

    /// Addresses of the registers this entry writes.
    pub fn addresses(&self) -> impl Iterator<Item = u16> {
        let start = u32::from(self.address);
        (start..start + self.value.len() as u32).map(|a| a as u16)
    }
}

/// A decoded descriptor before it is applied to the running address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterDescriptor {
    pub encoding: RegisterEncoding,
    /// Delta for `Regs`/`Regs2`, absolute address for `Regs3`.
    pub address: u16,
    /// Number of value bytes that follow.
    pub len: usize,
}

impl RegisterDescriptor {
    /// Parse the descriptor at the start of `raw`. `offset` is only used for errors.
    pub fn parse(raw: &[u8], offset: usize) -> Result<Self> {
        let first = *raw.first().ok_or(Error::TruncatedInput {
            offset,
            needed: 1,
            available: 0,
        })?;
        let selector = first >> REGS_SEL_SHIFT;
        let encoding = RegisterEncoding::from_selector(selector)
            .ok_or(Error::InvalidSelector { offset, selector })?;
        let n = encoding.descriptor_len();
        if raw.len() < n {
            return Err(Error::TruncatedInput {
                offset,
                needed: n,
                available: raw.len(),
            });
        }

        let (address, len) = match encoding {
            RegisterEncoding::Regs => (
                u16::from(first & REGS_ADDR_MASK),
                (first & REGS_LEN_MASK) >> REGS_LEN_SHIFT,
            ),
            RegisterEncoding::Regs2 => (
                (u16::from(first & REGS_2_ADDR_MASK) << 8) | u16::from(raw[1]),
                (first & REGS_2_LEN_MASK) >> REGS_2_LEN_SHIFT,
            ),
            RegisterEncoding::Regs3 => (
                u16::from_be_bytes([raw[1], raw[2]]),
                first & REGS_3_LEN_MASK,
            ),
        };
        Ok(Self {
            encoding,
            address,
            len: usize::from(len) + 1,
        })
    }

    /// Address of the first register, given the running address.
    #[must_use]
    pub fn resolve(&self, running: u32) -> u32 {
        match self.encoding {
            RegisterEncoding::Regs | RegisterEncoding::Regs2 => running + u32::from(self.address),
            RegisterEncoding::Regs3 => u32::from(self.address),
        }
    }

    /// Register addresses covered, given the running address.
    #[must_use]
    pub fn expand(&self, running: u32) -> Range<u32> {
        let start = self.resolve(running);
        start..start + self.len as u32
    }

    fn write(&self, out: &mut Vec<u8>) {
        let len = (self.len - 1) as u8;
        let sel = self.encoding.selector() << REGS_SEL_SHIFT;
        match self.encoding {
            RegisterEncoding::Regs => {
                out.push(sel | (len << REGS_LEN_SHIFT) | self.address as u8);
            }
            RegisterEncoding::Regs2 => {
                out.push(sel | (len << REGS_2_LEN_SHIFT) | (self.address >> 8) as u8);
                out.push(self.address as u8);
            }
            RegisterEncoding::Regs3 => {
                out.push(sel | len);
                out.extend_from_slice(&self.address.to_be_bytes());
            }
        }
    }
}

/// Decode a register list payload that starts at absolute offset `base`.
pub fn decode_registers(payload: &[u8], base: usize) -> Result<Vec<RegisterEntry>> {
    let mut cur = ByteCursor::new(payload, base);
    let mut entries = Vec::new();
    let mut running = 0u32;

    while !cur.is_empty() {
        let offset = cur.offset();
        let desc = RegisterDescriptor::parse(&payload[offset - base..], offset)?;
        cur.take(desc.encoding.descriptor_len())?;

        let range = desc.expand(running);
        if range.end > ADDRESS_SPACE {
            return Err(Error::StructuralMismatch {
                offset,
                reason: "register range past the 16-bit address space",
            });
        }
        let value = cur.take(desc.len)?.to_vec();
        trace!(address = range.start, len = desc.len, "register");
        entries.push(RegisterEntry {
            address: range.start as u16,
            value,
            encoding: desc.encoding,
        });
        running = range.end;
    }

    Ok(entries)
}

/// Encode a register list, using each entry's stored descriptor layout.
pub fn encode_registers(entries: &[RegisterEntry]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut running = 0u32;

    for entry in entries {
        let len = entry.value.len();
        let max = entry.encoding.max_len();
        if len == 0 {
            return Err(Error::StructuralMismatch {
                offset: out.len(),
                reason: "register entry without value bytes",
            });
        }
        if len > max {
            return Err(Error::LengthOverflow { value: len, max });
        }
        let start = u32::from(entry.address);
        if start + len as u32 > ADDRESS_SPACE {
            return Err(Error::StructuralMismatch {
                offset: out.len(),
                reason: "register range past the 16-bit address space",
            });
        }

        let address = match entry.encoding.max_delta() {
            Some(max_delta) => {
                let delta = start.checked_sub(running).ok_or(Error::StructuralMismatch {
                    offset: out.len(),
                    reason: "relative register address behind the previous entry",
                })?;
                if delta > max_delta {
                    return Err(Error::LengthOverflow {
                        value: delta as usize,
                        max: max_delta as usize,
                    });
                }
                delta as u16
            }
            None => entry.address,
        };

        RegisterDescriptor {
            encoding: entry.encoding,
            address,
            len,
        }
        .write(&mut out);
        out.extend_from_slice(&entry.value);
        running = start + len as u32;
    }

    Ok(out)
}

/// Pick the narrowest descriptor layout for every entry, in list order.
pub fn assign_encodings(entries: &mut [RegisterEntry]) {
    let mut running = 0u32;
    for entry in entries.iter_mut() {
        let start = u32::from(entry.address);
        let len = entry.value.len();
        entry.encoding = [RegisterEncoding::Regs, RegisterEncoding::Regs2]
            .into_iter()
            .find(|enc| {
                start >= running
                    && enc.max_delta().is_some_and(|max| start - running <= max)
                    && len <= enc.max_len()
            })
            .unwrap_or(RegisterEncoding::Regs3);
        running = start + len as u32;
    }
}
