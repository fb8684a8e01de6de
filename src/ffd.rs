//! Fixed function data tables: column and row descriptors of special pixel areas.

use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::format::{FfdPixelCode, FFD_ENTRY_LEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FfdEntry {
    pub pixelcode: FfdPixelCode,
    /// Reserved byte, zero in conforming data; kept as read.
    #[cfg_attr(feature = "serde", serde(default))]
    pub reserved: u8,
    pub value: u16,
}

impl FfdEntry {
    #[must_use]
    pub fn new(pixelcode: FfdPixelCode, value: u16) -> Self {
        Self {
            pixelcode,
            reserved: 0,
            value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ffd {
    pub column_descs: Vec<FfdEntry>,
    pub row_descs: Vec<FfdEntry>,
}

impl Ffd {
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.column_descs.len()
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_descs.len()
    }

    /// Column descriptors followed by row descriptors, in wire order.
    pub fn entries(&self) -> impl Iterator<Item = &FfdEntry> {
        self.column_descs.iter().chain(self.row_descs.iter())
    }

    /// Encoded size in bytes.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        2 + (self.column_count() + self.row_count()) * FFD_ENTRY_LEN
    }
}

fn read_entries(cur: &mut ByteCursor<'_>, count: u8) -> Result<Vec<FfdEntry>> {
    (0..count)
        .map(|_| {
            let pixelcode = FfdPixelCode::from(cur.u8()?);
            let reserved = cur.u8()?;
            let value = cur.be16()?;
            Ok(FfdEntry {
                pixelcode,
                reserved,
                value,
            })
        })
        .collect()
}

/// Read an FFD table from the cursor, leaving any following bytes unread.
pub(crate) fn read_ffd(cur: &mut ByteCursor<'_>) -> Result<Ffd> {
    let num_columns = cur.u8()?;
    let num_rows = cur.u8()?;
    let needed = (usize::from(num_columns) + usize::from(num_rows)) * FFD_ENTRY_LEN;
    if cur.remaining() < needed {
        return Err(Error::TruncatedInput {
            offset: cur.offset(),
            needed,
            available: cur.remaining(),
        });
    }
    Ok(Ffd {
        column_descs: read_entries(cur, num_columns)?,
        row_descs: read_entries(cur, num_rows)?,
    })
}

/// Decode an FFD payload that starts at absolute offset `base`.
///
/// The declared counts must account for every byte of the payload.
pub fn decode_ffd(payload: &[u8], base: usize) -> Result<Ffd> {
    let mut cur = ByteCursor::new(payload, base);
    let ffd = read_ffd(&mut cur)?;
    cur.finish("ffd entries beyond the declared counts")?;
    Ok(ffd)
}

pub(crate) fn write_ffd(out: &mut Vec<u8>, ffd: &Ffd) -> Result<()> {
    for descs in [&ffd.column_descs, &ffd.row_descs] {
        if descs.len() > usize::from(u8::MAX) {
            return Err(Error::LengthOverflow {
                value: descs.len(),
                max: usize::from(u8::MAX),
            });
        }
    }
    out.push(ffd.column_count() as u8);
    out.push(ffd.row_count() as u8);
    for entry in ffd.entries() {
        out.push(entry.pixelcode.into());
        out.push(entry.reserved);
        out.extend_from_slice(&entry.value.to_be_bytes());
    }
    Ok(())
}

pub fn encode_ffd(ffd: &Ffd) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(ffd.encoded_len());
    write_ffd(&mut out, ffd)?;
    Ok(out)
}
