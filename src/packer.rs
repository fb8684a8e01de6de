//! Static data packer: encode a block tree to a blob, END block and CRC included.

use std::io::Write;

use crate::block::write_block;
use crate::crc;
use crate::error::{Error, Result};
use crate::format::{
    BlockId, BLOCK_HEADER_ID_MASK, BLOCK_HEADER_ID_VERSION_SHIFT, CRC_LEN, STATIC_DATA_VERSION,
};
use crate::length::encode_length;
use crate::pdaf::encode_pdaf_pixel_location;
use crate::reader::{StaticData, TypedBlock};
use crate::regs::encode_registers;
use crate::rules::encode_rules;

/// Encode one block's payload; returns the block id and the payload bytes.
pub fn encode_block(block: &TypedBlock) -> Result<(u8, Vec<u8>)> {
    let payload = match block {
        TypedBlock::Dummy(payload) | TypedBlock::License(payload) => payload.clone(),
        TypedBlock::DataVersion(version) => version.to_bytes().to_vec(),
        TypedBlock::RegisterList { registers, .. } => encode_registers(registers)?,
        TypedBlock::RuleBlock { rules, .. } => encode_rules(rules)?,
        TypedBlock::PdafPixelLocation { location, .. } => encode_pdaf_pixel_location(location)?,
        TypedBlock::Unknown { id, payload } => {
            if BlockId::from(*id).is_known() {
                return Err(Error::StructuralMismatch {
                    offset: 0,
                    reason: "opaque block uses a known block id",
                });
            }
            payload.clone()
        }
    };
    Ok((block.id().into(), payload))
}

/// Encode a whole blob: every block, then the END block carrying the CRC of
/// everything before it.
///
/// A blob needs at least one block before END: the first id byte also carries the
/// format version, which the END id cannot.
pub fn encode(data: &StaticData) -> Result<Vec<u8>> {
    if data.blocks.is_empty() {
        return Err(Error::StructuralMismatch {
            offset: 0,
            reason: "static data without blocks",
        });
    }
    let mut out = Vec::new();
    for (i, block) in data.blocks.iter().enumerate() {
        let (mut id, payload) = encode_block(block)?;
        if i == 0 {
            if id > BLOCK_HEADER_ID_MASK {
                return Err(Error::StructuralMismatch {
                    offset: 0,
                    reason: "first block id does not fit beside the format version",
                });
            }
            id |= STATIC_DATA_VERSION << BLOCK_HEADER_ID_VERSION_SHIFT;
        }
        write_block(&mut out, id, &payload)?;
    }

    out.push(BlockId::End.into());
    let (_, len) = encode_length(CRC_LEN)?;
    out.extend_from_slice(&len);
    crc::append(&mut out);
    Ok(out)
}

/// Write the encoded blob to `out`. Returns the number of bytes written.
pub fn pack_static_data<W: Write>(out: &mut W, data: &StaticData) -> Result<u64> {
    let bytes = encode(data)?;
    out.write_all(&bytes)?;
    Ok(bytes.len() as u64)
}

impl StaticData {
    /// Encode to a blob; see [`encode`].
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        encode(self)
    }
}
