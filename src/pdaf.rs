//! PDAF pixel location tables and PDAF readout information.
//!
//! A pixel location table lays out groups of block descriptors over the frame;
//! every block descriptor names a block type, and block type `n` refers to the
//! `n`th pixel descriptor group that follows the block descriptor groups.

use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::ffd::{read_ffd, write_ffd, Ffd};
use crate::format::{PdafPixelType, PdafReadoutOrder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockDesc {
    pub block_type_id: u8,
    pub repeat_x: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockDescGroup {
    pub repeat_y: u8,
    pub block_descs: Vec<BlockDesc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PixelDesc {
    pub pixel_type: PdafPixelType,
    pub small_offset_x: u8,
    pub small_offset_y: u8,
}

/// Decoded PDAF pixel location block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PdafPixelLocation {
    pub main_offset_x: u16,
    pub main_offset_y: u16,
    pub global_pdaf_type: u8,
    pub block_width: u8,
    pub block_height: u8,
    pub block_desc_groups: Vec<BlockDescGroup>,
    /// Pixel descriptors, indexed by block type id.
    pub pixel_desc_groups: Vec<Vec<PixelDesc>>,
}

impl PdafPixelLocation {
    /// Number of pixel descriptor groups the block descriptors call for.
    #[must_use]
    pub fn num_block_types(&self) -> usize {
        self.block_desc_groups
            .iter()
            .flat_map(|g| g.block_descs.iter())
            .map(|d| usize::from(d.block_type_id) + 1)
            .max()
            .unwrap_or(0)
    }

    /// Pixel descriptors of one block type.
    #[must_use]
    pub fn pixels_of(&self, block_type_id: u8) -> Option<&[PixelDesc]> {
        self.pixel_desc_groups
            .get(usize::from(block_type_id))
            .map(Vec::as_slice)
    }
}

/// Decode a PDAF pixel location payload that starts at absolute offset `base`.
pub fn decode_pdaf_pixel_location(payload: &[u8], base: usize) -> Result<PdafPixelLocation> {
    let mut cur = ByteCursor::new(payload, base);
    let main_offset_x = cur.be16()?;
    let main_offset_y = cur.be16()?;
    let global_pdaf_type = cur.u8()?;
    let block_width = cur.u8()?;
    let block_height = cur.u8()?;
    let num_groups = cur.be16()?;

    let mut num_block_types = 0usize;
    let mut block_desc_groups = Vec::new();
    for _ in 0..num_groups {
        let num_descs = cur.be16()?;
        let repeat_y = cur.u8()?;
        let mut block_descs = Vec::new();
        for _ in 0..num_descs {
            let block_type_id = cur.u8()?;
            let repeat_x = cur.be16()?;
            num_block_types = num_block_types.max(usize::from(block_type_id) + 1);
            block_descs.push(BlockDesc {
                block_type_id,
                repeat_x,
            });
        }
        block_desc_groups.push(BlockDescGroup {
            repeat_y,
            block_descs,
        });
    }

    let mut pixel_desc_groups = Vec::with_capacity(num_block_types);
    for _ in 0..num_block_types {
        let num_pixels = cur.u8()?;
        let group = (0..num_pixels)
            .map(|_| {
                Ok(PixelDesc {
                    pixel_type: PdafPixelType::from(cur.u8()?),
                    small_offset_x: cur.u8()?,
                    small_offset_y: cur.u8()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        pixel_desc_groups.push(group);
    }
    cur.finish("pdaf pixel location data beyond the declared counts")?;

    Ok(PdafPixelLocation {
        main_offset_x,
        main_offset_y,
        global_pdaf_type,
        block_width,
        block_height,
        block_desc_groups,
        pixel_desc_groups,
    })
}

fn check_count(count: usize, max: usize) -> Result<()> {
    if count > max {
        return Err(Error::LengthOverflow { value: count, max });
    }
    Ok(())
}

pub fn encode_pdaf_pixel_location(loc: &PdafPixelLocation) -> Result<Vec<u8>> {
    if loc.pixel_desc_groups.len() != loc.num_block_types() {
        return Err(Error::StructuralMismatch {
            offset: 0,
            reason: "pixel descriptor groups do not match the block type ids",
        });
    }

    let mut out = Vec::new();
    out.extend_from_slice(&loc.main_offset_x.to_be_bytes());
    out.extend_from_slice(&loc.main_offset_y.to_be_bytes());
    out.push(loc.global_pdaf_type);
    out.push(loc.block_width);
    out.push(loc.block_height);
    check_count(loc.block_desc_groups.len(), usize::from(u16::MAX))?;
    out.extend_from_slice(&(loc.block_desc_groups.len() as u16).to_be_bytes());

    for group in &loc.block_desc_groups {
        check_count(group.block_descs.len(), usize::from(u16::MAX))?;
        out.extend_from_slice(&(group.block_descs.len() as u16).to_be_bytes());
        out.push(group.repeat_y);
        for desc in &group.block_descs {
            out.push(desc.block_type_id);
            out.extend_from_slice(&desc.repeat_x.to_be_bytes());
        }
    }

    for pixels in &loc.pixel_desc_groups {
        check_count(pixels.len(), usize::from(u8::MAX))?;
        out.push(pixels.len() as u8);
        for pixel in pixels {
            out.push(pixel.pixel_type.into());
            out.push(pixel.small_offset_x);
            out.push(pixel.small_offset_y);
        }
    }

    Ok(out)
}

/// PDAF readout information of a rule: readout order and the FFD of the PDAF data.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PdafReadout {
    /// Reserved byte ahead of the readout order, kept as read.
    #[cfg_attr(feature = "serde", serde(default))]
    pub reserved: u8,
    pub order: PdafReadoutOrder,
    pub ffd: Ffd,
}

pub fn decode_pdaf_readout(payload: &[u8], base: usize) -> Result<PdafReadout> {
    let mut cur = ByteCursor::new(payload, base);
    let reserved = cur.u8()?;
    let order = PdafReadoutOrder::from(cur.u8()?);
    let ffd = read_ffd(&mut cur)?;
    cur.finish("pdaf readout data beyond the ffd table")?;
    Ok(PdafReadout {
        reserved,
        order,
        ffd,
    })
}

pub fn encode_pdaf_readout(readout: &PdafReadout) -> Result<Vec<u8>> {
    let mut out = vec![readout.reserved, readout.order.into()];
    write_ffd(&mut out, &readout.ffd)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffd::FfdEntry;
    use crate::format::FfdPixelCode;

    fn sample() -> PdafPixelLocation {
        PdafPixelLocation {
            main_offset_x: 16,
            main_offset_y: 8,
            global_pdaf_type: 1,
            block_width: 16,
            block_height: 16,
            block_desc_groups: vec![
                BlockDescGroup {
                    repeat_y: 4,
                    block_descs: vec![
                        BlockDesc {
                            block_type_id: 0,
                            repeat_x: 10,
                        },
                        BlockDesc {
                            block_type_id: 1,
                            repeat_x: 10,
                        },
                    ],
                },
                BlockDescGroup {
                    repeat_y: 1,
                    block_descs: vec![],
                },
            ],
            pixel_desc_groups: vec![
                vec![PixelDesc {
                    pixel_type: PdafPixelType::LeftSeparated,
                    small_offset_x: 2,
                    small_offset_y: 3,
                }],
                vec![
                    PixelDesc {
                        pixel_type: PdafPixelType::RightSeparated,
                        small_offset_x: 10,
                        small_offset_y: 3,
                    },
                    PixelDesc {
                        pixel_type: PdafPixelType::Unknown(77),
                        small_offset_x: 0,
                        small_offset_y: 0,
                    },
                ],
            ],
        }
    }

    #[test]
    fn decodes_encoded_table() {
        let loc = sample();
        let bytes = encode_pdaf_pixel_location(&loc).unwrap();
        // header 9 + group headers 2*3 + block descs 2*3 + pixel groups (1+3) + (1+6)
        assert_eq!(bytes.len(), 9 + 6 + 6 + 4 + 7);
        let decoded = decode_pdaf_pixel_location(&bytes, 0).unwrap();
        assert_eq!(decoded, loc);
        assert_eq!(decoded.pixels_of(1).map(<[_]>::len), Some(2));
    }

    #[test]
    fn group_count_beyond_payload() {
        let mut bytes = encode_pdaf_pixel_location(&sample()).unwrap();
        bytes[8] = 3;
        assert!(matches!(
            decode_pdaf_pixel_location(&bytes, 0),
            Err(Error::TruncatedInput { .. })
        ));
    }

    #[test]
    fn trailing_bytes_are_a_mismatch() {
        let mut bytes = encode_pdaf_pixel_location(&sample()).unwrap();
        bytes.push(0);
        let extra = 100 + bytes.len() - 1;
        assert_eq!(extra, 132);
        match decode_pdaf_pixel_location(&bytes, 100) {
            Err(Error::StructuralMismatch { offset, .. }) => assert_eq!(offset, extra),
            other => panic!("expected structural mismatch, got {:?}", other),
        }
    }

    #[test]
    fn encoder_checks_pixel_groups() {
        let mut loc = sample();
        loc.pixel_desc_groups.pop();
        assert!(matches!(
            encode_pdaf_pixel_location(&loc),
            Err(Error::StructuralMismatch { .. })
        ));
    }

    #[test]
    fn readout_carries_ffd() {
        let readout = PdafReadout {
            reserved: 0,
            order: PdafReadoutOrder::SeparateWithinLine,
            ffd: Ffd {
                column_descs: vec![FfdEntry::new(FfdPixelCode::SeparatedPdaf, 32)],
                row_descs: vec![],
            },
        };
        let bytes = encode_pdaf_readout(&readout).unwrap();
        assert_eq!(&bytes[..4], &[0, 2, 1, 0]);
        assert_eq!(decode_pdaf_readout(&bytes, 0).unwrap(), readout);
    }

    #[test]
    fn readout_reserved_bytes_survive() {
        let bytes = [0x5a, 1, 1, 0, 41, 0xa5, 0x00, 0x10];
        let readout = decode_pdaf_readout(&bytes, 0).unwrap();
        assert_eq!(readout.reserved, 0x5a);
        assert_eq!(readout.ffd.column_descs[0].reserved, 0xa5);
        assert_eq!(readout.ffd.column_descs[0].pixelcode, FfdPixelCode::VENDOR_PDAF);
        assert_eq!(encode_pdaf_readout(&readout).unwrap(), bytes);
    }
}
