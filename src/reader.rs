//! Static data reader: walk the top-level blocks, dispatch every payload to its typed
//! decoder and check the trailer CRC before handing the tree out.

use std::path::Path;

use tracing::{debug, warn};

use crate::block::{BlockReader, RawBlock};
use crate::crc;
use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::format::{BlockId, RegisterKind, Scope, DATA_VERSION_LEN, DEFAULT_MAX_DEPTH};
use crate::pdaf::{decode_pdaf_pixel_location, PdafPixelLocation};
use crate::regs::{decode_registers, RegisterEntry};
use crate::rules::{decode_rules, Rule};

/// Decoding policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ParseOptions {
    /// Fail on unknown block or rule ids and on oversized fixed payloads
    /// instead of keeping or ignoring them.
    pub strict: bool,
    /// Deepest allowed chain of nested `If` rules.
    pub max_depth: usize,
    /// Check the trailer CRC before returning the tree.
    pub verify_checksum: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict: false,
            max_depth: DEFAULT_MAX_DEPTH,
            verify_checksum: true,
        }
    }
}

/// Payload of the data version block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataVersion {
    pub major: u16,
    pub minor: u16,
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl DataVersion {
    pub(crate) fn to_bytes(self) -> [u8; DATA_VERSION_LEN] {
        let mut out = [0u8; DATA_VERSION_LEN];
        out[0..2].copy_from_slice(&self.major.to_be_bytes());
        out[2..4].copy_from_slice(&self.minor.to_be_bytes());
        out[4..6].copy_from_slice(&self.year.to_be_bytes());
        out[6] = self.month;
        out[7] = self.day;
        out
    }
}

/// One decoded top-level block.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypedBlock {
    Dummy(Vec<u8>),
    DataVersion(DataVersion),
    RegisterList {
        scope: Scope,
        kind: RegisterKind,
        registers: Vec<RegisterEntry>,
    },
    RuleBlock {
        scope: Scope,
        rules: Vec<Rule>,
    },
    PdafPixelLocation {
        scope: Scope,
        location: PdafPixelLocation,
    },
    License(Vec<u8>),
    /// Block id this crate does not know, kept in lenient mode.
    Unknown {
        id: u8,
        payload: Vec<u8>,
    },
}

impl TypedBlock {
    #[must_use]
    pub fn id(&self) -> BlockId {
        match self {
            TypedBlock::Dummy(_) => BlockId::Dummy,
            TypedBlock::DataVersion(_) => BlockId::DataVersion,
            TypedBlock::RegisterList { scope, kind, .. } => BlockId::for_registers(*scope, *kind),
            TypedBlock::RuleBlock { scope, .. } => BlockId::for_rules(*scope),
            TypedBlock::PdafPixelLocation { scope, .. } => BlockId::for_pdaf_pixel_location(*scope),
            TypedBlock::License(_) => BlockId::License,
            TypedBlock::Unknown { id, .. } => BlockId::from(*id),
        }
    }
}

fn decode_data_version(block: &RawBlock<'_>, options: &ParseOptions) -> Result<DataVersion> {
    let mut cur = ByteCursor::new(block.payload, block.payload_offset());
    let version = DataVersion {
        major: cur.be16()?,
        minor: cur.be16()?,
        year: cur.be16()?,
        month: cur.u8()?,
        day: cur.u8()?,
    };
    if options.strict {
        cur.finish("data version block longer than 8 bytes")?;
    } else if !cur.is_empty() {
        warn!(
            offset = cur.offset(),
            extra = cur.remaining(),
            "ignoring trailing data version bytes"
        );
    }
    Ok(version)
}

/// Decode one top-level block into its typed form.
pub fn decode_block(block: &RawBlock<'_>, options: &ParseOptions) -> Result<TypedBlock> {
    let base = block.payload_offset();
    debug!(
        offset = block.offset,
        id = block.id,
        len = block.payload.len(),
        "decoding block"
    );

    let registers = |scope, kind| -> Result<TypedBlock> {
        Ok(TypedBlock::RegisterList {
            scope,
            kind,
            registers: decode_registers(block.payload, base)?,
        })
    };
    let rules = |scope| -> Result<TypedBlock> {
        Ok(TypedBlock::RuleBlock {
            scope,
            rules: decode_rules(block.payload, base, options)?,
        })
    };
    let pdaf = |scope| -> Result<TypedBlock> {
        Ok(TypedBlock::PdafPixelLocation {
            scope,
            location: decode_pdaf_pixel_location(block.payload, base)?,
        })
    };

    match BlockId::from(block.id) {
        BlockId::Dummy => Ok(TypedBlock::Dummy(block.payload.to_vec())),
        BlockId::DataVersion => Ok(TypedBlock::DataVersion(decode_data_version(block, options)?)),
        BlockId::SensorReadOnlyRegs => registers(Scope::Sensor, RegisterKind::ReadOnly),
        BlockId::ModuleReadOnlyRegs => registers(Scope::Module, RegisterKind::ReadOnly),
        BlockId::SensorManufacturerRegs => registers(Scope::Sensor, RegisterKind::Manufacturer),
        BlockId::ModuleManufacturerRegs => registers(Scope::Module, RegisterKind::Manufacturer),
        BlockId::SensorRuleBasedBlock => rules(Scope::Sensor),
        BlockId::ModuleRuleBasedBlock => rules(Scope::Module),
        BlockId::SensorPdafPixelLocation => pdaf(Scope::Sensor),
        BlockId::ModulePdafPixelLocation => pdaf(Scope::Module),
        BlockId::License => Ok(TypedBlock::License(block.payload.to_vec())),
        BlockId::End => Err(Error::StructuralMismatch {
            offset: block.offset,
            reason: "end block has no typed payload",
        }),
        BlockId::Unknown(id) => {
            if options.strict {
                return Err(Error::UnknownBlockId {
                    offset: block.offset,
                    id,
                });
            }
            warn!(offset = block.offset, id, "keeping unknown block as opaque data");
            Ok(TypedBlock::Unknown {
                id,
                payload: block.payload.to_vec(),
            })
        }
    }
}

/// A decoded static data blob: the top-level blocks in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaticData {
    pub blocks: Vec<TypedBlock>,
}

impl StaticData {
    /// Decode with the default (lenient, checksum verified) options.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        Self::parse_with(bytes, &ParseOptions::default())
    }

    /// Decode the structure of `bytes`, then verify the trailer CRC unless
    /// `options.verify_checksum` is off.
    pub fn parse_with(bytes: &[u8], options: &ParseOptions) -> Result<Self> {
        let mut reader = BlockReader::top_level(bytes);
        let mut blocks = Vec::new();
        for raw in reader.by_ref() {
            let raw = raw?;
            if options.strict && blocks.is_empty() && raw.id != u8::from(BlockId::DataVersion) {
                return Err(Error::StructuralMismatch {
                    offset: raw.offset,
                    reason: "first block is not the data version",
                });
            }
            blocks.push(decode_block(&raw, options)?);
        }
        let end = reader.expect_end()?;
        debug!(
            blocks = blocks.len(),
            crc_offset = end.payload_offset(),
            "decoded static data"
        );

        if options.verify_checksum {
            crc::verify(bytes)?;
        }
        Ok(Self { blocks })
    }

    /// Read and decode a static data file.
    pub fn open<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::parse_with(&bytes, options)
    }

    #[must_use]
    pub fn version(&self) -> Option<&DataVersion> {
        self.blocks.iter().find_map(|b| match b {
            TypedBlock::DataVersion(v) => Some(v),
            _ => None,
        })
    }

    /// Register entries of every register list with the given scope and kind, in order.
    pub fn registers(
        &self,
        scope: Scope,
        kind: RegisterKind,
    ) -> impl Iterator<Item = &RegisterEntry> + '_ {
        self.blocks
            .iter()
            .filter_map(move |b| match b {
                TypedBlock::RegisterList {
                    scope: s,
                    kind: k,
                    registers,
                } if *s == scope && *k == kind => Some(registers.iter()),
                _ => None,
            })
            .flatten()
    }

    /// Top-level rules of every rule based block with the given scope, in order.
    pub fn rules(&self, scope: Scope) -> impl Iterator<Item = &Rule> + '_ {
        self.blocks
            .iter()
            .filter_map(move |b| match b {
                TypedBlock::RuleBlock { scope: s, rules } if *s == scope => Some(rules.iter()),
                _ => None,
            })
            .flatten()
    }

    #[must_use]
    pub fn pdaf_pixel_location(&self, scope: Scope) -> Option<&PdafPixelLocation> {
        self.blocks.iter().find_map(|b| match b {
            TypedBlock::PdafPixelLocation { scope: s, location } if *s == scope => Some(location),
            _ => None,
        })
    }

    #[must_use]
    pub fn license(&self) -> Option<&[u8]> {
        self.blocks.iter().find_map(|b| match b {
            TypedBlock::License(text) => Some(text.as_slice()),
            _ => None,
        })
    }

    /// License text, if present and valid UTF-8.
    #[must_use]
    pub fn license_text(&self) -> Option<&str> {
        self.license().and_then(|l| std::str::from_utf8(l).ok())
    }
}
