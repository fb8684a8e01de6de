//! ccs-data: decoder, encoder and validator for MIPI CCS camera sensor static data.
//!
//! This crate provides:
//! - **Format constants** (`format`): block ids, rule ids, pixel codes, bit masks and shifts.
//! - **Length codec** (`length`) and **block reader** (`block`): the self-delimited block layer.
//! - **Typed decoders**: register lists (`regs`), rule blocks (`rules`), FFD tables (`ffd`)
//!   and PDAF pixel location / readout data (`pdaf`).
//! - **Reader** (`reader`): `StaticData::parse(bytes)` gives the typed block tree.
//! - **Packer** (`packer`): encode a tree back to a blob, CRC trailer included.
//! - **Integrity** (`crc`): trailer CRC compute and verify.
//!
//! ```
//! use ccs_data::{StaticData, TypedBlock, DataVersion};
//!
//! let data = StaticData {
//!     blocks: vec![TypedBlock::DataVersion(DataVersion {
//!         major: 1, minor: 0, year: 2024, month: 6, day: 1,
//!     })],
//! };
//! let bytes = data.to_bytes().unwrap();
//! assert_eq!(StaticData::parse(&bytes).unwrap(), data);
//! ```

pub mod block;
pub mod crc;
mod cursor;
pub mod error;
pub mod ffd;
pub mod format;
pub mod length;
pub mod packer;
pub mod pdaf;
pub mod reader;
pub mod regs;
pub mod rules;

pub use block::{BlockReader, RawBlock};
pub use error::{Error, Result};
pub use ffd::{decode_ffd, Ffd, FfdEntry};
pub use format::{
    BlockId, FfdPixelCode, PdafPixelType, PdafReadoutOrder, RegisterEncoding, RegisterKind,
    RuleId, Scope, STATIC_DATA_VERSION,
};
pub use length::{decode_length, encode_length, LengthWidth};
pub use packer::{encode, encode_block, pack_static_data};
pub use pdaf::{
    decode_pdaf_pixel_location, BlockDesc, BlockDescGroup, PdafPixelLocation, PdafReadout,
    PixelDesc,
};
pub use reader::{decode_block, DataVersion, ParseOptions, StaticData, TypedBlock};
pub use regs::{assign_encodings, decode_registers, RegisterDescriptor, RegisterEntry};
pub use rules::{active_rules, decode_rules, Condition, Rule};
