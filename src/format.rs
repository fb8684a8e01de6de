//! CCS static data binary format constants and identifier spaces.
//!
//! Every multi-byte field in the format is big-endian. Bit fields are extracted
//! with the masks and shifts below, never through struct layout.

/// Static data format version carried in the first block's id byte.
pub const STATIC_DATA_VERSION: u8 = 0;

/// Bits of the first block's id byte above this shift hold the format version.
pub const BLOCK_HEADER_ID_VERSION_SHIFT: u8 = 5;

/// Mask of the block id within the first block's id byte.
pub const BLOCK_HEADER_ID_MASK: u8 = (1 << BLOCK_HEADER_ID_VERSION_SHIFT) - 1;

/// The top two bits of a length specifier select its width.
pub const LENGTH_SPECIFIER_SIZE_SHIFT: u8 = 6;

/// Value bits of a length specifier's first byte.
pub const LENGTH_SPECIFIER_VALUE_MASK: u8 = (1 << LENGTH_SPECIFIER_SIZE_SHIFT) - 1;

pub const REGS_ADDR_MASK: u8 = 0x07;
pub const REGS_LEN_SHIFT: u8 = 3;
pub const REGS_LEN_MASK: u8 = 0x38;
pub const REGS_SEL_SHIFT: u8 = 6;

pub const REGS_2_ADDR_MASK: u8 = 0x01;
pub const REGS_2_LEN_SHIFT: u8 = 1;
pub const REGS_2_LEN_MASK: u8 = 0x3e;

pub const REGS_3_LEN_MASK: u8 = 0x3f;

/// Size of the END block payload (the CRC).
pub const CRC_LEN: usize = 4;

/// Size of a data version block payload.
pub const DATA_VERSION_LEN: usize = 8;

/// Size of one FFD entry: pixelcode, reserved, value.
pub const FFD_ENTRY_LEN: usize = 4;

/// Default cap on nested `If` rules.
pub const DEFAULT_MAX_DEPTH: usize = 16;

macro_rules! raw_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident = $value:literal,)+ }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// Value outside the known range, kept as-is.
            Unknown(u8),
        }

        impl From<u8> for $name {
            fn from(raw: u8) -> Self {
                match raw {
                    $($value => $name::$variant,)+
                    other => $name::Unknown(other),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                match value {
                    $($name::$variant => $value,)+
                    $name::Unknown(raw) => raw,
                }
            }
        }

        impl $name {
            /// Whether the value is one of the named variants.
            #[must_use]
            pub fn is_known(self) -> bool {
                !matches!(self, $name::Unknown(_))
            }
        }
    };
}

raw_enum! {
    /// Top-level block identifiers.
    BlockId {
        Dummy = 1,
        DataVersion = 2,
        SensorReadOnlyRegs = 3,
        ModuleReadOnlyRegs = 4,
        SensorManufacturerRegs = 5,
        ModuleManufacturerRegs = 6,
        SensorRuleBasedBlock = 32,
        ModuleRuleBasedBlock = 33,
        SensorPdafPixelLocation = 36,
        ModulePdafPixelLocation = 37,
        License = 40,
        End = 127,
    }
}

raw_enum! {
    /// Identifiers of the blocks nested in a rule based block.
    RuleId {
        If = 1,
        ReadOnlyRegs = 2,
        Ffd = 3,
        Msr = 4,
        PdafReadout = 5,
    }
}

/// Register descriptor layouts, selected by the top two bits of the first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegisterEncoding {
    /// One byte: 3-bit address delta, 3-bit length.
    Regs,
    /// Two bytes: 9-bit address delta, 5-bit length.
    Regs2,
    /// Three bytes: 6-bit length, absolute 16-bit address.
    Regs3,
}

impl RegisterEncoding {
    /// Decode a selector value; 3 is not assigned.
    #[must_use]
    pub fn from_selector(selector: u8) -> Option<Self> {
        match selector {
            0 => Some(RegisterEncoding::Regs),
            1 => Some(RegisterEncoding::Regs2),
            2 => Some(RegisterEncoding::Regs3),
            _ => None,
        }
    }

    #[must_use]
    pub fn selector(self) -> u8 {
        match self {
            RegisterEncoding::Regs => 0,
            RegisterEncoding::Regs2 => 1,
            RegisterEncoding::Regs3 => 2,
        }
    }

    /// Descriptor size in bytes, not counting the value.
    #[must_use]
    pub fn descriptor_len(self) -> usize {
        match self {
            RegisterEncoding::Regs => 1,
            RegisterEncoding::Regs2 => 2,
            RegisterEncoding::Regs3 => 3,
        }
    }

    /// Longest value one descriptor can carry.
    #[must_use]
    pub fn max_len(self) -> usize {
        match self {
            RegisterEncoding::Regs => 8,
            RegisterEncoding::Regs2 => 32,
            RegisterEncoding::Regs3 => 64,
        }
    }

    /// Largest address delta, `None` for the absolute encoding.
    #[must_use]
    pub fn max_delta(self) -> Option<u32> {
        match self {
            RegisterEncoding::Regs => Some(u32::from(REGS_ADDR_MASK)),
            RegisterEncoding::Regs2 => Some(0x1ff),
            RegisterEncoding::Regs3 => None,
        }
    }
}

raw_enum! {
    /// Fixed function data pixel codes.
    FfdPixelCode {
        Embedded = 1,
        Dummy = 2,
        Black = 3,
        Dark = 4,
        Visible = 5,
        Ms0 = 8,
        Ms1 = 9,
        Ms2 = 10,
        Ms3 = 11,
        Ms4 = 12,
        Ms5 = 13,
        Ms6 = 14,
        TopOb = 16,
        BottomOb = 17,
        LeftOb = 18,
        RightOb = 19,
        TopLeftOb = 20,
        TopRightOb = 21,
        BottomLeftOb = 22,
        BottomRightOb = 23,
        Total = 24,
        TopPdaf = 32,
        BottomPdaf = 33,
        LeftPdaf = 34,
        RightPdaf = 35,
        TopLeftPdaf = 36,
        TopRightPdaf = 37,
        BottomLeftPdaf = 38,
        BottomRightPdaf = 39,
        SeparatedPdaf = 40,
        /// Also known as vendor PDAF; both names share code 41.
        OriginalOrderPdaf = 41,
    }
}

impl FfdPixelCode {
    /// Vendor specific PDAF pixels. Same code as [`FfdPixelCode::OriginalOrderPdaf`].
    pub const VENDOR_PDAF: FfdPixelCode = FfdPixelCode::OriginalOrderPdaf;
}

raw_enum! {
    /// PDAF pixel types in a pixel descriptor.
    PdafPixelType {
        LeftSeparated = 0,
        RightSeparated = 1,
        TopSeparated = 2,
        BottomSeparated = 3,
        LeftSideBySide = 4,
        RightSideBySide = 5,
        TopSideBySide = 6,
        BottomSideBySide = 7,
        TopLeft = 8,
        TopRight = 9,
        BottomLeft = 10,
        BottomRight = 11,
    }
}

raw_enum! {
    /// PDAF readout order of a PDAF readout rule.
    PdafReadoutOrder {
        Original = 1,
        SeparateWithinLine = 2,
        SeparateTypesSeparateLines = 3,
    }
}

/// Whether a block describes the sensor or the module around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scope {
    Sensor,
    Module,
}

/// Register list flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegisterKind {
    ReadOnly,
    Manufacturer,
}

impl BlockId {
    /// Block id of a register list with the given scope and kind.
    #[must_use]
    pub fn for_registers(scope: Scope, kind: RegisterKind) -> BlockId {
        match (scope, kind) {
            (Scope::Sensor, RegisterKind::ReadOnly) => BlockId::SensorReadOnlyRegs,
            (Scope::Module, RegisterKind::ReadOnly) => BlockId::ModuleReadOnlyRegs,
            (Scope::Sensor, RegisterKind::Manufacturer) => BlockId::SensorManufacturerRegs,
            (Scope::Module, RegisterKind::Manufacturer) => BlockId::ModuleManufacturerRegs,
        }
    }

    #[must_use]
    pub fn for_rules(scope: Scope) -> BlockId {
        match scope {
            Scope::Sensor => BlockId::SensorRuleBasedBlock,
            Scope::Module => BlockId::ModuleRuleBasedBlock,
        }
    }

    #[must_use]
    pub fn for_pdaf_pixel_location(scope: Scope) -> BlockId {
        match scope {
            Scope::Sensor => BlockId::SensorPdafPixelLocation,
            Scope::Module => BlockId::ModulePdafPixelLocation,
        }
    }
}
