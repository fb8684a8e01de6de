//! Sample static data shared by the integration tests.

#![allow(dead_code)]

use ccs_data::{
    BlockDesc, BlockDescGroup, Condition, DataVersion, Ffd, FfdEntry, FfdPixelCode,
    PdafPixelLocation, PdafPixelType, PdafReadout, PdafReadoutOrder, PixelDesc, RegisterEntry,
    RegisterKind, Rule, Scope, StaticData, TypedBlock,
};

pub fn version() -> DataVersion {
    DataVersion {
        major: 1,
        minor: 1,
        year: 2024,
        month: 3,
        day: 14,
    }
}

pub fn registers(entries: Vec<(u16, Vec<u8>)>) -> Vec<RegisterEntry> {
    let mut regs: Vec<_> = entries
        .into_iter()
        .map(|(address, value)| RegisterEntry::new(address, value))
        .collect();
    ccs_data::assign_encodings(&mut regs);
    regs
}

/// A blob using every block type and every rule type.
pub fn rich() -> StaticData {
    let ffd = Ffd {
        column_descs: vec![
            FfdEntry::new(FfdPixelCode::LeftOb, 16),
            FfdEntry::new(FfdPixelCode::Visible, 4096),
        ],
        row_descs: vec![FfdEntry::new(FfdPixelCode::Embedded, 2)],
    };

    StaticData {
        blocks: vec![
            TypedBlock::DataVersion(version()),
            TypedBlock::RegisterList {
                scope: Scope::Sensor,
                kind: RegisterKind::ReadOnly,
                registers: registers(vec![(0x0000, vec![0x04, 0x56]), (0x0005, vec![0x01])]),
            },
            TypedBlock::RegisterList {
                scope: Scope::Sensor,
                kind: RegisterKind::Manufacturer,
                registers: registers(vec![(0x3000, vec![0u8; 40]), (0x3100, vec![7; 3])]),
            },
            TypedBlock::RegisterList {
                scope: Scope::Module,
                kind: RegisterKind::ReadOnly,
                registers: registers(vec![(0x0010, vec![1])]),
            },
            TypedBlock::Dummy(vec![0xff; 3]),
            TypedBlock::RuleBlock {
                scope: Scope::Sensor,
                rules: vec![
                    Rule::If {
                        condition: Condition {
                            address: 0x0002,
                            value: 0x10,
                            mask: 0xf0,
                        },
                        body: vec![
                            Rule::Msr(registers(vec![(0x3040, vec![0x01, 0x02])])),
                            Rule::If {
                                condition: Condition {
                                    address: 0x0003,
                                    value: 0x01,
                                    mask: 0x01,
                                },
                                body: vec![Rule::ReadOnlyRegs(registers(vec![(0x0020, vec![9])]))],
                            },
                        ],
                    },
                    Rule::Ffd(ffd.clone()),
                    Rule::PdafReadout(PdafReadout {
                        reserved: 0,
                        order: PdafReadoutOrder::SeparateTypesSeparateLines,
                        ffd,
                    }),
                ],
            },
            TypedBlock::PdafPixelLocation {
                scope: Scope::Module,
                location: PdafPixelLocation {
                    main_offset_x: 24,
                    main_offset_y: 12,
                    global_pdaf_type: 0,
                    block_width: 32,
                    block_height: 32,
                    block_desc_groups: vec![BlockDescGroup {
                        repeat_y: 30,
                        block_descs: vec![BlockDesc {
                            block_type_id: 0,
                            repeat_x: 40,
                        }],
                    }],
                    pixel_desc_groups: vec![vec![
                        PixelDesc {
                            pixel_type: PdafPixelType::TopLeft,
                            small_offset_x: 4,
                            small_offset_y: 4,
                        },
                        PixelDesc {
                            pixel_type: PdafPixelType::BottomRight,
                            small_offset_x: 20,
                            small_offset_y: 20,
                        },
                    ]],
                },
            },
            TypedBlock::License(b"Copyright example sensor vendor".to_vec()),
        ],
    }
}
