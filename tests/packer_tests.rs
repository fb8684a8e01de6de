//! Packer tests: produce blobs and read them back with the reader.

mod common;

use std::io::{Cursor, Seek, SeekFrom};

use ccs_data::length::MAX_LENGTH;
use ccs_data::{
    pack_static_data, Condition, Error, RegisterEntry, RegisterKind, Rule, Scope, StaticData,
    TypedBlock,
};
use proptest::prelude::*;

/// Pack the sample blob into a file and read it back.
#[test]
fn packer_produce_and_read_back() {
    let data = common::rich();
    let mut file = tempfile::tempfile().unwrap();
    let written = pack_static_data(&mut file, &data).unwrap();
    assert_eq!(written, file.metadata().unwrap().len());

    file.seek(SeekFrom::Start(0)).unwrap();
    let mut bytes = Vec::new();
    std::io::Read::read_to_end(&mut file, &mut bytes).unwrap();
    assert_eq!(StaticData::parse(&bytes).unwrap(), data);
}

#[test]
fn packer_is_deterministic() {
    let mut a = Cursor::new(Vec::new());
    let mut b = Cursor::new(Vec::new());
    pack_static_data(&mut a, &common::rich()).unwrap();
    pack_static_data(&mut b, &common::rich()).unwrap();
    assert_eq!(a.into_inner(), b.into_inner());
}

/// Blocks longer than 63 and 16383 bytes switch to wider length specifiers.
#[test]
fn packer_wide_blocks() {
    for len in [63usize, 64, 16_383, 16_384, 70_000] {
        let data = StaticData {
            blocks: vec![
                TypedBlock::DataVersion(common::version()),
                TypedBlock::License(vec![b'a'; len]),
            ],
        };
        let bytes = data.to_bytes().unwrap();
        assert_eq!(StaticData::parse(&bytes).unwrap(), data, "license of {} bytes", len);
    }
}

#[test]
fn packer_block_too_long() {
    let data = StaticData {
        blocks: vec![
            TypedBlock::DataVersion(common::version()),
            TypedBlock::License(vec![0; MAX_LENGTH + 1]),
        ],
    };
    assert!(matches!(
        data.to_bytes(),
        Err(Error::LengthOverflow { max, .. }) if max == MAX_LENGTH
    ));
}

/// Opaque entries must not reuse an id the reader would decode as something else.
#[test]
fn packer_rejects_opaque_known_ids() {
    let rule = StaticData {
        blocks: vec![
            TypedBlock::DataVersion(common::version()),
            TypedBlock::RuleBlock {
                scope: Scope::Sensor,
                rules: vec![Rule::Unknown {
                    id: 3,
                    payload: vec![],
                }],
            },
        ],
    };
    assert!(matches!(
        rule.to_bytes(),
        Err(Error::StructuralMismatch { .. })
    ));

    let block = StaticData {
        blocks: vec![
            TypedBlock::DataVersion(common::version()),
            TypedBlock::Unknown {
                id: 5,
                payload: vec![],
            },
        ],
    };
    assert!(matches!(
        block.to_bytes(),
        Err(Error::StructuralMismatch { .. })
    ));
}

#[test]
fn packer_rejects_empty_tree() {
    assert!(matches!(
        StaticData::default().to_bytes(),
        Err(Error::StructuralMismatch { offset: 0, .. })
    ));
}

fn nested(levels: usize) -> StaticData {
    let mut rules = vec![Rule::Msr(common::registers(vec![(0x3000, vec![1, 2, 3])]))];
    for level in 0..levels {
        rules = vec![Rule::If {
            condition: Condition {
                address: 0x0100 + level as u16,
                value: 0,
                mask: 0,
            },
            body: rules,
        }];
    }
    StaticData {
        blocks: vec![
            TypedBlock::DataVersion(common::version()),
            TypedBlock::RuleBlock {
                scope: Scope::Module,
                rules,
            },
        ],
    }
}

#[test]
fn packer_rule_nesting_limit() {
    let ok = nested(16);
    assert_eq!(StaticData::parse(&ok.to_bytes().unwrap()).unwrap(), ok);

    let too_deep = nested(17).to_bytes().unwrap();
    assert!(matches!(
        StaticData::parse(&too_deep),
        Err(Error::RecursionLimitExceeded { limit: 16, .. })
    ));
}

#[test]
fn packer_rejects_unencodable_registers() {
    let data = StaticData {
        blocks: vec![TypedBlock::RegisterList {
            scope: Scope::Sensor,
            kind: RegisterKind::ReadOnly,
            registers: vec![RegisterEntry::new(0x0000, vec![0; 65])],
        }],
    };
    assert!(matches!(
        data.to_bytes(),
        Err(Error::LengthOverflow { value: 65, max: 64 })
    ));
}

fn register_writes() -> impl Strategy<Value = Vec<(u16, Vec<u8>)>> {
    prop::collection::vec(
        (0u16..0xff00, prop::collection::vec(any::<u8>(), 1..=64)),
        1..20,
    )
}

proptest! {
    #[test]
    fn packer_register_lists_round_trip(writes in register_writes()) {
        let data = StaticData {
            blocks: vec![
                TypedBlock::DataVersion(common::version()),
                TypedBlock::RegisterList {
                    scope: Scope::Module,
                    kind: RegisterKind::Manufacturer,
                    registers: common::registers(writes),
                },
            ],
        };
        let bytes = data.to_bytes().unwrap();
        prop_assert_eq!(StaticData::parse(&bytes).unwrap(), data);
    }

    #[test]
    fn packer_arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = StaticData::parse(&bytes);
    }
}
