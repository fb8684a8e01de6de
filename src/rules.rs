//! Rule based blocks: nested block sequences keyed by rule id.
//!
//! An `If` rule holds a register condition and a nested rule sequence that applies
//! only when the condition holds. Nesting depth is passed down explicitly and capped
//! by [`ParseOptions::max_depth`].

use tracing::{trace, warn};

use crate::block::{write_block, BlockReader, RawBlock};
use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::ffd::{decode_ffd, encode_ffd, Ffd};
use crate::format::RuleId;
use crate::pdaf::{decode_pdaf_readout, encode_pdaf_readout, PdafReadout};
use crate::reader::ParseOptions;
use crate::regs::{decode_registers, encode_registers, RegisterEntry};

/// Register test of an `If` rule: true when `(register(address) & mask) == value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Condition {
    pub address: u16,
    pub value: u8,
    pub mask: u8,
}

impl Condition {
    #[must_use]
    pub fn matches(&self, register: u8) -> bool {
        register & self.mask == self.value
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rule {
    If {
        condition: Condition,
        body: Vec<Rule>,
    },
    ReadOnlyRegs(Vec<RegisterEntry>),
    Ffd(Ffd),
    /// Manufacturer specific registers.
    Msr(Vec<RegisterEntry>),
    PdafReadout(PdafReadout),
    /// Rule id this crate does not know, kept in lenient mode.
    Unknown {
        id: u8,
        payload: Vec<u8>,
    },
}

impl Rule {
    #[must_use]
    pub fn id(&self) -> RuleId {
        match self {
            Rule::If { .. } => RuleId::If,
            Rule::ReadOnlyRegs(_) => RuleId::ReadOnlyRegs,
            Rule::Ffd(_) => RuleId::Ffd,
            Rule::Msr(_) => RuleId::Msr,
            Rule::PdafReadout(_) => RuleId::PdafReadout,
            Rule::Unknown { id, .. } => RuleId::from(*id),
        }
    }

    /// Deepest chain of nested `If` rules below and including this one.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Rule::If { body, .. } => 1 + body.iter().map(Rule::depth).max().unwrap_or(0),
            _ => 0,
        }
    }
}

/// Flatten `rules` to the non-`If` rules whose enclosing conditions all hold.
///
/// `read` returns the current value of an 8-bit register, or `None` when it cannot
/// be read; a condition on an unreadable register does not hold.
pub fn active_rules<'r, F>(rules: &'r [Rule], read: &mut F) -> Vec<&'r Rule>
where
    F: FnMut(u16) -> Option<u8>,
{
    let mut active = Vec::new();
    for rule in rules {
        match rule {
            Rule::If { condition, body } => {
                if read(condition.address).is_some_and(|v| condition.matches(v)) {
                    active.extend(active_rules(body, read));
                }
            }
            other => active.push(other),
        }
    }
    active
}

/// Decode a rule based block payload that starts at absolute offset `base`.
pub fn decode_rules(payload: &[u8], base: usize, options: &ParseOptions) -> Result<Vec<Rule>> {
    decode_rules_at(payload, base, 0, options)
}

fn decode_rules_at(
    payload: &[u8],
    base: usize,
    depth: usize,
    options: &ParseOptions,
) -> Result<Vec<Rule>> {
    BlockReader::nested(payload, base)
        .map(|block| decode_rule(&block?, depth, options))
        .collect()
}

fn decode_rule(block: &RawBlock<'_>, depth: usize, options: &ParseOptions) -> Result<Rule> {
    let base = block.payload_offset();
    trace!(offset = block.offset, id = block.id, depth, "rule");
    let rule = match RuleId::from(block.id) {
        RuleId::If => {
            if depth >= options.max_depth {
                return Err(Error::RecursionLimitExceeded {
                    offset: block.offset,
                    limit: options.max_depth,
                });
            }
            let mut cur = ByteCursor::new(block.payload, base);
            let condition = Condition {
                address: cur.be16()?,
                value: cur.u8()?,
                mask: cur.u8()?,
            };
            let body_offset = cur.offset();
            let body = decode_rules_at(cur.rest(), body_offset, depth + 1, options)?;
            Rule::If { condition, body }
        }
        RuleId::ReadOnlyRegs => Rule::ReadOnlyRegs(decode_registers(block.payload, base)?),
        RuleId::Ffd => Rule::Ffd(decode_ffd(block.payload, base)?),
        RuleId::Msr => Rule::Msr(decode_registers(block.payload, base)?),
        RuleId::PdafReadout => Rule::PdafReadout(decode_pdaf_readout(block.payload, base)?),
        RuleId::Unknown(id) => {
            if options.strict {
                return Err(Error::UnknownRuleId {
                    offset: block.offset,
                    id,
                });
            }
            warn!(offset = block.offset, id, "keeping unknown rule as opaque data");
            Rule::Unknown {
                id,
                payload: block.payload.to_vec(),
            }
        }
    };
    Ok(rule)
}

/// Encode a rule sequence as the payload of a rule based block.
pub fn encode_rules(rules: &[Rule]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for rule in rules {
        let payload = match rule {
            Rule::If { condition, body } => {
                let mut payload = Vec::new();
                payload.extend_from_slice(&condition.address.to_be_bytes());
                payload.push(condition.value);
                payload.push(condition.mask);
                payload.extend(encode_rules(body)?);
                payload
            }
            Rule::ReadOnlyRegs(regs) | Rule::Msr(regs) => encode_registers(regs)?,
            Rule::Ffd(ffd) => encode_ffd(ffd)?,
            Rule::PdafReadout(readout) => encode_pdaf_readout(readout)?,
            Rule::Unknown { id, payload } => {
                if RuleId::from(*id).is_known() {
                    return Err(Error::StructuralMismatch {
                        offset: 0,
                        reason: "opaque rule uses a known rule id",
                    });
                }
                payload.clone()
            }
        };
        write_block(&mut out, rule.id().into(), &payload)?;
    }
    Ok(out)
}
