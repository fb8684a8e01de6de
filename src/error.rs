//! Error type shared by every decoder and encoder in the crate.
//!
//! Structural errors carry the absolute byte offset (from the start of the blob)
//! at which decoding stopped.

use thiserror::Error;

/// Errors produced while decoding, encoding or validating static data.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("truncated input at offset {offset}: need {needed} bytes, {available} available")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("value {value} does not fit (max {max})")]
    LengthOverflow { value: usize, max: usize },
    #[error("invalid length specifier tag {tag} at offset {offset}")]
    InvalidLengthSpecifier { offset: usize, tag: u8 },
    #[error("invalid register selector {selector} at offset {offset}")]
    InvalidSelector { offset: usize, selector: u8 },
    #[error("unknown block id {id} at offset {offset}")]
    UnknownBlockId { offset: usize, id: u8 },
    #[error("unknown rule id {id} at offset {offset}")]
    UnknownRuleId { offset: usize, id: u8 },
    #[error("structural mismatch at offset {offset}: {reason}")]
    StructuralMismatch { offset: usize, reason: &'static str },
    #[error("rule nesting deeper than {limit} at offset {offset}")]
    RecursionLimitExceeded { offset: usize, limit: usize },
    #[error("checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { stored: u32, computed: u32 },
    #[error("unsupported static data version {found} at offset {offset} (supported: {supported})")]
    UnsupportedVersion {
        offset: usize,
        found: u8,
        supported: u8,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Byte offset the error refers to, when it has one.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::TruncatedInput { offset, .. }
            | Error::InvalidLengthSpecifier { offset, .. }
            | Error::InvalidSelector { offset, .. }
            | Error::UnknownBlockId { offset, .. }
            | Error::UnknownRuleId { offset, .. }
            | Error::StructuralMismatch { offset, .. }
            | Error::RecursionLimitExceeded { offset, .. }
            | Error::UnsupportedVersion { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}
