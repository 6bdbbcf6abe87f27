//! Error types for the primitives crate.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrimitivesError {
    #[error("key out of range: component index {0} must be in 1..=15")]
    ComponentKeyOutOfRange(u8),

    #[error("value too large to encode: {0} bytes")]
    ValueTooLarge(usize),
}

pub type Result<T> = std::result::Result<T, PrimitivesError>;
