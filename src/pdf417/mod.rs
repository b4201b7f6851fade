//! PDF417-style symbol encoder.
//!
//! Bytes are packed into codewords with byte compaction, protected by
//! Reed-Solomon error correction over GF(929) and laid out as rows of bar and
//! space modules.
//!
//! The bar/space pattern of each codeword comes from tables enumerated at
//! start-up. They satisfy the width and cluster constraints of the symbology
//! but are not the published reference tables, so symbols are only readable
//! by a decoder built from the same tables.
use serde::{Deserialize, Serialize};

pub mod cluster;
pub mod compaction;
pub mod matrix;
pub mod reed_solomon;

pub use matrix::SymbolMatrix;

/// Symbol character value, in `0..929`.
pub type Codeword = u16;

/// Number of distinct codeword values, prime.
pub const MODULUS: u16 = 929;

/// Largest number of codewords in a symbol, length descriptor and error
/// correction included.
pub const MAX_CODEWORDS: usize = 928;

pub const MAX_ROWS: usize = 90;

pub const MAX_COLUMNS: u8 = 30;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolError {
    #[error("invalid error correction level {0}, expected 0 to 8")]
    InvalidEcLevel(u8),

    #[error("invalid column count {0}, expected 1 to 30")]
    InvalidColumns(u8),

    #[error("{codewords} codewords needed, at most {max} fit in a symbol")]
    CapacityExceeded { codewords: usize, max: usize },

    #[error("{rows} rows needed, at most {max} fit in a symbol")]
    TooManyRows { rows: usize, max: usize },

    #[error("codeword {value} at position {index} is not below 929")]
    InvalidCodeword { index: usize, value: Codeword },
}

/// Reed-Solomon error correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct EcLevel(u8);

impl EcLevel {
    pub const MAX: Self = Self(8);

    pub fn new(level: u8) -> Result<Self, SymbolError> {
        if level <= Self::MAX.0 {
            Ok(Self(level))
        } else {
            Err(SymbolError::InvalidEcLevel(level))
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Number of error correction codewords: 2 at level 0, doubling with each
    /// level.
    pub fn codeword_count(&self) -> usize {
        2usize << self.0
    }
}

impl Default for EcLevel {
    fn default() -> Self {
        Self(5)
    }
}

impl TryFrom<u8> for EcLevel {
    type Error = SymbolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EcLevel> for u8 {
    fn from(value: EcLevel) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolOptions {
    pub ec_level: EcLevel,

    /// Upper bound of data columns per row.
    pub max_columns: u8,
}

impl Default for SymbolOptions {
    fn default() -> Self {
        Self {
            ec_level: EcLevel::default(),
            max_columns: MAX_COLUMNS,
        }
    }
}

/// Length descriptor followed by the byte compacted data.
pub fn data_codewords(bytes: &[u8], ec_level: EcLevel) -> Result<Vec<Codeword>, SymbolError> {
    let compacted = compaction::compact(bytes);
    let total = 1 + compacted.len() + ec_level.codeword_count();
    if total > MAX_CODEWORDS {
        return Err(SymbolError::CapacityExceeded {
            codewords: total,
            max: MAX_CODEWORDS,
        });
    }

    let mut result = Vec::with_capacity(1 + compacted.len());
    result.push(total as Codeword);
    result.extend(compacted);
    Ok(result)
}

/// Renders bytes as a symbol.
pub fn encode(bytes: &[u8], options: &SymbolOptions) -> Result<SymbolMatrix, SymbolError> {
    let data = data_codewords(bytes, options.ec_level)?;
    matrix::assemble(&data, options.ec_level, options.max_columns)
}
