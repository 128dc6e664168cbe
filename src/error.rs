//! Error types for huffcode

use thiserror::Error;

use crate::Symbol;

/// Result type alias for huffcode operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, loading or applying a code
#[derive(Error, Debug)]
pub enum Error {
    #[error("no symbol has a positive frequency")]
    EmptyAlphabet,

    #[error("total weight does not fit in 64 bits")]
    WeightOverflow,

    #[error("malformed code table at line {line}: {reason}")]
    MalformedTable { line: usize, reason: String },

    #[error("bit stream ended in the middle of a code after {consumed} bits")]
    TruncatedStream { consumed: u64 },

    #[error("no branch for bit {bit} after {consumed} bits")]
    MissingMapping { bit: u8, consumed: u64 },

    #[error("symbol {0} is not part of the code")]
    UnknownSymbol(Symbol),

    #[error("symbol {0} does not fit in a byte")]
    SymbolOutOfRange(Symbol),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Error::MalformedTable {
            line,
            reason: reason.into(),
        }
    }
}
